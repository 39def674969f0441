//! State change notifications.

use crate::core::{Context, StateId, StateType};

/// Pushed to observers after the current state pointer moved and before the
/// new state is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChanged {
    pub previous: Option<(StateType, StateId)>,
    pub state_type: StateType,
    pub state_id: StateId,
}

impl StateChanged {
    pub fn is<S: 'static>(&self) -> bool {
        self.state_type == StateType::of::<S>()
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

pub(crate) type ObserverFn<T> = Box<dyn FnMut(&StateChanged, &mut Context<'_, T>) + Send>;

pub(crate) struct Observer<T> {
    pub(crate) id: ObserverId,
    pub(crate) callback: ObserverFn<T>,
}
