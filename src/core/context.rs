//! Context handed to state hooks and change observers.

use super::state::{MachineId, StateId, StatePayload, StateType};
use std::any::Any;
use std::collections::VecDeque;

/// Where a deferred transition request points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    Type(StateType),
    Id(StateId),
}

/// A transition requested from inside a hook or observer.
#[derive(Debug)]
pub(crate) struct Request {
    pub(crate) target: Target,
    pub(crate) payload: Option<StatePayload>,
}

/// Borrowed view of a running machine.
///
/// Hooks cannot reach the machine itself while it is running them, so
/// transition requests made here are queued and executed after the current
/// transition (or tick) finishes, in the order they were made.
pub struct Context<'a, T> {
    machine: MachineId,
    owner: &'a mut T,
    requests: &'a mut VecDeque<Request>,
    current: Option<(StateType, StateId)>,
}

impl<'a, T> Context<'a, T> {
    pub(crate) fn new(
        machine: MachineId,
        owner: &'a mut T,
        requests: &'a mut VecDeque<Request>,
        current: Option<(StateType, StateId)>,
    ) -> Self {
        Self {
            machine,
            owner,
            requests,
            current,
        }
    }

    pub fn machine_id(&self) -> MachineId {
        self.machine
    }

    pub fn owner(&self) -> &T {
        &*self.owner
    }

    pub fn owner_mut(&mut self) -> &mut T {
        &mut *self.owner
    }

    /// Type of the machine's current state as seen by this hook.
    pub fn current_state_type(&self) -> Option<StateType> {
        self.current.map(|(ty, _)| ty)
    }

    pub fn current_state_id(&self) -> Option<StateId> {
        self.current.map(|(_, id)| id)
    }

    /// Queue a transition to the state of type `S`.
    pub fn request<S: 'static>(&mut self) {
        self.request_by_type(StateType::of::<S>());
    }

    pub fn request_by_type(&mut self, ty: StateType) {
        self.push(Target::Type(ty), None);
    }

    pub fn request_by_id(&mut self, id: StateId) {
        self.push(Target::Id(id), None);
    }

    /// Queue a transition to `S`, entering it with `context`.
    pub fn request_with<S: 'static, C: Any + Send>(&mut self, context: C) {
        self.push(
            Target::Type(StateType::of::<S>()),
            Some(StatePayload::new(context)),
        );
    }

    /// Number of requests queued and not yet executed.
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    fn push(&mut self, target: Target, payload: Option<StatePayload>) {
        self.requests.push_back(Request { target, payload });
    }
}
