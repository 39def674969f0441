//! Guarded, prioritized edges of a transition table.

use crate::core::{Guard, StateId, StateType};

/// An edge of a transition table.
///
/// `from == None` makes the edge a wildcard that applies whatever the
/// current state is. An edge is only considered when it is valid, i.e. it
/// has both a target and a condition.
pub struct Transition<T> {
    /// Source state, `None` for a wildcard
    pub from: Option<StateId>,
    /// Destination state
    pub to: Option<StateId>,
    /// Condition evaluated against the machine owner
    pub condition: Option<Guard<T>>,
    /// Higher priorities win among satisfied edges
    pub priority: i32,
    /// Source type the edge was declared with, if any
    pub declared_from: Option<StateType>,
    /// Destination type the edge was declared with, if any
    pub declared_to: Option<StateType>,
}

impl<T> Transition<T> {
    /// Edge between two registered states.
    pub fn new(from: Option<StateId>, to: StateId, priority: i32, condition: Guard<T>) -> Self {
        Self {
            from,
            to: Some(to),
            condition: Some(condition),
            priority,
            declared_from: None,
            declared_to: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.to.is_some() && self.condition.is_some()
    }

    pub fn is_wildcard(&self) -> bool {
        self.from.is_none()
    }

    /// Whether the edge applies to `current` and its condition holds.
    ///
    /// Evaluates the condition; validity is not checked.
    pub fn can_fire(&self, current: Option<StateId>, owner: &T) -> bool {
        if !self.is_wildcard() && self.from != current {
            return false;
        }
        self.condition.as_ref().is_some_and(|guard| guard.check(owner))
    }
}

impl<T> std::fmt::Debug for Transition<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("priority", &self.priority)
            .field("has_condition", &self.condition.is_some())
            .finish()
    }
}
