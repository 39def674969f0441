//! State transition history tracking.
//!
//! Records which states a machine moved through and when. Entries refer to
//! states by [`StateId`], so a history serializes compactly and can be
//! stored in a checkpoint.

use super::state::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What caused a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionCause {
    /// First state entered during initialization.
    Initial,
    /// Explicit `change_state*` call.
    Requested,
    /// Request queued from inside a hook or observer.
    Deferred,
    /// Selected by a transition table evaluation pass.
    Table,
    /// Restored from a checkpoint.
    Restored,
}

/// Record of a single state transition.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{StateId, StateTransition, TransitionCause};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: Some(StateId::new(0)),
///     to: StateId::new(1),
///     timestamp: Utc::now(),
///     cause: TransitionCause::Requested,
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being left, `None` for the first transition of a machine
    pub from: Option<StateId>,
    /// The state being entered
    pub to: StateId,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Why the transition happened
    pub cause: TransitionCause,
}

/// Ordered history of state transitions.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{StateHistory, StateId, StateTransition, TransitionCause};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: None,
///         to: StateId::new(0),
///         timestamp: Utc::now(),
///         cause: TransitionCause::Initial,
///     })
///     .record(StateTransition {
///         from: Some(StateId::new(0)),
///         to: StateId::new(2),
///         timestamp: Utc::now(),
///         cause: TransitionCause::Table,
///     });
///
/// assert_eq!(history.get_path(), vec![StateId::new(0), StateId::new(2)]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Append a transition in place, dropping the oldest entries so that at
    /// most `limit` remain. `None` keeps everything.
    pub fn push(&mut self, transition: StateTransition, limit: Option<usize>) {
        self.transitions.push(transition);
        if let Some(limit) = limit {
            let excess = self.transitions.len().saturating_sub(limit);
            if excess > 0 {
                self.transitions.drain(..excess);
            }
        }
    }

    /// States traversed, in order.
    ///
    /// Starts with the `from` state of the first entry when there is one,
    /// followed by the `to` state of every entry.
    pub fn get_path(&self) -> Vec<StateId> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(from) = self.transitions.first().and_then(|t| t.from) {
            path.push(from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Time between the first and last recorded transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.last()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
