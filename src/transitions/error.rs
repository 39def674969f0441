//! Transition table errors.

use thiserror::Error;

/// Errors raised when adding an edge in strict mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Transition source state '{state}' is not registered")]
    UnregisteredSource { state: String },

    #[error("Transition target state '{state}' is not registered")]
    UnregisteredTarget { state: String },
}

/// Problems found by validating a transition table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableViolation {
    #[error("Transition {index} has no target state")]
    MissingTarget { index: usize },

    #[error("Transition {index} targets unregistered state '{state}' and never fires")]
    UnregisteredTarget { index: usize, state: String },

    #[error("Transition {index} starts from unregistered state '{state}' and acts as a wildcard")]
    UnregisteredSource { index: usize, state: String },

    #[error("Transition {index} has no condition")]
    MissingCondition { index: usize },

    #[error("Transition {index} loops on '{state}' and never fires")]
    SelfLoop { index: usize, state: String },
}
