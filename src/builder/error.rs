//! Build errors for the state machine builder.

use crate::machine::ConfigError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No states registered. Add at least one state with .state(..)")]
    NoStates,

    #[error("State '{state}' was added more than once")]
    DuplicateState { state: String },

    #[error("Too many states ({count}), a machine holds at most {capacity}")]
    TooManyStates { count: usize, capacity: usize },

    #[error("Initial state '{state}' is not among the registered states")]
    InitialNotRegistered { state: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
