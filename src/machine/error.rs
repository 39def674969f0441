//! Machine errors.

use thiserror::Error;

/// Errors returned by machine operations that cannot report through a
/// plain `bool`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    /// A tick was driven before any state became current.
    #[error("State machine has no current state. Initialize it before ticking")]
    NotStarted,
}
