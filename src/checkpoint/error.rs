//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur while saving or resuming a machine
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Encoding to JSON or binary failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Decoding from JSON or binary failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The machine registers different states than the one that was saved
    #[error("Registered states {found:?} do not match checkpoint states {expected:?}")]
    RegistryMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A saved state id has no registered state
    #[error("Checkpoint refers to unknown state id {id}")]
    UnknownState { id: u8 },
}
