//! Checkpoint and resume functionality for state machines.
//!
//! A checkpoint captures which state a machine is in, as a one-byte
//! [`StateId`], together with its history and a fingerprint of the registry.
//! State values themselves are not serialized: a checkpoint is resumed into a
//! machine that registers the same state types in the same order.

use crate::core::{MachineId, StateHistory, StateId};
use crate::machine::StateMachine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a machine's position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// Machine the checkpoint was taken from
    pub machine: MachineId,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    pub initial_state: Option<StateId>,

    pub current_state: Option<StateId>,

    /// Registered state type names in id order, as given by
    /// [`std::any::type_name`]
    pub states: Vec<String>,

    pub history: StateHistory,
}

impl Checkpoint {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()?;
        Ok(checkpoint)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(())
    }
}

impl<T: 'static> StateMachine<T> {
    /// Snapshot the machine's current position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            machine: self.id(),
            timestamp: Utc::now(),
            initial_state: self.initial_state_id(),
            current_state: self.current_state_id(),
            states: self.state_names(),
            history: self.history().clone(),
        }
    }

    /// Move the machine to the position saved in `checkpoint`.
    ///
    /// The machine must register the same state types, in the same order,
    /// as the one the checkpoint was taken from. The saved state is entered
    /// through the regular change procedure, so `exit` and `enter` hooks run.
    ///
    /// The registry is compared by full type names from
    /// [`std::any::type_name`]. Their exact text is not guaranteed to stay
    /// the same across compiler versions, so a checkpoint written by one
    /// build may be rejected with [`CheckpointError::RegistryMismatch`] by a
    /// build made with another toolchain, or after a state type is moved to
    /// another module.
    pub fn resume(&mut self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        checkpoint.check_version()?;

        let found = self.state_names();
        if found != checkpoint.states {
            return Err(CheckpointError::RegistryMismatch {
                expected: checkpoint.states.clone(),
                found,
            });
        }

        for id in [checkpoint.initial_state, checkpoint.current_state]
            .into_iter()
            .flatten()
        {
            if self.state_type(id).is_none() {
                return Err(CheckpointError::UnknownState { id: id.as_byte() });
            }
        }

        self.restore(
            checkpoint.initial_state,
            checkpoint.current_state,
            checkpoint.history.clone(),
        );
        tracing::debug!(
            machine = %self.id(),
            checkpoint = %checkpoint.id,
            current = ?checkpoint.current_state,
            "resumed from checkpoint"
        );
        Ok(())
    }

    fn state_names(&self) -> Vec<String> {
        self.state_types().map(|ty| ty.name().to_string()).collect()
    }
}
