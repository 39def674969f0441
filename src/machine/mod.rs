//! The state machine and everything it needs at runtime.
//!
//! - `StateMachine` owns the registry, the current state and the owner value
//! - `StateChanged` notifications for observers
//! - `MachineConfig` tunables

mod config;
mod error;
mod events;
mod state_machine;

pub use config::{ConfigError, MachineConfig};
pub use error::MachineError;
pub use events::{ObserverId, StateChanged};
pub use state_machine::{BoxedState, StateMachine};
