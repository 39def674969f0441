//! Core state machine types.
//!
//! This module contains the building blocks every machine is made of:
//! - The `State` contract and the identities of registered states
//! - The `Context` passed to state hooks
//! - Guard predicates for transition tables
//! - Transition history
//! - A bidirectional map used for the type/id registry

mod bimap;
mod context;
mod guard;
mod history;
mod state;

pub use bimap::{BiMap, BiMapError};
pub use context::Context;
pub(crate) use context::{Request, Target};
pub use guard::Guard;
pub use history::{StateHistory, StateTransition, TransitionCause};
pub use state::{ContextState, MachineId, State, StateId, StatePayload, StateType};
