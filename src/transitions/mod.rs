//! Declarative transition tables.
//!
//! A `TransitionStateMachine` wraps a `StateMachine` with a list of guarded,
//! prioritized edges and chooses the next state from them on demand.

mod error;
mod table;
mod transition;
pub mod validation;

pub use error::{TableViolation, TransitionError};
pub use table::TransitionStateMachine;
pub use transition::Transition;
