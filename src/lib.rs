//! Statecraft: a type-keyed state machine with lifecycle hooks
//!
//! A machine owns a closed set of states, one instance per Rust type, and a
//! shared owner value every state can read and mutate. The machine is driven
//! from outside: a scheduler calls `update`, `physics_update` and
//! `late_update` once per tick and the current state reacts.
//!
//! # Core Concepts
//!
//! - **State**: a behavioral mode with `enter`/`exit`/`update` hooks, keyed
//!   by its type and a compact one-byte id
//! - **StateMachine**: registry, current state and change notifications
//! - **TransitionStateMachine**: a machine that selects its next state from a
//!   table of guarded, prioritized edges
//! - **Checkpoint**: the current state and history, saved as JSON or binary
//!
//! # Example
//!
//! ```rust
//! use statecraft::core::{Context, State};
//! use statecraft::transitions::TransitionStateMachine;
//! use statecraft::states;
//!
//! #[derive(Default)]
//! struct Body {
//!     speed: u32,
//!     stamina: u32,
//! }
//!
//! struct Idle;
//! struct Walking;
//! struct Running;
//!
//! impl State<Body> for Idle {
//!     fn enter(&mut self, _cx: &mut Context<'_, Body>) {}
//!     fn exit(&mut self, _cx: &mut Context<'_, Body>) {}
//!
//!     fn update(&mut self, cx: &mut Context<'_, Body>) {
//!         cx.owner_mut().stamina += 1;
//!     }
//! }
//!
//! impl State<Body> for Walking {
//!     fn enter(&mut self, _cx: &mut Context<'_, Body>) {}
//!     fn exit(&mut self, _cx: &mut Context<'_, Body>) {}
//! }
//!
//! impl State<Body> for Running {
//!     fn enter(&mut self, _cx: &mut Context<'_, Body>) {}
//!     fn exit(&mut self, _cx: &mut Context<'_, Body>) {}
//!
//!     fn update(&mut self, cx: &mut Context<'_, Body>) {
//!         let body = cx.owner_mut();
//!         body.stamina = body.stamina.saturating_sub(1);
//!     }
//! }
//!
//! let mut machine = TransitionStateMachine::new(Body::default());
//! machine.init(states![Idle, Walking, Running], true);
//! machine.add_transition::<Idle, Walking>(|b| b.speed > 0).unwrap();
//! machine.add_transition::<Walking, Running>(|b| b.speed > 5).unwrap();
//! machine.add_any_transition_with_priority::<Idle>(10, |b| b.speed == 0).unwrap();
//!
//! machine.owner_mut().speed = 6;
//! machine.tick().unwrap();
//! machine.tick().unwrap();
//! assert!(machine.is_current::<Running>());
//!
//! machine.owner_mut().speed = 0;
//! machine.tick().unwrap();
//! assert!(machine.is_current::<Idle>());
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod machine;
pub mod transitions;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use core::{Context, ContextState, Guard, State, StateHistory, StateId, StatePayload, StateType};
pub use machine::{MachineConfig, MachineError, StateChanged, StateMachine};
pub use transitions::{Transition, TransitionStateMachine};
