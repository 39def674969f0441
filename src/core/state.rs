//! The State contract and the identities attached to registered states.
//!
//! A state is any `'static` type implementing [`State<T>`], where `T` is the
//! owner value of the machine the state lives in. States are keyed by their
//! Rust type: a machine holds at most one instance of each type.

use super::context::Context;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Compact identifier of a registered state.
///
/// Ids are assigned in registration order starting at zero and stay stable
/// for the lifetime of the machine, so the current state can be persisted as
/// a single byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(u8);

impl StateId {
    /// Largest number of states a single machine can register.
    pub const CAPACITY: usize = u8::MAX as usize + 1;

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn as_byte(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().map(Self)
    }
}

impl From<u8> for StateId {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runtime type identity of a state.
///
/// Equality and hashing only consider the `TypeId`; the name is kept for
/// logging and checkpoint fingerprints.
#[derive(Clone, Copy, Debug)]
pub struct StateType {
    id: TypeId,
    name: &'static str,
}

impl StateType {
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path or generic arguments.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for StateType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StateType {}

impl Hash for StateType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Identity of a machine instance, handed to each state when it is attached.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(Uuid);

impl MachineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MachineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Type-erased context value passed to [`State::enter_with`].
pub struct StatePayload {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl StatePayload {
    pub fn new<C: Any + Send>(value: C) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<C>(),
        }
    }

    pub fn is<C: Any>(&self) -> bool {
        self.value.is::<C>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Take the value out if it has type `C`, or hand the payload back.
    pub fn downcast<C: Any>(self) -> Result<C, StatePayload> {
        let type_name = self.type_name;
        match self.value.downcast::<C>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, type_name }),
        }
    }

    /// Enter `state` with this payload as its typed context.
    ///
    /// Falls back to the plain [`State::enter`] when the payload is not a
    /// `S::Context`.
    pub fn enter<T, S>(self, state: &mut S, cx: &mut Context<'_, T>)
    where
        S: ContextState<T> + ?Sized,
    {
        match self.downcast::<S::Context>() {
            Ok(context) => state.enter_context(cx, context),
            Err(payload) => {
                tracing::debug!(
                    state = std::any::type_name::<S>(),
                    expected = std::any::type_name::<S::Context>(),
                    received = payload.type_name(),
                    "context type mismatch, entering without context"
                );
                state.enter(cx);
            }
        }
    }
}

impl fmt::Debug for StatePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatePayload")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A behavioral mode of a machine whose owner is `T`.
///
/// Only the current state receives hook calls. Hooks get a [`Context`] that
/// exposes the owner and lets the state request further transitions; those
/// requests run once the transition in flight has completed.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{Context, State};
///
/// struct Player {
///     speed: f32,
/// }
///
/// struct Idle;
///
/// impl State<Player> for Idle {
///     fn enter(&mut self, cx: &mut Context<'_, Player>) {
///         cx.owner_mut().speed = 0.0;
///     }
///
///     fn exit(&mut self, _cx: &mut Context<'_, Player>) {}
/// }
/// ```
pub trait State<T>: Any + Send {
    /// Called when the state becomes current.
    fn enter(&mut self, cx: &mut Context<'_, T>);

    /// Called instead of [`enter`](State::enter) when the transition carries
    /// a payload. The default ignores the payload.
    fn enter_with(&mut self, cx: &mut Context<'_, T>, payload: StatePayload) {
        let _ = payload;
        self.enter(cx);
    }

    /// Called right before the machine moves away from this state.
    fn exit(&mut self, cx: &mut Context<'_, T>);

    fn update(&mut self, _cx: &mut Context<'_, T>) {}

    fn physics_update(&mut self, _cx: &mut Context<'_, T>) {}

    fn late_update(&mut self, _cx: &mut Context<'_, T>) {}

    /// Called once, when the state is registered with its machine.
    fn attached(&mut self, _machine: MachineId, _id: StateId) {}
}

/// A state that expects a typed context when it is entered.
///
/// Route [`State::enter_with`] through [`StatePayload::enter`] to get the
/// typed dispatch:
///
/// ```rust
/// use statecraft::core::{Context, ContextState, State, StatePayload};
///
/// struct Hud {
///     banner: String,
/// }
///
/// struct Announce;
///
/// impl State<Hud> for Announce {
///     fn enter(&mut self, cx: &mut Context<'_, Hud>) {
///         cx.owner_mut().banner = "...".into();
///     }
///
///     fn enter_with(&mut self, cx: &mut Context<'_, Hud>, payload: StatePayload) {
///         payload.enter(self, cx);
///     }
///
///     fn exit(&mut self, _cx: &mut Context<'_, Hud>) {}
/// }
///
/// impl ContextState<Hud> for Announce {
///     type Context = String;
///
///     fn enter_context(&mut self, cx: &mut Context<'_, Hud>, message: String) {
///         cx.owner_mut().banner = message;
///     }
/// }
/// ```
pub trait ContextState<T>: State<T> {
    type Context: Any + Send;

    fn enter_context(&mut self, cx: &mut Context<'_, T>, context: Self::Context);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Idle;
    struct Walking;

    mod nested {
        pub struct Generic<T>(pub T);
    }

    #[test]
    fn state_type_equality_uses_type_id() {
        assert_eq!(StateType::of::<Idle>(), StateType::of::<Idle>());
        assert_ne!(StateType::of::<Idle>(), StateType::of::<Walking>());
    }

    #[test]
    fn short_name_strips_path_and_generics() {
        assert_eq!(StateType::of::<Idle>().short_name(), "Idle");
        assert_eq!(
            StateType::of::<nested::Generic<Walking>>().short_name(),
            "Generic"
        );
    }

    #[test]
    fn state_id_serializes_as_single_number() {
        let id = StateId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");

        let bytes = bincode::serialize(&id).unwrap();
        assert_eq!(bytes, vec![7]);
    }

    #[test]
    fn state_id_from_index_rejects_overflow() {
        assert_eq!(StateId::from_index(255), Some(StateId::new(255)));
        assert_eq!(StateId::from_index(256), None);
    }

    #[test]
    fn payload_downcasts_to_matching_type() {
        let payload = StatePayload::new(42u32);
        assert!(payload.is::<u32>());
        assert_eq!(payload.downcast::<u32>().unwrap(), 42);
    }

    #[test]
    fn payload_mismatch_hands_payload_back() {
        let payload = StatePayload::new("hello");
        let payload = payload.downcast::<u32>().unwrap_err();
        assert_eq!(payload.type_name(), std::any::type_name::<&str>());
        assert_eq!(payload.downcast::<&str>().unwrap(), "hello");
    }

    #[test]
    fn machine_ids_are_unique() {
        assert_ne!(MachineId::new(), MachineId::new());
    }
}
