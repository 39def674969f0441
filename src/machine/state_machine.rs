//! State machine that owns its states and drives their lifecycle.

use super::config::{ConfigError, MachineConfig};
use super::error::MachineError;
use super::events::{Observer, ObserverId, StateChanged};
use crate::core::{
    BiMap, Context, MachineId, Request, State, StateHistory, StateId, StatePayload,
    StateTransition, StateType, Target, TransitionCause,
};
use chrono::Utc;
use std::any::Any;
use std::collections::VecDeque;

/// A state paired with its runtime type, ready to be registered.
///
/// Use the [`states!`](crate::states) macro to build a list of these.
pub struct BoxedState<T> {
    ty: StateType,
    state: Box<dyn State<T>>,
}

impl<T: 'static> BoxedState<T> {
    pub fn new<S: State<T>>(state: S) -> Self {
        Self {
            ty: StateType::of::<S>(),
            state: Box::new(state),
        }
    }

    pub fn state_type(&self) -> StateType {
        self.ty
    }
}

struct Slot<T> {
    ty: StateType,
    state: Box<dyn State<T>>,
}

#[derive(Clone, Copy)]
enum Notify {
    Observers,
    Silent,
}

#[derive(Clone, Copy)]
enum Hook {
    Update,
    PhysicsUpdate,
    LateUpdate,
}

/// State machine over a closed set of states sharing an owner value `T`.
///
/// States are registered once, keyed by their type, and receive a compact
/// [`StateId`] in registration order. Exactly one state is current once the
/// machine has started; every change goes through the same procedure:
///
/// 1. `exit` on the outgoing state
/// 2. the current pointer moves
/// 3. observers receive a [`StateChanged`]
/// 4. `enter` (or `enter_with`) on the incoming state
///
/// Requests made from hooks or observers are queued and run after the
/// transition in flight completes.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{Context, State};
/// use statecraft::machine::StateMachine;
/// use statecraft::states;
///
/// #[derive(Default)]
/// struct Door {
///     log: Vec<&'static str>,
/// }
///
/// struct Closed;
/// struct Open;
///
/// impl State<Door> for Closed {
///     fn enter(&mut self, cx: &mut Context<'_, Door>) {
///         cx.owner_mut().log.push("closed");
///     }
///     fn exit(&mut self, _cx: &mut Context<'_, Door>) {}
/// }
///
/// impl State<Door> for Open {
///     fn enter(&mut self, cx: &mut Context<'_, Door>) {
///         cx.owner_mut().log.push("open");
///     }
///     fn exit(&mut self, _cx: &mut Context<'_, Door>) {}
/// }
///
/// let mut door = StateMachine::new(Door::default());
/// door.init(states![Closed, Open], true);
///
/// assert!(door.change_state::<Open>());
/// assert!(!door.change_state::<Open>());
/// assert_eq!(door.owner().log, vec!["closed", "open"]);
/// ```
pub struct StateMachine<T: 'static> {
    id: MachineId,
    owner: T,
    slots: Vec<Slot<T>>,
    ids: BiMap<StateType, StateId>,
    current: Option<StateId>,
    initial: Option<StateId>,
    populated: bool,
    /// Set once an initial state is chosen; plain changes leave it alone.
    initialized: bool,
    observers: Vec<Observer<T>>,
    next_observer: u64,
    pending: VecDeque<Request>,
    history: StateHistory,
    config: MachineConfig,
}

impl<T: 'static> StateMachine<T> {
    /// Create an empty machine around `owner` with the default config.
    pub fn new(owner: T) -> Self {
        Self::from_parts(owner, MachineConfig::default())
    }

    /// Create an empty machine with a custom config.
    ///
    /// Fails if the config does not pass [`MachineConfig::validate`].
    pub fn with_config(owner: T, config: MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(owner, config))
    }

    fn from_parts(owner: T, config: MachineConfig) -> Self {
        Self {
            id: MachineId::new(),
            owner,
            slots: Vec::new(),
            ids: BiMap::new(),
            current: None,
            initial: None,
            populated: false,
            initialized: false,
            observers: Vec::new(),
            next_observer: 0,
            pending: VecDeque::new(),
            history: StateHistory::new(),
            config,
        }
    }

    /// Register `states` in order and optionally start in the first one.
    ///
    /// Only the first call has an effect; later calls return `false`.
    pub fn init<I>(&mut self, states: I, init_use_first_state: bool) -> bool
    where
        I: IntoIterator<Item = BoxedState<T>>,
    {
        if self.populated {
            tracing::trace!(machine = %self.id, "init ignored, machine already populated");
            return false;
        }
        self.populated = true;

        let mut first = None;
        for state in states {
            if let Some(id) = self.register(state) {
                first.get_or_insert(id);
            }
        }

        if init_use_first_state {
            if let Some(id) = first {
                self.set_initial(Some(id));
            }
        }
        true
    }

    /// Register a single state. Fails if its type is already registered or
    /// the machine is full.
    pub fn try_add_state<S: State<T>>(&mut self, state: S) -> bool {
        self.register(BoxedState::new(state)).is_some()
    }

    pub fn try_add_boxed(&mut self, state: BoxedState<T>) -> bool {
        self.register(state).is_some()
    }

    pub fn has_state<S: 'static>(&self) -> bool {
        self.has_state_type(StateType::of::<S>())
    }

    pub fn has_state_type(&self, ty: StateType) -> bool {
        self.ids.contains_left(&ty)
    }

    pub fn state_id<S: 'static>(&self) -> Option<StateId> {
        self.state_id_of(StateType::of::<S>())
    }

    pub fn state_id_of(&self, ty: StateType) -> Option<StateId> {
        self.ids.get_by_left(&ty).copied()
    }

    pub fn state_type(&self, id: StateId) -> Option<StateType> {
        self.ids.get_by_right(&id).copied()
    }

    /// Registered state types in id order.
    pub fn state_types(&self) -> impl Iterator<Item = StateType> + '_ {
        self.slots.iter().map(|slot| slot.ty)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Make `S` the initial state and change to it.
    ///
    /// Only the first initial state counts: once one was set here, by
    /// `init(.., true)` or by a resumed checkpoint, later calls return
    /// `false`. Plain changes made before that do not count.
    pub fn set_initial_state<S: 'static>(&mut self) -> bool {
        self.set_initial_state_by_type(StateType::of::<S>())
    }

    pub fn set_initial_state_by_type(&mut self, ty: StateType) -> bool {
        let id = self.state_id_of(ty);
        self.set_initial(id)
    }

    pub fn set_initial_state_by_id(&mut self, id: StateId) -> bool {
        let id = self.resolve(Target::Id(id));
        self.set_initial(id)
    }

    pub fn change_state<S: 'static>(&mut self) -> bool {
        self.transition(Target::Type(StateType::of::<S>()), None, TransitionCause::Requested)
    }

    pub fn change_state_by_type(&mut self, ty: StateType) -> bool {
        self.transition(Target::Type(ty), None, TransitionCause::Requested)
    }

    pub fn change_state_by_id(&mut self, id: StateId) -> bool {
        self.transition(Target::Id(id), None, TransitionCause::Requested)
    }

    /// Change to `S`, entering it with `context`.
    pub fn change_state_with<S: 'static, C: Any + Send>(&mut self, context: C) -> bool {
        self.transition(
            Target::Type(StateType::of::<S>()),
            Some(StatePayload::new(context)),
            TransitionCause::Requested,
        )
    }

    pub fn change_state_by_id_with(&mut self, id: StateId, payload: StatePayload) -> bool {
        self.transition(Target::Id(id), Some(payload), TransitionCause::Requested)
    }

    /// Change to `S` without notifying observers. `exit`, `enter` and the
    /// history record still happen.
    pub fn change_state_silent<S: 'static>(&mut self) -> bool {
        self.change_state_by_type_silent(StateType::of::<S>())
    }

    pub fn change_state_by_type_silent(&mut self, ty: StateType) -> bool {
        self.change(Target::Type(ty), None, TransitionCause::Requested, Notify::Silent)
    }

    pub fn change_state_by_id_silent(&mut self, id: StateId) -> bool {
        self.change(Target::Id(id), None, TransitionCause::Requested, Notify::Silent)
    }

    pub fn update(&mut self) -> Result<(), MachineError> {
        self.dispatch(Hook::Update)
    }

    pub fn physics_update(&mut self) -> Result<(), MachineError> {
        self.dispatch(Hook::PhysicsUpdate)
    }

    pub fn late_update(&mut self) -> Result<(), MachineError> {
        self.dispatch(Hook::LateUpdate)
    }

    /// Observe every state change. Observers run after the pointer moved and
    /// before the new state is entered.
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&StateChanged, &mut Context<'_, T>) + Send + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Observer {
            id,
            callback: Box::new(observer),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|observer| observer.id != id);
        self.observers.len() != before
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn current_state_type(&self) -> Option<StateType> {
        self.current.map(|id| self.slots[id.index()].ty)
    }

    pub fn current_state_id(&self) -> Option<StateId> {
        self.current
    }

    /// Current state as a single byte, for compact persistence.
    pub fn current_state_byte(&self) -> Option<u8> {
        self.current.map(StateId::as_byte)
    }

    pub fn is_current<S: 'static>(&self) -> bool {
        self.current_state_type() == Some(StateType::of::<S>())
    }

    pub fn initial_state_id(&self) -> Option<StateId> {
        self.initial
    }

    /// Whether an initial state has been chosen.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn owner(&self) -> &T {
        &self.owner
    }

    pub fn owner_mut(&mut self) -> &mut T {
        &mut self.owner
    }

    pub fn into_owner(self) -> T {
        self.owner
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Resolve a target and run the change procedure, then execute any
    /// requests queued along the way.
    pub(crate) fn transition(
        &mut self,
        target: Target,
        payload: Option<StatePayload>,
        cause: TransitionCause,
    ) -> bool {
        self.change(target, payload, cause, Notify::Observers)
    }

    fn change(
        &mut self,
        target: Target,
        payload: Option<StatePayload>,
        cause: TransitionCause,
        notify: Notify,
    ) -> bool {
        let id = self.resolve(target);
        if id.is_none() {
            tracing::trace!(machine = %self.id, ?target, "transition target is not registered");
        }
        let taken = self.set_state_internal(id, payload, cause, notify);
        self.drain_requests();
        taken
    }

    /// Overwrite the bookkeeping from a checkpoint and enter the saved state.
    pub(crate) fn restore(
        &mut self,
        initial: Option<StateId>,
        current: Option<StateId>,
        history: StateHistory,
    ) -> bool {
        self.populated = true;
        let taken =
            self.set_state_internal(current, None, TransitionCause::Restored, Notify::Observers);
        self.drain_requests();
        self.initial = initial.or(self.initial);
        self.initialized = self.initialized || self.initial.is_some() || current.is_some();
        self.history = history;
        taken
    }

    fn register(&mut self, boxed: BoxedState<T>) -> Option<StateId> {
        let ty = boxed.ty;
        if self.ids.contains_left(&ty) {
            tracing::debug!(machine = %self.id, state = ty.short_name(), "state type already registered");
            return None;
        }
        let Some(id) = StateId::from_index(self.slots.len()) else {
            tracing::warn!(
                machine = %self.id,
                state = ty.short_name(),
                capacity = StateId::CAPACITY,
                "state registry is full"
            );
            return None;
        };
        if self.ids.insert(ty, id).is_err() {
            return None;
        }

        let mut state = boxed.state;
        state.attached(self.id, id);
        self.slots.push(Slot { ty, state });
        tracing::trace!(machine = %self.id, state = ty.short_name(), id = id.as_byte(), "state registered");
        Some(id)
    }

    fn resolve(&self, target: Target) -> Option<StateId> {
        match target {
            Target::Type(ty) => self.state_id_of(ty),
            Target::Id(id) => (id.index() < self.slots.len()).then_some(id),
        }
    }

    fn set_initial(&mut self, id: Option<StateId>) -> bool {
        if self.initialized {
            tracing::trace!(machine = %self.id, "initial state already set");
            return false;
        }
        let Some(id) = id else {
            return false;
        };
        self.initial = Some(id);
        self.initialized = true;
        self.set_state_internal(Some(id), None, TransitionCause::Initial, Notify::Observers);
        self.drain_requests();
        true
    }

    fn set_state_internal(
        &mut self,
        target: Option<StateId>,
        payload: Option<StatePayload>,
        cause: TransitionCause,
        notify: Notify,
    ) -> bool {
        let Some(target) = target else {
            return false;
        };
        if target.index() >= self.slots.len() || self.current == Some(target) {
            return false;
        }

        let previous = self.current.map(|id| (self.slots[id.index()].ty, id));
        if let Some(current) = previous {
            let slot = &mut self.slots[current.1.index()];
            let mut cx = Context::new(self.id, &mut self.owner, &mut self.pending, Some(current));
            slot.state.exit(&mut cx);
        }

        self.current = Some(target);

        let state_type = self.slots[target.index()].ty;
        let entered = Some((state_type, target));
        let change = StateChanged {
            previous,
            state_type,
            state_id: target,
        };
        tracing::debug!(
            machine = %self.id,
            from = previous.map(|(ty, _)| ty.short_name()),
            to = state_type.short_name(),
            id = target.as_byte(),
            ?cause,
            silent = matches!(notify, Notify::Silent),
            "state changed"
        );

        if let Notify::Observers = notify {
            for observer in &mut self.observers {
                let mut cx = Context::new(self.id, &mut self.owner, &mut self.pending, entered);
                (observer.callback)(&change, &mut cx);
            }
        }

        self.history.push(
            StateTransition {
                from: previous.map(|(_, id)| id),
                to: target,
                timestamp: Utc::now(),
                cause,
            },
            self.config.history_limit,
        );

        let slot = &mut self.slots[target.index()];
        let mut cx = Context::new(self.id, &mut self.owner, &mut self.pending, entered);
        match payload {
            Some(payload) => slot.state.enter_with(&mut cx, payload),
            None => slot.state.enter(&mut cx),
        }
        true
    }

    fn drain_requests(&mut self) {
        let limit = self.config.max_chained_transitions;
        let mut executed = 0;
        while let Some(request) = self.pending.pop_front() {
            if executed >= limit {
                let dropped = self.pending.len() + 1;
                self.pending.clear();
                tracing::warn!(
                    machine = %self.id,
                    dropped,
                    limit,
                    "chained transition limit reached, dropping queued requests"
                );
                break;
            }
            executed += 1;
            let id = self.resolve(request.target);
            self.set_state_internal(id, request.payload, TransitionCause::Deferred, Notify::Observers);
        }
    }

    fn dispatch(&mut self, hook: Hook) -> Result<(), MachineError> {
        let id = self.current.ok_or(MachineError::NotStarted)?;
        let slot = &mut self.slots[id.index()];
        let mut cx = Context::new(self.id, &mut self.owner, &mut self.pending, Some((slot.ty, id)));
        match hook {
            Hook::Update => slot.state.update(&mut cx),
            Hook::PhysicsUpdate => slot.state.physics_update(&mut cx),
            Hook::LateUpdate => slot.state.late_update(&mut cx),
        }
        self.drain_requests();
        Ok(())
    }
}
