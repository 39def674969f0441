//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::{State, StateId, StateType};
use crate::machine::{BoxedState, MachineConfig, StateMachine};
use crate::transitions::TransitionStateMachine;
use std::collections::HashSet;

/// Builder for constructing state machines with a fluent API.
///
/// Unlike [`StateMachine::init`], which silently skips duplicates, the
/// builder rejects inconsistent setups up front.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::StateMachineBuilder;
/// use statecraft::passive_state;
///
/// struct Turnstile;
/// struct Locked;
/// struct Unlocked;
///
/// passive_state!(Turnstile => Locked, Unlocked);
///
/// let machine = StateMachineBuilder::new(Turnstile)
///     .state(Locked)
///     .state(Unlocked)
///     .initial::<Unlocked>()
///     .build()
///     .unwrap();
///
/// assert!(machine.is_current::<Unlocked>());
/// ```
pub struct StateMachineBuilder<T: 'static> {
    owner: T,
    config: MachineConfig,
    states: Vec<BoxedState<T>>,
    initial: Option<StateType>,
}

impl<T: 'static> StateMachineBuilder<T> {
    /// Create a new builder around the machine owner.
    pub fn new(owner: T) -> Self {
        Self {
            owner,
            config: MachineConfig::default(),
            states: Vec::new(),
            initial: None,
        }
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a state. Registration order decides state ids.
    pub fn state<S: State<T>>(mut self, state: S) -> Self {
        self.states.push(BoxedState::new(state));
        self
    }

    /// Register several prebuilt states, e.g. from [`states!`](crate::states).
    pub fn states(mut self, states: Vec<BoxedState<T>>) -> Self {
        self.states.extend(states);
        self
    }

    /// Start in `S` instead of the first registered state.
    pub fn initial<S: 'static>(mut self) -> Self {
        self.initial = Some(StateType::of::<S>());
        self
    }

    /// Build the state machine and enter its initial state.
    pub fn build(self) -> Result<StateMachine<T>, BuildError> {
        self.config.validate()?;

        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }
        if self.states.len() > StateId::CAPACITY {
            return Err(BuildError::TooManyStates {
                count: self.states.len(),
                capacity: StateId::CAPACITY,
            });
        }

        let mut seen = HashSet::new();
        for state in &self.states {
            let ty = state.state_type();
            if !seen.insert(ty) {
                return Err(BuildError::DuplicateState {
                    state: ty.short_name().to_string(),
                });
            }
        }

        if let Some(initial) = self.initial {
            if !seen.contains(&initial) {
                return Err(BuildError::InitialNotRegistered {
                    state: initial.short_name().to_string(),
                });
            }
        }

        let mut machine = StateMachine::with_config(self.owner, self.config)?;
        match self.initial {
            Some(initial) => {
                machine.init(self.states, false);
                machine.set_initial_state_by_type(initial);
            }
            None => {
                machine.init(self.states, true);
            }
        }

        Ok(machine)
    }

    /// Build a machine that also carries a transition table.
    pub fn build_with_transitions(self) -> Result<TransitionStateMachine<T>, BuildError> {
        self.build().map(TransitionStateMachine::from_machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Context;
    use crate::machine::ConfigError;
    use crate::states;

    #[derive(Default)]
    struct Log {
        entered: Vec<&'static str>,
    }

    struct Initial;
    struct Processing;
    struct Complete;

    impl State<Log> for Initial {
        fn enter(&mut self, cx: &mut Context<'_, Log>) {
            cx.owner_mut().entered.push("Initial");
        }
        fn exit(&mut self, _cx: &mut Context<'_, Log>) {}
    }

    impl State<Log> for Processing {
        fn enter(&mut self, cx: &mut Context<'_, Log>) {
            cx.owner_mut().entered.push("Processing");
        }
        fn exit(&mut self, _cx: &mut Context<'_, Log>) {}
    }

    impl State<Log> for Complete {
        fn enter(&mut self, cx: &mut Context<'_, Log>) {
            cx.owner_mut().entered.push("Complete");
        }
        fn exit(&mut self, _cx: &mut Context<'_, Log>) {}
    }

    #[test]
    fn builder_requires_states() {
        let result = StateMachineBuilder::new(Log::default()).build();

        assert!(matches!(result, Err(BuildError::NoStates)));
    }

    #[test]
    fn builder_rejects_duplicates() {
        let result = StateMachineBuilder::new(Log::default())
            .state(Initial)
            .state(Initial)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::DuplicateState { state }) if state == "Initial"
        ));
    }

    #[test]
    fn builder_rejects_unknown_initial() {
        let result = StateMachineBuilder::new(Log::default())
            .state(Initial)
            .initial::<Complete>()
            .build();

        assert!(matches!(result, Err(BuildError::InitialNotRegistered { .. })));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = StateMachineBuilder::new(Log::default())
            .config(MachineConfig::default().max_chained_transitions(0))
            .state(Initial)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::Config(ConfigError::ZeroChainLimit))
        ));
    }

    #[test]
    fn builder_starts_in_first_state_by_default() {
        let machine = StateMachineBuilder::new(Log::default())
            .state(Initial)
            .state(Processing)
            .build()
            .unwrap();

        assert!(machine.is_current::<Initial>());
        assert_eq!(machine.owner().entered, vec!["Initial"]);
    }

    #[test]
    fn builder_honors_explicit_initial() {
        let machine = StateMachineBuilder::new(Log::default())
            .states(states![Initial, Processing, Complete])
            .initial::<Processing>()
            .build()
            .unwrap();

        assert!(machine.is_current::<Processing>());
        assert_eq!(machine.initial_state_id(), Some(StateId::new(1)));
        assert_eq!(machine.owner().entered, vec!["Processing"]);
    }

    #[test]
    fn builder_can_produce_transition_machine() {
        let mut machine = StateMachineBuilder::new(Log::default())
            .state(Initial)
            .state(Complete)
            .build_with_transitions()
            .unwrap();

        machine.add_any_transition::<Complete>(|_| true).unwrap();
        assert!(machine.set_state_by_transition());
        assert!(machine.is_current::<Complete>());
    }
}
