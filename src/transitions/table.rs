//! State machine that picks its next state from a transition table.

use super::error::{TableViolation, TransitionError};
use super::transition::Transition;
use super::validation::validate_table;
use crate::core::{Guard, StateType, Target, TransitionCause};
use crate::machine::{ConfigError, MachineConfig, MachineError, StateMachine};
use std::ops::{Deref, DerefMut};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// A [`StateMachine`] with a declarative transition table.
///
/// Call [`set_state_by_transition`](Self::set_state_by_transition) (or
/// [`tick`](Self::tick)) once per scheduler tick to let the table choose the
/// next state. Everything else derefs to the inner machine.
///
/// Selection scans edges in registration order and keeps a running best:
/// a satisfied wildcard replaces it when its priority is greater than or
/// equal to the best's, a satisfied sourced edge only when strictly greater.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{Context, State};
/// use statecraft::transitions::TransitionStateMachine;
/// use statecraft::states;
///
/// struct Body {
///     speed: u32,
/// }
///
/// struct Idle;
/// struct Walking;
///
/// impl State<Body> for Idle {
///     fn enter(&mut self, _cx: &mut Context<'_, Body>) {}
///     fn exit(&mut self, _cx: &mut Context<'_, Body>) {}
/// }
///
/// impl State<Body> for Walking {
///     fn enter(&mut self, _cx: &mut Context<'_, Body>) {}
///     fn exit(&mut self, _cx: &mut Context<'_, Body>) {}
/// }
///
/// let mut machine = TransitionStateMachine::new(Body { speed: 0 });
/// machine.init(states![Idle, Walking], true);
/// machine.add_transition::<Idle, Walking>(|body| body.speed > 0).unwrap();
/// machine.add_any_transition::<Idle>(|body| body.speed == 0).unwrap();
///
/// machine.owner_mut().speed = 3;
/// assert!(machine.set_state_by_transition());
/// assert!(machine.is_current::<Walking>());
/// ```
pub struct TransitionStateMachine<T: 'static> {
    machine: StateMachine<T>,
    transitions: Vec<Transition<T>>,
}

impl<T: 'static> TransitionStateMachine<T> {
    pub fn new(owner: T) -> Self {
        Self::from_machine(StateMachine::new(owner))
    }

    pub fn with_config(owner: T, config: MachineConfig) -> Result<Self, ConfigError> {
        StateMachine::with_config(owner, config).map(Self::from_machine)
    }

    pub fn from_machine(machine: StateMachine<T>) -> Self {
        Self {
            machine,
            transitions: Vec::new(),
        }
    }

    pub fn into_machine(self) -> StateMachine<T> {
        self.machine
    }

    /// Add an edge from `From` to `To`.
    ///
    /// Both states are looked up now; see [`MachineConfig::strict_transitions`]
    /// for how unregistered endpoints are handled.
    pub fn add_transition<From: 'static, To: 'static>(
        &mut self,
        condition: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<(), TransitionError> {
        self.add_transition_with_priority::<From, To>(0, condition)
    }

    pub fn add_transition_with_priority<From: 'static, To: 'static>(
        &mut self,
        priority: i32,
        condition: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<(), TransitionError> {
        self.insert_edge(
            Some(StateType::of::<From>()),
            StateType::of::<To>(),
            priority,
            Guard::new(condition),
        )
    }

    /// Add a wildcard edge to `To` that applies from any state.
    pub fn add_any_transition<To: 'static>(
        &mut self,
        condition: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<(), TransitionError> {
        self.add_any_transition_with_priority::<To>(0, condition)
    }

    pub fn add_any_transition_with_priority<To: 'static>(
        &mut self,
        priority: i32,
        condition: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<(), TransitionError> {
        self.insert_edge(None, StateType::of::<To>(), priority, Guard::new(condition))
    }

    /// Append a prebuilt edge as is.
    pub fn add(&mut self, transition: Transition<T>) {
        self.transitions.push(transition);
    }

    pub fn transitions(&self) -> &[Transition<T>] {
        &self.transitions
    }

    pub fn clear_transitions(&mut self) {
        self.transitions.clear();
    }

    /// Index of the edge the table would take right now, if any.
    ///
    /// Evaluates conditions but changes nothing else.
    pub fn select_transition(&self) -> Option<usize> {
        let current = self.machine.current_state_id();
        let owner = self.machine.owner();
        let mut best: Option<(usize, i32)> = None;

        for (index, transition) in self.transitions.iter().enumerate() {
            if !transition.is_valid() || !transition.can_fire(current, owner) {
                continue;
            }
            let replace = match best {
                None => true,
                Some((_, priority)) if transition.is_wildcard() => transition.priority >= priority,
                Some((_, priority)) => transition.priority > priority,
            };
            if replace {
                best = Some((index, transition.priority));
            }
        }

        tracing::trace!(
            machine = %self.machine.id(),
            edges = self.transitions.len(),
            selected = ?best.map(|(index, _)| index),
            "transition table evaluated"
        );
        best.map(|(index, _)| index)
    }

    /// Evaluate the table and move to the selected destination.
    ///
    /// Returns `false` when nothing fires or the winner targets the current
    /// state.
    pub fn set_state_by_transition(&mut self) -> bool {
        let Some(index) = self.select_transition() else {
            return false;
        };
        let Some(to) = self.transitions[index].to else {
            return false;
        };
        if self.machine.current_state_id() == Some(to) {
            return false;
        }
        self.machine
            .transition(Target::Id(to), None, TransitionCause::Table)
    }

    /// Evaluate the table, then run the current state's `update`.
    pub fn tick(&mut self) -> Result<bool, MachineError> {
        let changed = self.set_state_by_transition();
        self.machine.update()?;
        Ok(changed)
    }

    /// Check the whole table, reporting every problem found.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<TableViolation>> {
        validate_table(&self.transitions)
    }

    fn insert_edge(
        &mut self,
        from: Option<StateType>,
        to: StateType,
        priority: i32,
        condition: Guard<T>,
    ) -> Result<(), TransitionError> {
        let strict = self.machine.config().strict_transitions;
        let from_id = from.and_then(|ty| self.machine.state_id_of(ty));
        let to_id = self.machine.state_id_of(to);

        if let (Some(ty), None) = (from, from_id) {
            if strict {
                return Err(TransitionError::UnregisteredSource {
                    state: ty.short_name().to_string(),
                });
            }
            tracing::warn!(
                machine = %self.machine.id(),
                state = ty.short_name(),
                "transition source is not registered, edge acts as a wildcard"
            );
        }
        if to_id.is_none() {
            if strict {
                return Err(TransitionError::UnregisteredTarget {
                    state: to.short_name().to_string(),
                });
            }
            tracing::warn!(
                machine = %self.machine.id(),
                state = to.short_name(),
                "transition target is not registered, edge never fires"
            );
        }

        self.transitions.push(Transition {
            from: from_id,
            to: to_id,
            condition: Some(condition),
            priority,
            declared_from: from,
            declared_to: Some(to),
        });
        Ok(())
    }
}

impl<T: 'static> Deref for TransitionStateMachine<T> {
    type Target = StateMachine<T>;

    fn deref(&self) -> &Self::Target {
        &self.machine
    }
}

impl<T: 'static> DerefMut for TransitionStateMachine<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Context, State, StateId};
    use crate::states;
    use crate::transitions::validation::into_result;

    #[derive(Default)]
    struct Body {
        speed: u32,
        entered: Vec<&'static str>,
    }

    struct Idle;
    struct Walking;
    struct Running;
    struct Ghost;

    macro_rules! plain_state {
        ($name:ident) => {
            impl State<Body> for $name {
                fn enter(&mut self, cx: &mut Context<'_, Body>) {
                    cx.owner_mut().entered.push(stringify!($name));
                }

                fn exit(&mut self, _cx: &mut Context<'_, Body>) {}
            }
        };
    }

    plain_state!(Idle);
    plain_state!(Walking);
    plain_state!(Running);

    fn locomotion() -> TransitionStateMachine<Body> {
        let mut machine = TransitionStateMachine::new(Body::default());
        machine.init(states![Idle, Walking, Running], true);
        machine
            .add_transition::<Idle, Walking>(|b| b.speed > 0)
            .unwrap();
        machine
            .add_transition::<Walking, Running>(|b| b.speed > 5)
            .unwrap();
        machine
            .add_any_transition_with_priority::<Idle>(10, |b| b.speed == 0)
            .unwrap();
        machine
    }

    #[test]
    fn sourced_edge_fires_from_matching_state() {
        let mut machine = locomotion();
        machine.change_state::<Walking>();
        machine.owner_mut().speed = 6;

        assert!(machine.set_state_by_transition());
        assert!(machine.is_current::<Running>());
        assert_eq!(machine.current_state_id(), Some(StateId::new(2)));
    }

    #[test]
    fn wildcard_fires_from_any_state() {
        let mut machine = locomotion();
        machine.change_state::<Running>();
        machine.owner_mut().speed = 0;

        assert!(machine.set_state_by_transition());
        assert!(machine.is_current::<Idle>());
    }

    #[test]
    fn sourced_edge_ignored_from_other_states() {
        let mut machine = locomotion();
        machine.change_state::<Running>();
        machine.owner_mut().speed = 3;

        assert_eq!(machine.select_transition(), None);
        assert!(!machine.set_state_by_transition());
        assert!(machine.is_current::<Running>());
    }

    #[test]
    fn wildcard_to_current_state_is_not_taken() {
        let mut machine = locomotion();

        assert_eq!(machine.select_transition(), Some(2));
        assert!(!machine.set_state_by_transition());
        assert_eq!(machine.owner().entered, vec!["Idle"]);
    }

    #[test]
    fn later_wildcard_wins_priority_tie() {
        let mut machine = TransitionStateMachine::new(Body::default());
        machine.init(states![Idle, Walking, Running], true);
        machine.add_any_transition_with_priority::<Walking>(1, |_| true).unwrap();
        machine.add_any_transition_with_priority::<Running>(1, |_| true).unwrap();

        assert_eq!(machine.select_transition(), Some(1));
        assert!(machine.set_state_by_transition());
        assert!(machine.is_current::<Running>());
    }

    #[test]
    fn sourced_edge_does_not_win_priority_tie() {
        let mut machine = TransitionStateMachine::new(Body::default());
        machine.init(states![Idle, Walking, Running], true);
        machine.add_any_transition_with_priority::<Walking>(1, |_| true).unwrap();
        machine.add_transition_with_priority::<Idle, Running>(1, |_| true).unwrap();

        assert_eq!(machine.select_transition(), Some(0));
    }

    #[test]
    fn sourced_edge_with_higher_priority_wins() {
        let mut machine = TransitionStateMachine::new(Body::default());
        machine.init(states![Idle, Walking, Running], true);
        machine.add_any_transition_with_priority::<Walking>(1, |_| true).unwrap();
        machine.add_transition_with_priority::<Idle, Running>(2, |_| true).unwrap();

        assert_eq!(machine.select_transition(), Some(1));
    }

    #[test]
    fn wildcard_with_lower_priority_loses() {
        let mut machine = TransitionStateMachine::new(Body::default());
        machine.init(states![Idle, Walking, Running], true);
        machine.add_transition_with_priority::<Idle, Walking>(5, |_| true).unwrap();
        machine.add_any_transition_with_priority::<Running>(4, |_| true).unwrap();

        assert_eq!(machine.select_transition(), Some(0));
    }

    #[test]
    fn invalid_edges_are_skipped() {
        let mut machine = locomotion();
        let mut broken = Transition::new(None, StateId::new(1), 100, Guard::always());
        broken.condition = None;
        machine.add(broken);
        machine.owner_mut().speed = 1;

        assert_eq!(machine.select_transition(), Some(0));
    }

    #[test]
    fn table_transitions_are_recorded() {
        let mut machine = locomotion();
        machine.owner_mut().speed = 1;
        machine.set_state_by_transition();

        assert_eq!(
            machine.history().last().map(|t| t.cause),
            Some(TransitionCause::Table)
        );
    }

    #[test]
    fn tick_evaluates_then_updates() {
        let mut machine = locomotion();
        machine.owner_mut().speed = 1;

        assert_eq!(machine.tick(), Ok(true));
        assert_eq!(machine.tick(), Ok(false));
        assert!(machine.is_current::<Walking>());
    }

    #[test]
    fn tick_before_start_fails() {
        let mut machine: TransitionStateMachine<Body> = TransitionStateMachine::new(Body::default());
        assert_eq!(machine.tick(), Err(MachineError::NotStarted));
    }

    #[test]
    fn lenient_mode_keeps_degraded_edges() {
        let mut machine = locomotion();
        machine.add_transition::<Ghost, Running>(|_| true).unwrap();
        machine.add_any_transition::<Ghost>(|_| true).unwrap();

        let ghost_source = &machine.transitions()[3];
        assert!(ghost_source.is_wildcard());
        assert!(ghost_source.is_valid());
        assert!(!machine.transitions()[4].is_valid());

        // the unregistered source behaves as a wildcard
        machine.owner_mut().speed = 3;
        assert!(machine.set_state_by_transition());
        assert!(machine.is_current::<Running>());
    }

    #[test]
    fn strict_mode_rejects_unregistered_endpoints() {
        let config = MachineConfig::default().strict_transitions(true);
        let mut machine = TransitionStateMachine::with_config(Body::default(), config).unwrap();
        machine.init(states![Idle, Walking], true);

        assert_eq!(
            machine.add_transition::<Ghost, Walking>(|_| true),
            Err(TransitionError::UnregisteredSource {
                state: "Ghost".to_string()
            })
        );
        assert_eq!(
            machine.add_any_transition::<Ghost>(|_| true),
            Err(TransitionError::UnregisteredTarget {
                state: "Ghost".to_string()
            })
        );
        assert!(machine.transitions().is_empty());
    }

    #[test]
    fn validate_reports_degraded_edges() {
        let mut machine = locomotion();
        assert!(into_result(machine.validate()).is_ok());

        machine.add_transition::<Ghost, Running>(|_| true).unwrap();
        machine.add_transition::<Idle, Idle>(|_| true).unwrap();

        let violations = into_result(machine.validate()).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(violations.contains(&TableViolation::UnregisteredSource {
            index: 3,
            state: "Ghost".to_string()
        }));
        assert!(violations.contains(&TableViolation::SelfLoop {
            index: 4,
            state: "Idle".to_string()
        }));
    }

    #[test]
    fn zero_chain_limit_is_rejected() {
        let config = MachineConfig::default().max_chained_transitions(0);

        let result = TransitionStateMachine::with_config(Body::default(), config);
        assert!(matches!(result, Err(ConfigError::ZeroChainLimit)));
    }

    #[test]
    fn clear_transitions_empties_table() {
        let mut machine = locomotion();
        machine.clear_transitions();

        assert!(machine.transitions().is_empty());
        assert_eq!(machine.select_transition(), None);
    }
}
