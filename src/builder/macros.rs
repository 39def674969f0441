//! Macros for ergonomic state machine construction.

/// Build a `Vec<BoxedState<T>>` from state values, in order.
///
/// The order is the registration order, and therefore the id order.
///
/// # Example
///
/// ```
/// use statecraft::machine::StateMachine;
/// use statecraft::{passive_state, states};
///
/// struct Light;
///
/// struct Red;
/// struct Green;
///
/// passive_state!(Light => Red, Green);
///
/// let mut machine = StateMachine::new(Light);
/// machine.init(states![Red, Green], true);
///
/// assert!(machine.is_current::<Red>());
/// ```
#[macro_export]
macro_rules! states {
    ($($state:expr),* $(,)?) => {
        vec![$($crate::machine::BoxedState::new($state)),*]
    };
}

/// Implement `State<Owner>` with empty hooks for marker types.
///
/// Useful for states whose only purpose is to be current, e.g. states that
/// are observed through `StateChanged` notifications or a transition table.
///
/// # Example
///
/// ```
/// use statecraft::passive_state;
///
/// struct Door;
/// struct Open;
/// struct Closed;
///
/// passive_state!(Door => Open, Closed);
/// ```
#[macro_export]
macro_rules! passive_state {
    ($owner:ty => $($state:ty),+ $(,)?) => {
        $(
            impl $crate::core::State<$owner> for $state {
                fn enter(&mut self, _cx: &mut $crate::core::Context<'_, $owner>) {}

                fn exit(&mut self, _cx: &mut $crate::core::Context<'_, $owner>) {}
            }
        )+
    };
}
