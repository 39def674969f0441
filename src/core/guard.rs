//! Transition conditions.
//!
//! Guards are predicates over the machine owner. They are evaluated every
//! time a transition table is scanned; results are never cached.

/// Predicate deciding whether a transition may fire.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Guard;
///
/// struct Body {
///     speed: f32,
/// }
///
/// let moving = Guard::new(|body: &Body| body.speed > 0.0);
///
/// assert!(moving.check(&Body { speed: 1.5 }));
/// assert!(!moving.check(&Body { speed: 0.0 }));
/// ```
pub struct Guard<T> {
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Guard<T> {
    /// Create a guard from a predicate over the owner.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Guard that always passes.
    pub fn always() -> Self {
        Guard::new(|_| true)
    }

    /// Evaluate the predicate against the owner.
    pub fn check(&self, owner: &T) -> bool {
        (self.predicate)(owner)
    }
}

impl<T> std::fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard")
    }
}
