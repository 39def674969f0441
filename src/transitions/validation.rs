//! Transition table validation.
//!
//! Uses `Validation` so that every problem in a table is reported at once
//! instead of stopping at the first one.

use super::error::TableViolation;
use super::transition::Transition;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<TableViolation>>;

/// Validate every edge of a table, accumulating all violations.
pub fn validate_table<T>(transitions: &[Transition<T>]) -> Check {
    let checks: Vec<Check> = transitions
        .iter()
        .enumerate()
        .flat_map(|(index, transition)| {
            [
                check_target(index, transition),
                check_source(index, transition),
                check_condition(index, transition),
                check_self_loop(index, transition),
            ]
        })
        .collect();

    Validation::all_vec(checks).map(|_| ())
}

fn check_target<T>(index: usize, transition: &Transition<T>) -> Check {
    match (transition.to, transition.declared_to) {
        (Some(_), _) => Validation::success(()),
        (None, Some(declared)) => Validation::fail(TableViolation::UnregisteredTarget {
            index,
            state: declared.short_name().to_string(),
        }),
        (None, None) => Validation::fail(TableViolation::MissingTarget { index }),
    }
}

fn check_source<T>(index: usize, transition: &Transition<T>) -> Check {
    match (transition.from, transition.declared_from) {
        (None, Some(declared)) => Validation::fail(TableViolation::UnregisteredSource {
            index,
            state: declared.short_name().to_string(),
        }),
        _ => Validation::success(()),
    }
}

fn check_condition<T>(index: usize, transition: &Transition<T>) -> Check {
    if transition.condition.is_some() {
        Validation::success(())
    } else {
        Validation::fail(TableViolation::MissingCondition { index })
    }
}

fn check_self_loop<T>(index: usize, transition: &Transition<T>) -> Check {
    match (transition.from, transition.to) {
        (Some(from), Some(to)) if from == to => {
            let state = transition
                .declared_to
                .map(|ty| ty.short_name().to_string())
                .unwrap_or_else(|| to.to_string());
            Validation::fail(TableViolation::SelfLoop { index, state })
        }
        _ => Validation::success(()),
    }
}

/// Collapse a validation outcome into a `Result`.
pub fn into_result(validation: Check) -> Result<(), Vec<TableViolation>> {
    match validation {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Guard, StateId, StateType};

    struct Idle;
    struct Ghost;

    fn edge(from: Option<u8>, to: u8) -> Transition<()> {
        Transition::new(from.map(StateId::new), StateId::new(to), 0, Guard::always())
    }

    #[test]
    fn valid_table_passes() {
        let table = vec![edge(Some(0), 1), edge(None, 0)];
        assert!(into_result(validate_table(&table)).is_ok());
    }

    #[test]
    fn empty_table_passes() {
        let table: Vec<Transition<()>> = Vec::new();
        assert!(into_result(validate_table(&table)).is_ok());
    }

    #[test]
    fn all_violations_are_accumulated() {
        let mut unregistered_source = edge(None, 1);
        unregistered_source.declared_from = Some(StateType::of::<Ghost>());

        let mut unregistered_target = edge(Some(0), 1);
        unregistered_target.to = None;
        unregistered_target.declared_to = Some(StateType::of::<Ghost>());

        let mut no_condition = edge(Some(1), 0);
        no_condition.condition = None;

        let mut self_loop = edge(Some(0), 0);
        self_loop.declared_to = Some(StateType::of::<Idle>());

        let table = vec![unregistered_source, unregistered_target, no_condition, self_loop];

        let violations = into_result(validate_table(&table)).unwrap_err();

        assert_eq!(violations.len(), 4);
        assert!(violations.contains(&TableViolation::UnregisteredSource {
            index: 0,
            state: "Ghost".to_string()
        }));
        assert!(violations.contains(&TableViolation::UnregisteredTarget {
            index: 1,
            state: "Ghost".to_string()
        }));
        assert!(violations.contains(&TableViolation::MissingCondition { index: 2 }));
        assert!(violations.contains(&TableViolation::SelfLoop {
            index: 3,
            state: "Idle".to_string()
        }));
    }

    #[test]
    fn missing_target_without_declaration() {
        let mut transition = edge(None, 0);
        transition.to = None;

        let violations = into_result(validate_table(&[transition])).unwrap_err();
        assert_eq!(violations, vec![TableViolation::MissingTarget { index: 0 }]);
    }
}
