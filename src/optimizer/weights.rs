//! Objective weight normalization
//!
//! Weights are repaired rather than rejected so that a usable schedule is
//! always produced: the objective must be a convex combination of cost and
//! comfort before the problem is built.

use crate::domain::ObjectiveWeights;

use super::types::{ScheduleError, ScheduleResult, WEIGHT_SUM_TOLERANCE};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedWeights {
    pub weights: ObjectiveWeights,
    /// True when the raw weights were changed
    pub was_adjusted: bool,
}

/// Normalizes `cost_weight` / `comfort_weight` to sum to 1.
///
/// - both non-negative and sum within [`WEIGHT_SUM_TOLERANCE`] of 1: passed
///   through untouched
/// - raw sum positive: negative parts are clamped to 0 and both are divided
///   by the clamped sum
/// - raw sum zero or negative: 0.5 / 0.5
///
/// Non-finite weights cannot be repaired and are rejected.
pub fn normalize_weights(cost_weight: f64, comfort_weight: f64) -> ScheduleResult<NormalizedWeights> {
    if !cost_weight.is_finite() || !comfort_weight.is_finite() {
        return Err(ScheduleError::invalid(format!(
            "objective weights must be finite (cost_weight={}, comfort_weight={})",
            cost_weight, comfort_weight
        )));
    }

    if cost_weight >= 0.0
        && comfort_weight >= 0.0
        && (cost_weight + comfort_weight - 1.0).abs() < WEIGHT_SUM_TOLERANCE
    {
        return Ok(NormalizedWeights {
            weights: ObjectiveWeights {
                cost: cost_weight,
                comfort: comfort_weight,
            },
            was_adjusted: false,
        });
    }

    let weights = if cost_weight + comfort_weight > 0.0 {
        // clamped sum is at least the raw sum, so it is positive too
        let cost = cost_weight.max(0.0);
        let comfort = comfort_weight.max(0.0);
        let total = cost + comfort;
        ObjectiveWeights {
            cost: cost / total,
            comfort: comfort / total,
        }
    } else {
        ObjectiveWeights {
            cost: 0.5,
            comfort: 0.5,
        }
    };

    tracing::warn!(
        raw_cost_weight = cost_weight,
        raw_comfort_weight = comfort_weight,
        cost_weight = weights.cost,
        comfort_weight = weights.comfort,
        "objective weights are not a convex combination, normalizing"
    );

    Ok(NormalizedWeights {
        weights,
        was_adjusted: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.6, 0.4, 0.6, 0.4, false)]
    #[case(1.0, 0.0, 1.0, 0.0, false)]
    #[case(0.3, 0.3, 0.5, 0.5, true)]
    #[case(3.0, 1.0, 0.75, 0.25, true)]
    #[case(0.0, 0.0, 0.5, 0.5, true)]
    #[case(-1.0, -2.0, 0.5, 0.5, true)]
    #[case(-0.5, 0.5, 0.5, 0.5, true)]
    #[case(-1.0, 0.4, 0.5, 0.5, true)]
    #[case(-0.5, 1.5, 0.0, 1.0, true)]
    #[case(-1.0, 3.0, 0.0, 1.0, true)]
    fn test_normalize_weights(
        #[case] cost: f64,
        #[case] comfort: f64,
        #[case] expected_cost: f64,
        #[case] expected_comfort: f64,
        #[case] adjusted: bool,
    ) {
        let n = normalize_weights(cost, comfort).unwrap();
        assert!((n.weights.cost - expected_cost).abs() < 1e-12);
        assert!((n.weights.comfort - expected_comfort).abs() < 1e-12);
        assert_eq!(n.was_adjusted, adjusted);
    }

    #[test]
    fn test_exact_inputs_not_perturbed() {
        let n = normalize_weights(0.6, 0.4 + 1e-9).unwrap();
        assert_eq!(n.weights.cost, 0.6);
        assert_eq!(n.weights.comfort, 0.4 + 1e-9);
        assert!(!n.was_adjusted);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            normalize_weights(f64::NAN, 0.5),
            Err(ScheduleError::InvalidRequest(_))
        ));
        assert!(normalize_weights(0.5, f64::INFINITY).is_err());
    }

    #[test]
    fn test_non_positive_raw_sum_resets_to_even_split() {
        // clamping first would turn (-0.5, 0.5) into (0, 1)
        let n = normalize_weights(-0.5, 0.5).unwrap();
        assert_eq!(n.weights, ObjectiveWeights { cost: 0.5, comfort: 0.5 });
        assert!(n.was_adjusted);
    }

    proptest! {
        #[test]
        fn prop_adjusted_weights_form_convex_combination(
            cost in -10.0f64..10.0,
            comfort in -10.0f64..10.0,
        ) {
            let n = normalize_weights(cost, comfort).unwrap();
            prop_assert!((n.weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
            prop_assert!(n.weights.cost >= 0.0);
            prop_assert!(n.weights.comfort >= 0.0);
        }

        #[test]
        fn prop_valid_weights_stay_non_negative(cost in 0.0f64..1.0, comfort in 0.0f64..1.0) {
            let n = normalize_weights(cost, comfort).unwrap();
            prop_assert!(n.weights.cost >= 0.0 && n.weights.comfort >= 0.0);
            prop_assert!((n.weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        }
    }
}
