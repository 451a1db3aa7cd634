use serde::{Deserialize, Serialize};

use crate::{
    database::db_structs::{CheckoutSettings, LevelBand},
    error::{EngineError, EngineResult},
    model::constants::{CHECKOUT_DOUBLE_THRESHOLD, CHECKOUT_LOGISTIC_K, DEFAULT_CHECKOUT_ATTEMPTS, DEFAULT_CHECKOUT_THROWS},
    utils::rounding::round_half_up
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckoutInput {
    pub target: i32,
    pub allowed_throws: i32,
    pub attempt_count: i32,
    pub three_dart_avg: f64,
    /// Percentage, 0..=100. Missing is treated as 0
    pub double_acc_pct: Option<f64>
}

impl CheckoutInput {
    /// Builds the input for a band, using the level-specific routine shape
    /// when one is configured and the defaults otherwise.
    pub fn for_band(target: i32, band: &LevelBand, settings: Option<CheckoutSettings>) -> Self {
        let settings = settings.unwrap_or_default();
        CheckoutInput {
            target,
            allowed_throws: settings.allowed_throws,
            attempt_count: settings.attempt_count,
            three_dart_avg: band.three_dart_avg,
            double_acc_pct: band.double_acc_pct
        }
    }
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            allowed_throws: DEFAULT_CHECKOUT_THROWS,
            attempt_count: DEFAULT_CHECKOUT_ATTEMPTS
        }
    }
}

/// Every intermediate of the expectation, so callers can show their working
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckoutExpectation {
    /// Points to score before a finishing double is on (`W`)
    pub scoring_required: f64,
    /// Darts expected to be spent scoring (`E`)
    pub expected_scoring_darts: f64,
    pub p_reach: f64,
    /// Darts left at the double (`n`)
    pub darts_at_double: i32,
    pub p_finish_given_reach: f64,
    pub p_checkout: f64,
    pub expected_successes: f64,
    pub expected_successes_int: i32
}

fn validate(input: &CheckoutInput) -> EngineResult<()> {
    if input.allowed_throws < 1 {
        return Err(EngineError::invalid("allowed_throws", "must be at least 1"));
    }

    if input.attempt_count < 0 {
        return Err(EngineError::invalid("attempt_count", "must not be negative"));
    }

    if !input.three_dart_avg.is_finite() || input.three_dart_avg < 0.0 {
        return Err(EngineError::invalid("three_dart_avg", "must be a non-negative number"));
    }

    if let Some(pct) = input.double_acc_pct {
        if !(0.0..=100.0).contains(&pct) {
            return Err(EngineError::invalid("double_acc_pct", "must be within 0..=100"));
        }
    }

    Ok(())
}

/// Logistic chance of reaching a finishing double with `scoring_darts`
/// available, when `expected_darts` are expected to be needed.
pub fn reach_probability(scoring_darts: f64, expected_darts: f64) -> f64 {
    if expected_darts == 0.0 {
        return 1.0;
    }

    let r = scoring_darts / expected_darts;
    1.0 / (1.0 + (-CHECKOUT_LOGISTIC_K * (r - 1.0)).exp())
}

/// Estimates how many of `attempt_count` checkout attempts a player at the
/// given three-dart average and double accuracy is expected to complete.
pub fn expected_checkouts(input: &CheckoutInput) -> EngineResult<CheckoutExpectation> {
    validate(input)?;

    let allowed = input.allowed_throws as f64;
    let scoring_darts = allowed - 1.0;

    let scoring_required = ((input.target - CHECKOUT_DOUBLE_THRESHOLD).max(0)) as f64;
    let points_per_dart = input.three_dart_avg / 3.0;
    let expected_scoring_darts = if scoring_required == 0.0 {
        0.0
    } else if points_per_dart == 0.0 {
        f64::INFINITY
    } else {
        scoring_required / points_per_dart
    };

    let p_reach = reach_probability(scoring_darts, expected_scoring_darts);

    let darts_at_double = (round_half_up(allowed - expected_scoring_darts.min(scoring_darts)) as i32)
        .clamp(1, input.allowed_throws);

    let p_double = input.double_acc_pct.unwrap_or(0.0) / 100.0;
    let p_finish_given_reach = 1.0 - (1.0 - p_double).powi(darts_at_double);

    let p_checkout = p_reach * p_finish_given_reach;
    let expected_successes = input.attempt_count as f64 * p_checkout;
    let expected_successes_int = (round_half_up(expected_successes) as i32).clamp(0, input.attempt_count);

    Ok(CheckoutExpectation {
        scoring_required,
        expected_scoring_darts,
        p_reach,
        darts_at_double,
        p_finish_given_reach,
        p_checkout,
        expected_successes,
        expected_successes_int
    })
}
