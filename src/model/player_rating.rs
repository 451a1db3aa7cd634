use serde::{Deserialize, Serialize};

use crate::{
    model::constants::{PR_MATCH_WEIGHT, PR_TRAINING_WEIGHT, RATING_CEILING, RATING_FLOOR},
    utils::rounding::round_one_decimal
};

/// Relative weights of the training rating (alpha) and OMR (beta)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub training: f64,
    pub matches: f64
}

impl Default for BlendWeights {
    fn default() -> Self {
        BlendWeights {
            training: PR_TRAINING_WEIGHT,
            matches: PR_MATCH_WEIGHT
        }
    }
}

/// Published player rating. With both inputs present this is the weighted
/// blend, with one it is that value, with neither it is undefined.
pub fn player_rating(training_rating: Option<f64>, omr: Option<f64>, weights: BlendWeights) -> Option<f64> {
    let blended = match (training_rating, omr) {
        (Some(tr), Some(omr)) => {
            (tr * weights.training + omr * weights.matches) / (weights.training + weights.matches)
        }
        (Some(tr), None) => tr,
        (None, Some(omr)) => omr,
        (None, None) => return None
    };

    Some(round_one_decimal(blended).clamp(RATING_FLOOR, RATING_CEILING))
}
