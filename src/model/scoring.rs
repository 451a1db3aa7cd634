use serde::{Deserialize, Serialize};

/// Hits recorded against the expected hits of one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub hits: i32,
    pub target_hits: i32
}

impl RoundResult {
    pub fn score(&self) -> f64 {
        round_score(self.hits, self.target_hits)
    }
}

/// Percentage of the target hits achieved in one round. Scores above 100
/// are legitimate. A non-positive target scores 0.
pub fn round_score(hits: i32, target_hits: i32) -> f64 {
    if target_hits <= 0 {
        return 0.0;
    }

    (hits as f64 / target_hits as f64) * 100.0
}

/// Mean of a routine's round scores. Not rounded.
pub fn routine_score(round_scores: &[f64]) -> f64 {
    mean(round_scores)
}

/// Mean of every round score recorded in the session. Not rounded.
pub fn session_score(round_scores: &[f64]) -> f64 {
    mean(round_scores)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().sum::<f64>() / values.len() as f64
}
