use serde::{Deserialize, Serialize};

use crate::{
    database::db_structs::{MatchRecord, Player, RatingField},
    model::{
        omr::overall_match_rating_from_records,
        player_rating::{player_rating, BlendWeights},
        progression::apply_training_rating_progression
    }
};

/// A player's four rating fields at one point in time.
///
/// Every transition that changes the training rating or OMR re-derives the
/// player rating, so a snapshot never carries a PR computed from stale inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSnapshot {
    pub baseline_rating: Option<i32>,
    pub training_rating: Option<f64>,
    pub match_rating: Option<f64>,
    pub player_rating: Option<f64>
}

impl From<&Player> for RatingSnapshot {
    fn from(player: &Player) -> Self {
        RatingSnapshot {
            baseline_rating: player.baseline_rating,
            training_rating: player.training_rating,
            match_rating: player.match_rating,
            player_rating: player.player_rating
        }
    }
}

impl RatingSnapshot {
    pub fn recompute_player_rating(self, weights: BlendWeights) -> Self {
        RatingSnapshot {
            player_rating: player_rating(self.training_rating, self.match_rating, weights),
            ..self
        }
    }

    /// Seeds baseline and training rating from an assessment score.
    pub fn with_baseline(self, baseline: i32, weights: BlendWeights) -> Self {
        RatingSnapshot {
            baseline_rating: Some(baseline),
            training_rating: Some(baseline as f64),
            ..self
        }
        .recompute_player_rating(weights)
    }

    pub fn with_training_rating(self, training_rating: f64, weights: BlendWeights) -> Self {
        RatingSnapshot {
            training_rating: Some(training_rating),
            ..self
        }
        .recompute_player_rating(weights)
    }

    pub fn after_session(self, session_pct: f64, weights: BlendWeights) -> Self {
        let next = apply_training_rating_progression(self.training_rating, session_pct);
        self.with_training_rating(next as f64, weights)
    }

    /// Recomputes OMR from the player's eligible matches (most recent first),
    /// then PR from the fresh OMR.
    pub fn with_match_history(self, matches: &[MatchRecord], window: usize, weights: BlendWeights) -> Self {
        RatingSnapshot {
            match_rating: overall_match_rating_from_records(matches, window),
            ..self
        }
        .recompute_player_rating(weights)
    }

    /// Field writes that take a store from `before` to `self`.
    pub fn changes_since(&self, before: &RatingSnapshot) -> Vec<RatingField> {
        let mut fields = Vec::new();

        if let Some(baseline) = self.baseline_rating {
            if before.baseline_rating != Some(baseline) {
                fields.push(RatingField::Baseline(baseline));
            }
        }

        if let Some(training) = self.training_rating {
            if before.training_rating != Some(training) {
                fields.push(RatingField::Training(training));
            }
        }

        if self.match_rating != before.match_rating {
            fields.push(RatingField::Match(self.match_rating));
        }

        if self.player_rating != before.player_rating {
            fields.push(RatingField::Player(self.player_rating));
        }

        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::constants::OMR_WINDOW, utils::test_utils::generate_match_record};

    #[test]
    fn test_baseline_seeds_training_and_player_rating() {
        let snapshot = RatingSnapshot::default().with_baseline(29, BlendWeights::default());

        assert_eq!(snapshot.baseline_rating, Some(29));
        assert_eq!(snapshot.training_rating, Some(29.0));
        assert_eq!(snapshot.player_rating, Some(29.0));
    }

    #[test]
    fn test_match_history_updates_omr_before_pr() {
        let snapshot = RatingSnapshot::default().with_baseline(20, BlendWeights::default());
        let matches = vec![generate_match_record(1, 40.0, 1.0, true)];

        let updated = snapshot.with_match_history(&matches, OMR_WINDOW, BlendWeights::default());

        assert_eq!(updated.match_rating, Some(40.0));
        assert_eq!(updated.player_rating, Some(30.0));
    }

    #[test]
    fn test_session_progression_rederives_player_rating() {
        let snapshot = RatingSnapshot {
            baseline_rating: Some(30),
            training_rating: Some(30.0),
            match_rating: Some(50.0),
            player_rating: Some(40.0)
        };

        let updated = snapshot.after_session(210.0, BlendWeights::default());

        assert_eq!(updated.training_rating, Some(32.0));
        assert_eq!(updated.player_rating, Some(41.0));
    }

    #[test]
    fn test_changes_since() {
        let before = RatingSnapshot::default();
        let after = before.with_baseline(50, BlendWeights::default());

        assert_eq!(
            after.changes_since(&before),
            vec![
                RatingField::Baseline(50),
                RatingField::Training(50.0),
                RatingField::Player(Some(50.0))
            ]
        );
        assert!(after.changes_since(&after).is_empty());
    }
}
