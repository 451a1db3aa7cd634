use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    database::db_structs::MatchRecord,
    model::constants::{MATCH_RATING_CEILING, MATCH_RATING_FLOOR, OMR_TRIM_THRESHOLD},
    utils::rounding::round_one_decimal
};

/// A match rating and the weight it carries in the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedRating {
    pub rating: f64,
    pub weight: f64
}

impl From<&MatchRecord> for WeightedRating {
    fn from(record: &MatchRecord) -> Self {
        WeightedRating {
            rating: record.match_rating,
            weight: record.weight
        }
    }
}

fn weighted_mean(ratings: &[WeightedRating]) -> Option<f64> {
    let total_weight: f64 = ratings.iter().map(|r| r.weight).sum();
    if total_weight <= 0.0 {
        return None;
    }

    let weighted: f64 = ratings.iter().map(|r| r.weight * r.rating).sum();
    Some(weighted / total_weight)
}

/// Overall match rating over a player's most recent eligible matches.
///
/// `ratings` is most-recent-first; only the first `window` entries are used.
/// With six or more matches the single lowest and single highest ratings are
/// dropped before the weighted mean is taken. No matches yields `None`.
pub fn overall_match_rating(ratings: &[WeightedRating], window: usize) -> Option<f64> {
    let recent = &ratings[..ratings.len().min(window)];

    if recent.is_empty() {
        return None;
    }

    let omr = if recent.len() < OMR_TRIM_THRESHOLD {
        weighted_mean(recent)?
    } else {
        let sorted = recent
            .iter()
            .copied()
            .sorted_by(|a, b| a.rating.total_cmp(&b.rating))
            .collect_vec();
        weighted_mean(&sorted[1..sorted.len() - 1])?
    };

    Some(round_one_decimal(omr).clamp(MATCH_RATING_FLOOR, MATCH_RATING_CEILING))
}

/// OMR over stored match rows. Ineligible rows are ignored.
pub fn overall_match_rating_from_records(records: &[MatchRecord], window: usize) -> Option<f64> {
    let ratings = records
        .iter()
        .filter(|r| r.eligible)
        .map(WeightedRating::from)
        .collect_vec();

    overall_match_rating(&ratings, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::constants::OMR_WINDOW, utils::test_utils::generate_match_record};
    use approx::assert_abs_diff_eq;

    fn equal(ratings: &[f64]) -> Vec<WeightedRating> {
        ratings
            .iter()
            .map(|r| WeightedRating { rating: *r, weight: 1.0 })
            .collect()
    }

    #[test]
    fn test_no_matches() {
        assert_eq!(overall_match_rating(&[], OMR_WINDOW), None);
    }

    #[test]
    fn test_single_match() {
        assert_eq!(overall_match_rating(&equal(&[63.4]), OMR_WINDOW), Some(63.4));
    }

    #[test]
    fn test_weighted_mean_below_trim_threshold() {
        let ratings = vec![
            WeightedRating { rating: 60.0, weight: 1.3 },
            WeightedRating { rating: 40.0, weight: 1.0 },
        ];
        // (78 + 40) / 2.3 = 51.30…
        assert_abs_diff_eq!(overall_match_rating(&ratings, OMR_WINDOW).unwrap(), 51.3, epsilon = 1e-9);
    }

    #[test]
    fn test_five_matches_are_not_trimmed() {
        let omr = overall_match_rating(&equal(&[10.0, 20.0, 30.0, 40.0, 100.0]), OMR_WINDOW);
        assert_eq!(omr, Some(40.0));
    }

    #[test]
    fn test_six_matches_trim_extremes() {
        let omr = overall_match_rating(&equal(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]), OMR_WINDOW);
        assert_eq!(omr, Some(35.0));
    }

    #[test]
    fn test_trim_drops_one_duplicate_only() {
        // Sorted: 10, 10, 50, 50, 90, 90 → keep 10, 50, 50, 90
        let omr = overall_match_rating(&equal(&[90.0, 10.0, 50.0, 10.0, 90.0, 50.0]), OMR_WINDOW);
        assert_eq!(omr, Some(50.0));
    }

    #[test]
    fn test_window_keeps_most_recent() {
        // Most recent first: ten 70s, then older 10s that fall outside the window
        let mut ratings = vec![70.0; 10];
        ratings.extend([10.0; 5]);
        assert_eq!(overall_match_rating(&equal(&ratings), OMR_WINDOW), Some(70.0));
    }

    #[test]
    fn test_zero_weights() {
        let ratings = vec![WeightedRating { rating: 50.0, weight: 0.0 }];
        assert_eq!(overall_match_rating(&ratings, OMR_WINDOW), None);
    }

    #[test]
    fn test_ineligible_records_ignored() {
        let records = vec![
            generate_match_record(1, 80.0, 1.0, true),
            generate_match_record(1, 5.0, 1.0, false),
        ];
        assert_eq!(overall_match_rating_from_records(&records, OMR_WINDOW), Some(80.0));
    }
}
