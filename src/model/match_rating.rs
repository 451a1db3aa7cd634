//! Per-match rating (MR). The formula is provisional and is reproduced
//! exactly; it is not tuned here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    database::db_structs::{MatchPair, MatchRecord, Player, PlayerId},
    error::{EngineError, EngineResult},
    model::constants::{
        BAND_TOLERANCE, DEFAULT_FORMAT_WEIGHT, DEFAULT_OPPONENT_STRENGTH, FORMAT_WEIGHTS, MATCH_RATING_CEILING,
        MATCH_RATING_FLOOR, MIN_ELIGIBLE_BEST_OF, MR_AVERAGE_SCALE, MR_BASE, MR_DOUBLES_SCALE, MR_LEG_SHARE_SCALE,
        MR_OPPONENT_SCALE, MR_WIN_BONUS, OUT_OF_BAND_FACTOR
    },
    utils::rounding::round_one_decimal
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchRatingInput {
    /// 0..=100
    pub opponent_strength: f64,
    /// Fraction of legs won, 0..=1
    pub leg_share: f64,
    pub three_dart_avg: Option<f64>,
    pub baseline_avg: Option<f64>,
    /// Fraction of doubles hit, 0..=1
    pub doubles_pct: Option<f64>
}

pub fn leg_share(legs_won: i32, legs_lost: i32) -> EngineResult<f64> {
    if legs_won < 0 || legs_lost < 0 {
        return Err(EngineError::invalid("legs", "leg counts must not be negative"));
    }

    let total = legs_won + legs_lost;
    if total == 0 {
        return Err(EngineError::invalid("legs", "a match needs at least one leg"));
    }

    Ok(legs_won as f64 / total as f64)
}

pub fn match_rating(input: &MatchRatingInput) -> EngineResult<f64> {
    if !(0.0..=1.0).contains(&input.leg_share) {
        return Err(EngineError::invalid("leg_share", "must be within 0..=1"));
    }

    if !(0.0..=100.0).contains(&input.opponent_strength) {
        return Err(EngineError::invalid("opponent_strength", "must be within 0..=100"));
    }

    let win_bonus = if input.leg_share > 0.5 { MR_WIN_BONUS } else { 0.0 };
    let mut rating = MR_BASE
        + (input.leg_share - 0.5) * MR_LEG_SHARE_SCALE
        + win_bonus
        + (input.opponent_strength - 50.0) * MR_OPPONENT_SCALE;

    if let (Some(avg), Some(baseline)) = (input.three_dart_avg, input.baseline_avg) {
        if baseline > 0.0 {
            rating += (avg / baseline - 1.0) * MR_AVERAGE_SCALE;
        }
    }

    if let Some(doubles) = input.doubles_pct {
        rating += (doubles - 0.5) * MR_DOUBLES_SCALE;
    }

    Ok(round_one_decimal(rating).clamp(MATCH_RATING_FLOOR, MATCH_RATING_CEILING))
}

/// Weight of a best-of-N format. Unlisted formats weigh 1.0.
pub fn format_weight(best_of: i32) -> f64 {
    FORMAT_WEIGHTS
        .iter()
        .find(|(legs, _)| *legs == best_of)
        .map(|(_, weight)| *weight)
        .unwrap_or(DEFAULT_FORMAT_WEIGHT)
}

/// Tens bucket of a rating, clamped to 0..=90
pub fn decade(rating: f64) -> i32 {
    (((rating / 10.0).floor() as i32) * 10).clamp(0, 90)
}

pub fn in_band(strength: f64, opponent_strength: f64) -> bool {
    (decade(strength) - decade(opponent_strength)).abs() <= BAND_TOLERANCE
}

/// Format weight, reduced when the players sit more than one decade apart.
pub fn match_weight(best_of: i32, strength: f64, opponent_strength: f64) -> f64 {
    let weight = format_weight(best_of);

    if in_band(strength, opponent_strength) {
        weight
    } else {
        weight * OUT_OF_BAND_FACTOR
    }
}

pub fn is_eligible(best_of: i32, three_dart_avg: Option<f64>) -> bool {
    best_of >= MIN_ELIGIBLE_BEST_OF && three_dart_avg.is_some()
}

/// One participant's side of a played head-to-head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSide {
    pub player_id: PlayerId,
    pub legs_won: i32,
    pub three_dart_avg: Option<f64>,
    pub baseline_avg: Option<f64>,
    pub doubles_pct: Option<f64>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: Uuid,
    pub best_of: i32,
    pub played_at: DateTime<Utc>,
    pub home: MatchSide,
    pub away: MatchSide
}

fn side_record(
    result: &MatchResult,
    side: &MatchSide,
    opponent: &MatchSide,
    strength: f64,
    opponent_strength: f64
) -> EngineResult<MatchRecord> {
    let share = leg_share(side.legs_won, opponent.legs_won)?;
    let rating = match_rating(&MatchRatingInput {
        opponent_strength,
        leg_share: share,
        three_dart_avg: side.three_dart_avg,
        baseline_avg: side.baseline_avg,
        doubles_pct: side.doubles_pct
    })?;

    Ok(MatchRecord {
        match_id: result.match_id,
        player_id: side.player_id,
        opponent_id: opponent.player_id,
        legs_won: side.legs_won,
        legs_lost: opponent.legs_won,
        best_of: result.best_of,
        match_rating: rating,
        weight: match_weight(result.best_of, strength, opponent_strength),
        eligible: is_eligible(result.best_of, side.three_dart_avg),
        played_at: result.played_at
    })
}

/// Pre-match strength of a player: PR, else training rating, else 50.
pub fn player_strength(player: &Player) -> f64 {
    player
        .player_rating
        .or(player.training_rating)
        .unwrap_or(DEFAULT_OPPONENT_STRENGTH)
        .clamp(MATCH_RATING_FLOOR, MATCH_RATING_CEILING)
}

/// Builds both participant rows of a match from the players' pre-match
/// strengths.
pub fn match_pair(result: &MatchResult, home_strength: f64, away_strength: f64) -> EngineResult<MatchPair> {
    if result.home.player_id == result.away.player_id {
        return Err(EngineError::invalid("away.player_id", "a player cannot face themselves"));
    }

    Ok(MatchPair {
        home: side_record(result, &result.home, &result.away, home_strength, away_strength)?,
        away: side_record(result, &result.away, &result.home, away_strength, home_strength)?
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorCategory,
        utils::test_utils::{generate_match_result, generate_player}
    };
    use approx::assert_abs_diff_eq;

    fn base_input(leg_share: f64, opponent_strength: f64) -> MatchRatingInput {
        MatchRatingInput {
            opponent_strength,
            leg_share,
            three_dart_avg: None,
            baseline_avg: None,
            doubles_pct: None
        }
    }

    #[test]
    fn test_even_match() {
        assert_eq!(match_rating(&base_input(0.5, 50.0)).unwrap(), 50.0);
    }

    #[test]
    fn test_win_adds_bonus() {
        // 50 + 0.1·40 + 5 = 59
        assert_abs_diff_eq!(match_rating(&base_input(0.6, 50.0)).unwrap(), 59.0, epsilon = 1e-9);
    }

    #[test]
    fn test_loss_against_strong_opponent() {
        // 50 - 0.2·40 + 30·0.15 = 46.5
        assert_abs_diff_eq!(match_rating(&base_input(0.3, 80.0)).unwrap(), 46.5, epsilon = 1e-9);
    }

    #[test]
    fn test_average_and_doubles_adjustments() {
        let input = MatchRatingInput {
            opponent_strength: 50.0,
            leg_share: 0.5,
            three_dart_avg: Some(60.0),
            baseline_avg: Some(50.0),
            doubles_pct: Some(0.75)
        };
        // 50 + 0.2·5 + 0.25·4 = 52
        assert_abs_diff_eq!(match_rating(&input).unwrap(), 52.0, epsilon = 1e-9);
    }

    #[test]
    fn test_average_ignored_without_baseline() {
        let mut input = base_input(0.5, 50.0);
        input.three_dart_avg = Some(80.0);
        assert_eq!(match_rating(&input).unwrap(), 50.0);
    }

    #[test]
    fn test_rounded_to_one_decimal() {
        // 50 + (2/3 - 0.5)·40 + 5 = 61.666…
        assert_abs_diff_eq!(match_rating(&base_input(2.0 / 3.0, 50.0)).unwrap(), 61.7, epsilon = 1e-9);
    }

    #[test]
    fn test_clamped() {
        let input = MatchRatingInput {
            opponent_strength: 100.0,
            leg_share: 1.0,
            three_dart_avg: Some(500.0),
            baseline_avg: Some(10.0),
            doubles_pct: Some(1.0)
        };
        assert_eq!(match_rating(&input).unwrap(), 100.0);

        let input = MatchRatingInput {
            opponent_strength: 0.0,
            leg_share: 0.0,
            three_dart_avg: Some(0.0),
            baseline_avg: Some(100.0),
            doubles_pct: Some(0.0)
        };
        // 50 - 20 - 7.5 - 5 - 2 = 15.5, still in range
        assert_abs_diff_eq!(match_rating(&input).unwrap(), 15.5, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_leg_share() {
        let err = match_rating(&base_input(1.5, 50.0)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_leg_share() {
        assert_eq!(leg_share(3, 1).unwrap(), 0.75);
        assert!(leg_share(0, 0).is_err());
        assert!(leg_share(-1, 2).is_err());
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(5), 1.0);
        assert_eq!(format_weight(7), 1.1);
        assert_eq!(format_weight(9), 1.2);
        assert_eq!(format_weight(11), 1.3);
        assert_eq!(format_weight(3), 1.0);
        assert_eq!(format_weight(13), 1.0);
    }

    #[test]
    fn test_decade() {
        assert_eq!(decade(0.0), 0);
        assert_eq!(decade(47.9), 40);
        assert_eq!(decade(99.0), 90);
        assert_eq!(decade(100.0), 90);
        assert_eq!(decade(-5.0), 0);
    }

    #[test]
    fn test_band_check() {
        assert!(in_band(45.0, 55.0));
        assert!(in_band(40.0, 49.9));
        assert!(!in_band(35.0, 55.0));
    }

    #[test]
    fn test_match_weight_out_of_band() {
        assert_abs_diff_eq!(match_weight(9, 20.0, 60.0), 1.2 * 0.8, epsilon = 1e-12);
        assert_eq!(match_weight(9, 55.0, 60.0), 1.2);
    }

    #[test]
    fn test_eligibility() {
        assert!(is_eligible(5, Some(40.0)));
        assert!(!is_eligible(3, Some(40.0)));
        assert!(!is_eligible(7, None));
    }

    #[test]
    fn test_match_pair_is_mirrored() {
        let result = generate_match_result(1, 2, 4, 2, 7);
        let pair = match_pair(&result, 50.0, 50.0).unwrap();

        assert_eq!(pair.home.player_id, pair.away.opponent_id);
        assert_eq!(pair.home.legs_won, pair.away.legs_lost);
        assert!(pair.home.match_rating > pair.away.match_rating);
        assert_eq!(pair.home.weight, 1.1);
        assert!(pair.home.eligible);
    }

    #[test]
    fn test_match_pair_rejects_self_play() {
        let result = generate_match_result(1, 1, 4, 2, 7);
        assert!(match_pair(&result, 50.0, 50.0).is_err());
    }

    #[test]
    fn test_match_pair_out_of_band_weight() {
        let result = generate_match_result(1, 2, 4, 2, 11);
        let pair = match_pair(&result, 25.0, 72.0).unwrap();

        assert_abs_diff_eq!(pair.home.weight, 1.3 * 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(pair.away.weight, 1.3 * 0.8, epsilon = 1e-12);
        // Beating a stronger player is worth more than beating an equal one
        let even = match_pair(&result, 50.0, 50.0).unwrap();
        assert!(pair.home.match_rating > even.home.match_rating);
    }

    #[test]
    fn test_player_strength_fallbacks() {
        let mut player = generate_player(1, Some(40.0));
        assert_eq!(player_strength(&player), 40.0);

        player.player_rating = Some(44.5);
        assert_eq!(player_strength(&player), 44.5);

        assert_eq!(player_strength(&generate_player(2, None)), 50.0);
    }
}
