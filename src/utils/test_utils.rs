use crate::{
    database::db_structs::{DartOutcome, GroupingCandidate, LevelBand, MatchRecord, Player, StepClassification},
    model::{
        grouping::{GroupingParams, MatchingOptions},
        match_rating::{MatchResult, MatchSide}
    }
};
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

pub fn generate_player(id: u128, training_rating: Option<f64>) -> Player {
    Player {
        id: Uuid::from_u128(id),
        training_rating,
        ..Player::default()
    }
}

pub fn generate_dart(routine_no: i32, step_no: i32, dart_index: i32, hit: bool) -> DartOutcome {
    DartOutcome {
        routine_no,
        step_no,
        dart_index,
        target: format!("R{routine_no}S{step_no}"),
        actual: hit.then(|| format!("R{routine_no}S{step_no}")),
        hit
    }
}

/// `count` darts for one step; positions listed in `hit_indices` (0-based)
/// are hits, everything else misses.
pub fn generate_step_darts(routine_no: i32, step_no: i32, count: usize, hit_indices: &[usize]) -> Vec<DartOutcome> {
    (0..count)
        .map(|i| generate_dart(routine_no, step_no, i as i32 + 1, hit_indices.contains(&i)))
        .collect()
}

pub fn generate_classification(routine_no: i32, step_no: i32, step_type: Option<&str>) -> StepClassification {
    StepClassification {
        routine_no,
        step_no,
        step_type: step_type.map(str::to_string)
    }
}

pub fn generate_level_band(
    level_min: i32,
    level_max: i32,
    three_dart_avg: f64,
    double_acc_pct: Option<f64>
) -> LevelBand {
    LevelBand {
        level_min,
        level_max,
        three_dart_avg,
        single_acc_pct: None,
        double_acc_pct,
        treble_acc_pct: None,
        bull_acc_pct: None
    }
}

/// An eligible-or-not match row for `player_id` against a fixed opponent.
pub fn generate_match_record(player_id: u128, match_rating: f64, weight: f64, eligible: bool) -> MatchRecord {
    MatchRecord {
        match_id: Uuid::new_v4(),
        player_id: Uuid::from_u128(player_id),
        opponent_id: Uuid::from_u128(player_id + 1000),
        legs_won: 3,
        legs_lost: 2,
        best_of: 5,
        match_rating,
        weight,
        eligible,
        played_at: Utc::now()
    }
}

fn generate_match_side(player_id: u128, legs_won: i32) -> MatchSide {
    MatchSide {
        player_id: Uuid::from_u128(player_id),
        legs_won,
        three_dart_avg: Some(50.0),
        baseline_avg: Some(50.0),
        doubles_pct: None
    }
}

pub fn generate_match_result(home_id: u128, away_id: u128, home_legs: i32, away_legs: i32, best_of: i32) -> MatchResult {
    generate_match_result_at(home_id, away_id, home_legs, away_legs, best_of, Utc::now())
}

pub fn generate_match_result_at(
    home_id: u128,
    away_id: u128,
    home_legs: i32,
    away_legs: i32,
    best_of: i32,
    played_at: DateTime<Utc>
) -> MatchResult {
    MatchResult {
        match_id: Uuid::new_v4(),
        best_of,
        played_at,
        home: generate_match_side(home_id, home_legs),
        away: generate_match_side(away_id, away_legs)
    }
}

pub fn generate_candidate(id: u128, player_rating: Option<f64>) -> GroupingCandidate {
    GroupingCandidate {
        id: Uuid::from_u128(id),
        training_rating: player_rating,
        match_rating: None,
        player_rating
    }
}

/// `n` candidates with ids `1..=n` and seeded random player ratings
pub fn generate_candidate_pool(n: u128, seed: u64) -> Vec<GroupingCandidate> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    (1..=n)
        .map(|id| {
            let rating = rng.random_range(1.0..=99.0_f64);
            generate_candidate(id, Some((rating * 10.0).round() / 10.0))
        })
        .collect()
}

pub fn generate_grouping_params(players_per_cohort: i64, matching: Option<MatchingOptions>) -> GroupingParams {
    GroupingParams {
        name_prefix: "Cohort".to_string(),
        start_index: 1,
        players_per_cohort,
        start_date: "2026-01-05".to_string(),
        duration_days: 28,
        matching,
        require_full_cohort: false,
        schedule_id: Some(Uuid::from_u128(0xC0))
    }
}

/// Timestamps spaced one day apart, oldest first
pub fn generate_timeline(n: i64) -> Vec<DateTime<Utc>> {
    let start = Utc::now() - Duration::days(n);
    (0..n).map(|i| start + Duration::days(i)).collect()
}
