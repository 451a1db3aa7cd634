use crate::{
    model::constants::{PROGRESSION_BELOW_FLOOR, PROGRESSION_BRACKETS, RATING_CEILING, RATING_FLOOR},
    utils::rounding::round_half_up
};

/// Level change earned by a session percentage:
/// `<50 → -1`, `[50,100) → 0`, `[100,200) → +1`, `[200,300) → +2`, `≥300 → +3`
pub fn level_change(session_pct: f64) -> i32 {
    PROGRESSION_BRACKETS
        .iter()
        .find(|(lower, _)| session_pct >= *lower)
        .map(|(_, change)| *change)
        .unwrap_or(PROGRESSION_BELOW_FLOOR)
}

/// New training rating after a completed session. A player without a
/// training rating progresses from 0.
pub fn apply_training_rating_progression(current: Option<f64>, session_pct: f64) -> i32 {
    let base = round_half_up(current.unwrap_or(0.0));
    let next = base + level_change(session_pct) as f64;

    next.clamp(RATING_FLOOR, RATING_CEILING) as i32
}
