use crate::model::structures::{rating_metric::RatingMetric, segment_type::SegmentType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PlayerId = Uuid;

/// A player's four rating fields plus completion flags, as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Write-once, 1..=99
    pub baseline_rating: Option<i32>,
    /// 1..=99
    pub training_rating: Option<f64>,
    /// OMR, 0..=100
    pub match_rating: Option<f64>,
    /// PR, 1..=99. Always derived from the training and match ratings
    pub player_rating: Option<f64>,
    pub ita_completed_at: Option<DateTime<Utc>>,
    pub ita_score: Option<i32>
}

/// A single field write. Stores apply only the fields they are handed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RatingField {
    Baseline(i32),
    Training(f64),
    Match(Option<f64>),
    Player(Option<f64>)
}

/// Audit record written once the initial assessment has been scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItaCompletion {
    pub score: i32,
    pub completed_at: DateTime<Utc>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBand {
    pub level_min: i32,
    pub level_max: i32,
    pub three_dart_avg: f64,
    pub single_acc_pct: Option<f64>,
    pub double_acc_pct: Option<f64>,
    pub treble_acc_pct: Option<f64>,
    pub bull_acc_pct: Option<f64>
}

impl LevelBand {
    pub fn contains(&self, level: i32) -> bool {
        (self.level_min..=self.level_max).contains(&level)
    }
}

/// Level-specific override of the checkout routine shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    pub allowed_throws: i32,
    pub attempt_count: i32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub name: String
}

/// One dart thrown during a session run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DartOutcome {
    pub routine_no: i32,
    pub step_no: i32,
    pub dart_index: i32,
    pub target: String,
    pub actual: Option<String>,
    pub hit: bool
}

/// The raw type recorded against one routine step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepClassification {
    pub routine_no: i32,
    pub step_no: i32,
    pub step_type: Option<String>
}

/// One participant's side of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: Uuid,
    pub player_id: PlayerId,
    pub opponent_id: PlayerId,
    pub legs_won: i32,
    pub legs_lost: i32,
    pub best_of: i32,
    pub match_rating: f64,
    /// Format weight multiplied by the band adjustment
    pub weight: f64,
    pub eligible: bool,
    pub played_at: DateTime<Utc>
}

/// The two rows of a head-to-head match, inserted as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPair {
    pub home: MatchRecord,
    pub away: MatchRecord
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingCandidate {
    pub id: PlayerId,
    pub training_rating: Option<f64>,
    pub match_rating: Option<f64>,
    pub player_rating: Option<f64>
}

impl GroupingCandidate {
    pub fn rating(&self, metric: RatingMetric) -> Option<f64> {
        match metric {
            RatingMetric::PlayerRating => self.player_rating,
            RatingMetric::TrainingRating => self.training_rating,
            RatingMetric::MatchRating => self.match_rating
        }
    }
}

impl From<&Player> for GroupingCandidate {
    fn from(player: &Player) -> Self {
        GroupingCandidate {
            id: player.id,
            training_rating: player.training_rating,
            match_rating: player.match_rating,
            player_rating: player.player_rating
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortGroup {
    pub name: String,
    pub member_ids: Vec<PlayerId>
}

/// Handed to the cohort consumer for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingPlan {
    pub schedule_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub groups: Vec<CohortGroup>
}

/// Per-segment ratings derived from an assessment. Absent segments were
/// not part of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentRatings {
    pub singles: Option<f64>,
    pub doubles: Option<f64>,
    pub trebles: Option<f64>,
    pub checkout: Option<f64>
}

impl SegmentRatings {
    /// True when no segment was assessed
    pub fn is_empty(&self) -> bool {
        *self == SegmentRatings::default()
    }

    pub fn get(&self, segment: SegmentType) -> Option<f64> {
        match segment {
            SegmentType::Singles => self.singles,
            SegmentType::Doubles => self.doubles,
            SegmentType::Trebles => self.trebles,
            SegmentType::Checkout => self.checkout
        }
    }

    pub fn set(&mut self, segment: SegmentType, rating: f64) {
        let slot = match segment {
            SegmentType::Singles => &mut self.singles,
            SegmentType::Doubles => &mut self.doubles,
            SegmentType::Trebles => &mut self.trebles,
            SegmentType::Checkout => &mut self.checkout
        };
        *slot = Some(rating);
    }
}
