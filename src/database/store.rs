//! Narrow read/write contracts the engine calls into. Implementations own
//! persistence and map their own failures onto [`EngineError`] categories:
//! unknown ids are `NotFound`, uniqueness violations `Conflict`, anything
//! else `Upstream`.

use std::future::Future;

use uuid::Uuid;

use super::db_structs::{
    CheckoutSettings, DartOutcome, GroupingCandidate, GroupingPlan, ItaCompletion, LevelBand, MatchPair, MatchRecord,
    Player, PlayerId, RatingField, Session, StepClassification
};
use crate::error::EngineResult;

pub trait PlayerStore {
    fn get_player(&self, id: PlayerId) -> impl Future<Output = EngineResult<Player>> + Send;

    /// Writes only the given fields
    fn update_ratings(&self, id: PlayerId, fields: &[RatingField]) -> impl Future<Output = EngineResult<()>> + Send;

    /// Writes the assessment's rating fields together with its completion
    /// record. Either everything is written or nothing is.
    fn complete_assessment(
        &self,
        id: PlayerId,
        fields: &[RatingField],
        completion: ItaCompletion
    ) -> impl Future<Output = EngineResult<()>> + Send;
}

pub trait LevelBandStore {
    /// The band whose `[level_min, level_max]` contains `level`, if any
    fn band_for_level(&self, level: i32) -> impl Future<Output = EngineResult<Option<LevelBand>>> + Send;

    /// Level-specific checkout routine shape, if one is configured
    fn checkout_settings(&self, level: i32) -> impl Future<Output = EngineResult<Option<CheckoutSettings>>> + Send;
}

pub trait MatchStore {
    /// Eligible matches for the player, most recent first, at most `limit`
    fn eligible_matches(
        &self,
        player_id: PlayerId,
        limit: usize
    ) -> impl Future<Output = EngineResult<Vec<MatchRecord>>> + Send;

    /// Inserts both participant rows, or neither
    fn insert_match_pair(&self, pair: &MatchPair) -> impl Future<Output = EngineResult<()>> + Send;
}

pub trait SessionStore {
    fn get_session(&self, session_id: Uuid) -> impl Future<Output = EngineResult<Session>> + Send;

    fn dart_outcomes(&self, run_id: Uuid) -> impl Future<Output = EngineResult<Vec<DartOutcome>>> + Send;

    fn step_classifications(
        &self,
        session_id: Uuid
    ) -> impl Future<Output = EngineResult<Vec<StepClassification>>> + Send;
}

pub trait CohortStore {
    /// Players not yet assigned to a cohort on the schedule
    fn unassigned_players(&self, schedule_id: Uuid) -> impl Future<Output = EngineResult<Vec<GroupingCandidate>>> + Send;

    /// Persists the memberships of a grouping plan
    fn save_grouping(&self, plan: &GroupingPlan) -> impl Future<Output = EngineResult<()>> + Send;
}
