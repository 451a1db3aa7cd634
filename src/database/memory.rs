use std::{
    collections::{HashMap, HashSet},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard}
};

use itertools::Itertools;
use tracing::debug;
use uuid::Uuid;

use super::{
    db_structs::{
        CheckoutSettings, CohortGroup, DartOutcome, GroupingCandidate, GroupingPlan, ItaCompletion, LevelBand,
        MatchPair, MatchRecord, Player, PlayerId, RatingField, Session, StepClassification
    },
    store::{CohortStore, LevelBandStore, MatchStore, PlayerStore, SessionStore}
};
use crate::error::{EngineError, EngineResult};

/// Process-local implementation of every store contract. Backs the
/// integration tests and the command line tool.
#[derive(Default)]
pub struct InMemoryStore {
    players: RwLock<HashMap<PlayerId, Player>>,
    bands: RwLock<Vec<LevelBand>>,
    checkout_settings: RwLock<HashMap<i32, CheckoutSettings>>,
    matches: RwLock<Vec<MatchRecord>>,
    sessions: RwLock<HashMap<Uuid, Session>>,
    darts: RwLock<HashMap<Uuid, Vec<DartOutcome>>>,
    classifications: RwLock<HashMap<Uuid, Vec<StepClassification>>>,
    cohorts: RwLock<HashMap<Uuid, Vec<CohortGroup>>>
}

fn read<T>(lock: &RwLock<T>) -> EngineResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| EngineError::Upstream("in-memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> EngineResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| EngineError::Upstream("in-memory store lock poisoned".to_string()))
}

fn apply_fields(player: &mut Player, fields: &[RatingField]) {
    for field in fields {
        match *field {
            RatingField::Baseline(baseline) => player.baseline_rating = Some(baseline),
            RatingField::Training(training) => player.training_rating = Some(training),
            RatingField::Match(omr) => player.match_rating = omr,
            RatingField::Player(pr) => player.player_rating = pr
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_player(&self, player: Player) -> EngineResult<()> {
        write(&self.players)?.insert(player.id, player);
        Ok(())
    }

    pub fn insert_band(&self, band: LevelBand) -> EngineResult<()> {
        write(&self.bands)?.push(band);
        Ok(())
    }

    pub fn insert_checkout_settings(&self, level: i32, settings: CheckoutSettings) -> EngineResult<()> {
        write(&self.checkout_settings)?.insert(level, settings);
        Ok(())
    }

    pub fn insert_session(
        &self,
        session: Session,
        classifications: Vec<StepClassification>
    ) -> EngineResult<()> {
        write(&self.classifications)?.insert(session.id, classifications);
        write(&self.sessions)?.insert(session.id, session);
        Ok(())
    }

    pub fn insert_run(&self, run_id: Uuid, darts: Vec<DartOutcome>) -> EngineResult<()> {
        write(&self.darts)?.insert(run_id, darts);
        Ok(())
    }

    pub fn all_matches(&self) -> EngineResult<Vec<MatchRecord>> {
        Ok(read(&self.matches)?.clone())
    }

    pub fn cohorts(&self, schedule_id: Uuid) -> EngineResult<Vec<CohortGroup>> {
        Ok(read(&self.cohorts)?.get(&schedule_id).cloned().unwrap_or_default())
    }
}

impl PlayerStore for InMemoryStore {
    async fn get_player(&self, id: PlayerId) -> EngineResult<Player> {
        read(&self.players)?
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("player", id))
    }

    async fn update_ratings(&self, id: PlayerId, fields: &[RatingField]) -> EngineResult<()> {
        let mut players = write(&self.players)?;
        let player = players.get_mut(&id).ok_or_else(|| EngineError::not_found("player", id))?;

        apply_fields(player, fields);
        debug!(player_id = %id, fields = fields.len(), "Updated rating fields");
        Ok(())
    }

    async fn complete_assessment(
        &self,
        id: PlayerId,
        fields: &[RatingField],
        completion: ItaCompletion
    ) -> EngineResult<()> {
        let mut players = write(&self.players)?;
        let player = players.get_mut(&id).ok_or_else(|| EngineError::not_found("player", id))?;

        apply_fields(player, fields);
        player.ita_score = Some(completion.score);
        player.ita_completed_at = Some(completion.completed_at);
        Ok(())
    }
}

impl LevelBandStore for InMemoryStore {
    async fn band_for_level(&self, level: i32) -> EngineResult<Option<LevelBand>> {
        Ok(read(&self.bands)?.iter().find(|b| b.contains(level)).cloned())
    }

    async fn checkout_settings(&self, level: i32) -> EngineResult<Option<CheckoutSettings>> {
        Ok(read(&self.checkout_settings)?.get(&level).copied())
    }
}

impl MatchStore for InMemoryStore {
    async fn eligible_matches(&self, player_id: PlayerId, limit: usize) -> EngineResult<Vec<MatchRecord>> {
        Ok(read(&self.matches)?
            .iter()
            .filter(|m| m.player_id == player_id && m.eligible)
            .sorted_by(|a, b| b.played_at.cmp(&a.played_at))
            .take(limit)
            .cloned()
            .collect_vec())
    }

    async fn insert_match_pair(&self, pair: &MatchPair) -> EngineResult<()> {
        let mut matches = write(&self.matches)?;

        for side in [&pair.home, &pair.away] {
            if matches
                .iter()
                .any(|m| m.match_id == side.match_id && m.player_id == side.player_id)
            {
                return Err(EngineError::Conflict(format!(
                    "match {} already recorded for player {}",
                    side.match_id, side.player_id
                )));
            }
        }

        matches.push(pair.home.clone());
        matches.push(pair.away.clone());
        Ok(())
    }
}

impl SessionStore for InMemoryStore {
    async fn get_session(&self, session_id: Uuid) -> EngineResult<Session> {
        read(&self.sessions)?
            .get(&session_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("session", session_id))
    }

    async fn dart_outcomes(&self, run_id: Uuid) -> EngineResult<Vec<DartOutcome>> {
        Ok(read(&self.darts)?.get(&run_id).cloned().unwrap_or_default())
    }

    async fn step_classifications(&self, session_id: Uuid) -> EngineResult<Vec<StepClassification>> {
        Ok(read(&self.classifications)?
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl CohortStore for InMemoryStore {
    async fn unassigned_players(&self, schedule_id: Uuid) -> EngineResult<Vec<GroupingCandidate>> {
        let assigned: HashSet<PlayerId> = read(&self.cohorts)?
            .get(&schedule_id)
            .map(|groups| groups.iter().flat_map(|g| g.member_ids.iter().copied()).collect())
            .unwrap_or_default();

        Ok(read(&self.players)?
            .values()
            .filter(|p| !assigned.contains(&p.id))
            .map(GroupingCandidate::from)
            .collect_vec())
    }

    async fn save_grouping(&self, plan: &GroupingPlan) -> EngineResult<()> {
        let mut cohorts = write(&self.cohorts)?;
        let existing = cohorts.entry(plan.schedule_id).or_default();

        let assigned: HashSet<PlayerId> = existing.iter().flat_map(|g| g.member_ids.iter().copied()).collect();
        if let Some(duplicate) = plan
            .groups
            .iter()
            .flat_map(|g| g.member_ids.iter())
            .find(|id| assigned.contains(id))
        {
            return Err(EngineError::Conflict(format!(
                "player {duplicate} already belongs to a cohort on schedule {}",
                plan.schedule_id
            )));
        }

        existing.extend(plan.groups.iter().cloned());
        Ok(())
    }
}
