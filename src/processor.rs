use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError}
};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::EngineConfig,
    database::{
        db_structs::{GroupingPlan, ItaCompletion, MatchPair, PlayerId, SegmentRatings},
        store::{CohortStore, LevelBandStore, MatchStore, PlayerStore, SessionStore}
    },
    error::{EngineError, EngineResult, ValidationError},
    model::{
        checkout::{expected_checkouts, CheckoutExpectation, CheckoutInput},
        constants::{RATING_CEILING, RATING_FLOOR},
        grouping::{bulk_assign, validate as validate_grouping, GroupingParams},
        ita::{derive_segment_ratings, is_ita_session, ita_score},
        match_rating::{match_pair, player_strength, MatchResult},
        progression::level_change,
        scoring::{session_score, RoundResult},
        snapshot::RatingSnapshot
    },
    utils::rounding::round_half_up
};

/// One async lock per player. Rating recomputes (read → compute → write)
/// for a player run while holding that player's lock. An entry lives only
/// while some task holds or waits on it.
#[derive(Default)]
pub struct PlayerLocks {
    locks: Mutex<HashMap<PlayerId, Arc<AsyncMutex<()>>>>
}

/// Held lock on one player. Releasing it drops the player's entry once
/// nobody else is waiting.
pub struct PlayerGuard<'a> {
    player_id: PlayerId,
    locks: &'a PlayerLocks,
    guard: Option<OwnedMutexGuard<()>>
}

impl Drop for PlayerGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(self.player_id);
    }
}

impl PlayerLocks {
    fn handle(&self, id: PlayerId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(id).or_default().clone()
    }

    fn release(&self, id: PlayerId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(&id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&id);
        }
    }

    /// Number of players with a held or awaited lock
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub async fn lock(&self, id: PlayerId) -> PlayerGuard<'_> {
        let guard = self.handle(id).lock_owned().await;
        PlayerGuard {
            player_id: id,
            locks: self,
            guard: Some(guard)
        }
    }

    /// Locks two distinct players in id order so opposing acquisitions
    /// cannot deadlock.
    pub async fn lock_pair(&self, a: PlayerId, b: PlayerId) -> (PlayerGuard<'_>, PlayerGuard<'_>) {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let first_guard = self.lock(first).await;
        let second_guard = self.lock(second).await;
        (first_guard, second_guard)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItaOutcome {
    pub segment_ratings: SegmentRatings,
    /// Unclamped combined score
    pub score: i32,
    pub ratings: RatingSnapshot
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOutcome {
    pub session_pct: f64,
    pub level_change: i32,
    pub ratings: RatingSnapshot
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub pair: MatchPair,
    pub home_ratings: RatingSnapshot,
    pub away_ratings: RatingSnapshot
}

/// Sequences the pure rating formulas against the store contracts.
pub struct RatingProcessor<S> {
    store: S,
    config: EngineConfig,
    locks: PlayerLocks
}

impl<S> RatingProcessor<S>
where
    S: PlayerStore + LevelBandStore + MatchStore + SessionStore + CohortStore + Sync
{
    pub fn new(store: S, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        Ok(RatingProcessor {
            store,
            config,
            locks: PlayerLocks::default()
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn locks(&self) -> &PlayerLocks {
        &self.locks
    }

    /// Writes whatever changed between two snapshots.
    async fn persist(&self, player_id: PlayerId, before: &RatingSnapshot, after: &RatingSnapshot) -> EngineResult<()> {
        let fields = after.changes_since(before);
        if fields.is_empty() {
            return Ok(());
        }

        self.store.update_ratings(player_id, &fields).await
    }

    /// # Initial assessment completion
    ///
    /// 1. Confirm the session is an assessment and derive per-segment ratings
    ///    from the recorded darts.
    /// 2. Write the combined score as baseline and training rating, the
    ///    re-derived PR, and the completion record in one store call. The
    ///    baseline is write-once; a second completion fails.
    pub async fn complete_ita(
        &self,
        player_id: PlayerId,
        session_id: Uuid,
        run_id: Uuid,
        completed_at: DateTime<Utc>
    ) -> EngineResult<ItaOutcome> {
        let session = self.store.get_session(session_id).await?;
        if !is_ita_session(&session.name) {
            return Err(ValidationError::NotAnAssessment { name: session.name }.into());
        }

        let classifications = self.store.step_classifications(session_id).await?;
        let darts = self.store.dart_outcomes(run_id).await?;
        let segment_ratings = derive_segment_ratings(&darts, &classifications)?;
        if segment_ratings.is_empty() {
            return Err(ValidationError::NoAssessedSegments {
                run_id: run_id.to_string()
            }
            .into());
        }
        let score = ita_score(&segment_ratings);

        let _guard = self.locks.lock(player_id).await;
        let player = self.store.get_player(player_id).await?;
        if player.baseline_rating.is_some() {
            return Err(ValidationError::BaselineAlreadySet {
                player_id: player_id.to_string()
            }
            .into());
        }

        let baseline = (score as f64).clamp(RATING_FLOOR, RATING_CEILING) as i32;
        let before = RatingSnapshot::from(&player);
        let after = before.with_baseline(baseline, self.config.blend_weights);

        self.store
            .complete_assessment(player_id, &after.changes_since(&before), ItaCompletion { score, completed_at })
            .await?;

        info!(player_id = %player_id, score, baseline, "Initial assessment completed");

        Ok(ItaOutcome {
            segment_ratings,
            score,
            ratings: after
        })
    }

    /// Applies a completed practice session to the player's training rating.
    pub async fn complete_session(&self, player_id: PlayerId, rounds: &[RoundResult]) -> EngineResult<SessionOutcome> {
        let scores = rounds.iter().map(RoundResult::score).collect_vec();
        let session_pct = session_score(&scores);

        let _guard = self.locks.lock(player_id).await;
        let player = self.store.get_player(player_id).await?;
        let before = RatingSnapshot::from(&player);
        let after = before.after_session(session_pct, self.config.blend_weights);

        self.persist(player_id, &before, &after).await?;

        debug!(
            player_id = %player_id,
            session_pct,
            training_rating = ?after.training_rating,
            "Training rating progressed"
        );

        Ok(SessionOutcome {
            session_pct,
            level_change: level_change(session_pct),
            ratings: after
        })
    }

    /// OMR then PR, for a player whose lock the caller already holds.
    async fn refresh_locked(&self, player_id: PlayerId) -> EngineResult<RatingSnapshot> {
        let player = self.store.get_player(player_id).await?;
        let matches = self
            .store
            .eligible_matches(player_id, self.config.omr_window)
            .await?;

        let before = RatingSnapshot::from(&player);
        let after = before.with_match_history(&matches, self.config.omr_window, self.config.blend_weights);

        self.persist(player_id, &before, &after).await?;

        debug!(
            player_id = %player_id,
            matches = matches.len(),
            omr = ?after.match_rating,
            pr = ?after.player_rating,
            "Match ratings refreshed"
        );

        Ok(after)
    }

    /// Recomputes OMR from the stored eligible matches, then PR.
    pub async fn refresh_match_ratings(&self, player_id: PlayerId) -> EngineResult<RatingSnapshot> {
        let _guard = self.locks.lock(player_id).await;
        self.refresh_locked(player_id).await
    }

    /// Recomputes PR from the stored training rating and OMR.
    pub async fn refresh_player_rating(&self, player_id: PlayerId) -> EngineResult<RatingSnapshot> {
        let _guard = self.locks.lock(player_id).await;
        let player = self.store.get_player(player_id).await?;

        let before = RatingSnapshot::from(&player);
        let after = before.recompute_player_rating(self.config.blend_weights);

        self.persist(player_id, &before, &after).await?;
        Ok(after)
    }

    /// # Match recording
    ///
    /// Both players are locked for the whole sequence: strengths are read,
    /// both rows are inserted as a unit, and each player's OMR is recomputed
    /// from the updated match set before their PR.
    pub async fn record_match(&self, result: &MatchResult) -> EngineResult<MatchOutcome> {
        let home_id = result.home.player_id;
        let away_id = result.away.player_id;
        if home_id == away_id {
            return Err(EngineError::invalid("away.player_id", "a player cannot face themselves"));
        }

        let _guards = self.locks.lock_pair(home_id, away_id).await;

        let home = self.store.get_player(home_id).await?;
        let away = self.store.get_player(away_id).await?;

        let pair = match_pair(result, player_strength(&home), player_strength(&away))?;
        self.store.insert_match_pair(&pair).await?;

        info!(
            match_id = %result.match_id,
            home_mr = pair.home.match_rating,
            away_mr = pair.away.match_rating,
            "Match recorded"
        );

        let home_ratings = self.refresh_locked(home_id).await?;
        let away_ratings = self.refresh_locked(away_id).await?;

        Ok(MatchOutcome {
            pair,
            home_ratings,
            away_ratings
        })
    }

    pub async fn expected_checkouts_for_level(&self, level: i32, target: i32) -> EngineResult<CheckoutExpectation> {
        let band = self
            .store
            .band_for_level(level)
            .await?
            .ok_or_else(|| EngineError::not_found("level band", level))?;
        let settings = self
            .store
            .checkout_settings(level)
            .await?
            .unwrap_or(self.config.checkout_defaults);

        expected_checkouts(&CheckoutInput::for_band(target, &band, Some(settings)))
    }

    /// Checkout expectation at the player's own level (rounded PR, else
    /// training rating).
    pub async fn expected_checkouts_for_player(
        &self,
        player_id: PlayerId,
        target: i32
    ) -> EngineResult<CheckoutExpectation> {
        let player = self.store.get_player(player_id).await?;
        let rating = player
            .player_rating
            .or(player.training_rating)
            .ok_or_else(|| EngineError::invalid("player", "player has no rating to derive a level from"))?;

        self.expected_checkouts_for_level(round_half_up(rating) as i32, target)
            .await
    }

    /// Groups every unassigned player on the schedule and hands the plan to
    /// the cohort store.
    pub async fn bulk_assign_cohorts(&self, params: &GroupingParams) -> EngineResult<GroupingPlan> {
        let schedule_id = validate_grouping(params)?.schedule_id;

        let candidates = self.store.unassigned_players(schedule_id).await?;
        let plan = bulk_assign(&candidates, params)?;

        if plan.groups.is_empty() {
            warn!(schedule_id = %schedule_id, candidates = candidates.len(), "Bulk assignment formed no cohorts");
        }

        self.store.save_grouping(&plan).await?;

        info!(
            schedule_id = %schedule_id,
            cohorts = plan.groups.len(),
            end_date = %plan.end_date,
            "Cohorts assigned"
        );

        Ok(plan)
    }
}
