use chrono::{Duration, NaiveDate};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
    database::db_structs::{CohortGroup, GroupingCandidate, GroupingPlan, PlayerId},
    error::{EngineError, EngineResult},
    model::structures::rating_metric::RatingMetric
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingOptions {
    /// Largest allowed max−min rating spread inside one group
    pub proximity: f64,
    pub metric: RatingMetric
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingParams {
    pub name_prefix: String,
    pub start_index: i64,
    pub players_per_cohort: i64,
    /// ISO-8601 calendar date, e.g. `2026-01-05`
    pub start_date: String,
    pub duration_days: i64,
    /// Rating-proximity matching. `None` chunks players in id order.
    pub matching: Option<MatchingOptions>,
    #[serde(default)]
    pub require_full_cohort: bool,
    pub schedule_id: Option<Uuid>
}

pub(crate) struct Validated {
    pub(crate) cohort_size: usize,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) schedule_id: Uuid
}

/// Checks every grouping precondition. Nothing is grouped unless all hold.
pub(crate) fn validate(params: &GroupingParams) -> EngineResult<Validated> {
    if params.start_index < 0 {
        return Err(EngineError::invalid("start_index", "must not be negative"));
    }

    if params.players_per_cohort <= 0 {
        return Err(EngineError::invalid("players_per_cohort", "must be positive"));
    }

    if params.duration_days <= 0 {
        return Err(EngineError::invalid("duration_days", "must be positive"));
    }

    let start_date = NaiveDate::parse_from_str(params.start_date.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::invalid("start_date", format!("'{}' is not a valid date: {e}", params.start_date)))?;

    if let Some(matching) = &params.matching {
        if !matching.proximity.is_finite() || matching.proximity < 0.0 {
            return Err(EngineError::invalid("proximity", "must be a non-negative number"));
        }
    }

    let schedule_id = params
        .schedule_id
        .ok_or_else(|| EngineError::invalid("schedule_id", "a schedule is required"))?;

    let end_date = start_date
        .checked_add_signed(Duration::days(params.duration_days))
        .ok_or_else(|| EngineError::invalid("duration_days", "end date is out of range"))?;

    Ok(Validated {
        cohort_size: params.players_per_cohort as usize,
        start_date,
        end_date,
        schedule_id
    })
}

/// Greedy proximity grouping over candidates already sorted by rating.
/// A group closes when it is full or when adding the next player would
/// stretch its spread past `proximity`.
fn group_by_proximity(sorted: &[(PlayerId, f64)], cohort_size: usize, proximity: f64) -> Vec<Vec<PlayerId>> {
    let mut groups = Vec::new();
    let mut current: Vec<PlayerId> = Vec::new();
    let (mut low, mut high) = (f64::INFINITY, f64::NEG_INFINITY);

    for (id, rating) in sorted {
        let next_low = low.min(*rating);
        let next_high = high.max(*rating);

        if !current.is_empty() && (current.len() >= cohort_size || next_high - next_low > proximity) {
            groups.push(std::mem::take(&mut current));
            low = *rating;
            high = *rating;
        } else {
            low = next_low;
            high = next_high;
        }

        current.push(*id);
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// Partitions unassigned players into named cohorts.
///
/// All parameters are validated before any grouping happens. Missing
/// ratings are matched as 0.
pub fn bulk_assign(candidates: &[GroupingCandidate], params: &GroupingParams) -> EngineResult<GroupingPlan> {
    let validated = validate(params)?;

    let groups = match &params.matching {
        Some(matching) => {
            let sorted = candidates
                .iter()
                .map(|c| (c.id, c.rating(matching.metric).unwrap_or(0.0)))
                .sorted_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
                .collect_vec();
            group_by_proximity(&sorted, validated.cohort_size, matching.proximity)
        }
        None => candidates
            .iter()
            .map(|c| c.id)
            .sorted()
            .collect_vec()
            .chunks(validated.cohort_size)
            .map(<[PlayerId]>::to_vec)
            .collect_vec()
    };

    let formed = groups.len();
    // Highest suffix the names can reach
    params
        .start_index
        .checked_add((formed as i64).saturating_sub(1))
        .ok_or_else(|| EngineError::invalid("start_index", "cohort numbering would overflow"))?;

    let groups = groups
        .into_iter()
        .filter(|g| !params.require_full_cohort || g.len() == validated.cohort_size)
        .enumerate()
        .map(|(i, member_ids)| CohortGroup {
            name: format!("{} {}", params.name_prefix, params.start_index + i as i64),
            member_ids
        })
        .collect_vec();

    debug!(
        candidates = candidates.len(),
        formed,
        kept = groups.len(),
        "Bulk assignment grouped candidates"
    );

    Ok(GroupingPlan {
        schedule_id: validated.schedule_id,
        start_date: validated.start_date,
        end_date: validated.end_date,
        groups
    })
}
