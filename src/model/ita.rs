use std::{collections::HashMap, str::FromStr};

use indexmap::IndexMap;
use itertools::Itertools;
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::{
    database::db_structs::{DartOutcome, SegmentRatings, StepClassification},
    error::{EngineResult, ValidationError},
    model::{
        constants::{
            CHECKOUT_BREAKPOINTS, CHECKOUT_MIN_DARTS, DOUBLES_BREAKPOINTS, DOUBLES_MISS_DARTS, ITA_SESSION_NAMES,
            SEGMENT_DARTS_PER_STEP
        },
        scoring::mean,
        structures::segment_type::SegmentType
    },
    utils::rounding::interpolate
};

/// Hit/miss results of one routine step, in throwing order
#[derive(Debug, Clone, PartialEq)]
pub struct StepDarts {
    pub routine_no: i32,
    pub step_no: i32,
    pub hits: Vec<bool>
}

impl StepDarts {
    /// 1-indexed position of the first hit
    fn first_hit(&self) -> Option<usize> {
        self.hits.iter().position(|h| *h).map(|i| i + 1)
    }
}

/// True when the session name marks an initial training assessment.
pub fn is_ita_session(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    ITA_SESSION_NAMES.contains(&name.as_str())
}

/// Singles and trebles share one rule: every step with at least nine darts
/// scores `(hits / 9) × 100` over its first nine darts, and the rating is the
/// mean of those step scores.
pub fn accuracy_rating(steps: &[StepDarts]) -> f64 {
    let scores = steps
        .iter()
        .filter(|s| s.hits.len() >= SEGMENT_DARTS_PER_STEP)
        .map(|s| {
            let hits = s.hits.iter().take(SEGMENT_DARTS_PER_STEP).filter(|h| **h).count();
            hits as f64 / SEGMENT_DARTS_PER_STEP as f64 * 100.0
        })
        .collect_vec();

    mean(&scores)
}

/// Maps the mean darts-to-first-hit onto the doubles scale.
pub fn doubles_rating_from_mean(mean_darts: f64) -> f64 {
    interpolate(&DOUBLES_BREAKPOINTS, mean_darts)
}

pub fn doubles_rating(steps: &[StepDarts]) -> f64 {
    if steps.is_empty() {
        return 0.0;
    }

    let darts = steps
        .iter()
        .map(|s| s.first_hit().map(|d| d as f64).unwrap_or(DOUBLES_MISS_DARTS))
        .collect_vec();

    doubles_rating_from_mean(mean(&darts))
}

/// Maps the mean darts-above-minimum onto the checkout scale.
pub fn checkout_rating_from_mean(mean_above_minimum: f64) -> f64 {
    interpolate(&CHECKOUT_BREAKPOINTS, mean_above_minimum)
}

pub fn checkout_rating(steps: &[StepDarts]) -> f64 {
    let mut above_minimum = Vec::with_capacity(steps.len());

    for step in steps {
        let floor = match usize::try_from(step.step_no - 1)
            .ok()
            .and_then(|i| CHECKOUT_MIN_DARTS.get(i))
        {
            Some(floor) => *floor,
            None => {
                warn!(
                    routine_no = step.routine_no,
                    step_no = step.step_no,
                    "Checkout step outside the assessed range, skipping"
                );
                continue;
            }
        };

        let used = step.first_hit().unwrap_or(step.hits.len()) as i32;
        above_minimum.push((used - floor).max(0) as f64);
    }

    if above_minimum.is_empty() {
        return 0.0;
    }

    checkout_rating_from_mean(mean(&above_minimum))
}

/// Combined assessment score: the weighted mean of whichever segments are
/// present (singles 3, doubles 2, trebles 2, checkout 1), floored.
pub fn ita_score(ratings: &SegmentRatings) -> i32 {
    let (weighted, total_weight) = SegmentType::iter()
        .filter_map(|segment| ratings.get(segment).map(|r| (r, segment.ita_weight())))
        .fold((0.0, 0.0), |(sum, weights), (rating, weight)| {
            (sum + rating * weight, weights + weight)
        });

    if total_weight == 0.0 {
        return 0;
    }

    (weighted / total_weight).floor() as i32
}

/// Resolves every routine's segment type from its step classifications.
/// All steps of a routine must agree on one recognized type.
pub fn classify_routines(classifications: &[StepClassification]) -> EngineResult<HashMap<i32, SegmentType>> {
    let mut routines: HashMap<i32, SegmentType> = HashMap::new();

    for c in classifications {
        let raw = match c.step_type.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                return Err(ValidationError::MissingStepType {
                    routine_no: c.routine_no,
                    step_no: c.step_no
                }
                .into())
            }
        };

        let segment = SegmentType::from_str(raw).map_err(|_| ValidationError::UnrecognizedStepType {
            routine_no: c.routine_no,
            step_no: c.step_no,
            step_type: raw.to_string()
        })?;

        match routines.get(&c.routine_no) {
            Some(existing) if *existing != segment => {
                return Err(ValidationError::MixedRoutineTypes {
                    routine_no: c.routine_no,
                    first: existing.to_string(),
                    second: segment.to_string()
                }
                .into())
            }
            Some(_) => {}
            None => {
                routines.insert(c.routine_no, segment);
            }
        }
    }

    Ok(routines)
}

/// Groups darts by routine and step, ordered by routine, step, then dart index.
pub fn group_steps(darts: &[DartOutcome]) -> Vec<StepDarts> {
    let mut steps: IndexMap<(i32, i32), Vec<bool>> = IndexMap::new();

    for dart in darts
        .iter()
        .sorted_by_key(|d| (d.routine_no, d.step_no, d.dart_index))
    {
        steps
            .entry((dart.routine_no, dart.step_no))
            .or_default()
            .push(dart.hit);
    }

    steps
        .into_iter()
        .map(|((routine_no, step_no), hits)| StepDarts {
            routine_no,
            step_no,
            hits
        })
        .collect()
}

/// Derives per-segment ratings from the darts recorded in an assessment run.
/// Fails on the first routine or step that cannot be classified.
pub fn derive_segment_ratings(
    darts: &[DartOutcome],
    classifications: &[StepClassification]
) -> EngineResult<SegmentRatings> {
    let routine_types = classify_routines(classifications)?;
    let mut by_segment: HashMap<SegmentType, Vec<StepDarts>> = HashMap::new();

    for step in group_steps(darts) {
        let segment = routine_types
            .get(&step.routine_no)
            .ok_or(ValidationError::MissingRoutine {
                routine_no: step.routine_no
            })?;
        by_segment.entry(*segment).or_default().push(step);
    }

    let mut ratings = SegmentRatings::default();
    for (segment, steps) in &by_segment {
        let rating = match segment {
            SegmentType::Singles | SegmentType::Trebles => accuracy_rating(steps),
            SegmentType::Doubles => doubles_rating(steps),
            SegmentType::Checkout => checkout_rating(steps)
        };
        debug!(segment = %segment, steps = steps.len(), rating, "Derived segment rating");
        ratings.set(*segment, rating);
    }

    Ok(ratings)
}
