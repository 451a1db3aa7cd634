use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Which rating the cohort grouper matches players on
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RatingMetric {
    #[default]
    PlayerRating,
    TrainingRating,
    MatchRating
}
