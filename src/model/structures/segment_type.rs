use serde_repr::{Deserialize_repr, Serialize_repr};
use strum_macros::{Display, EnumIter, EnumString};

/// The four sub-skills scored by the initial assessment.
/// A routine is typed as exactly one of these, derived from its steps.
#[derive(
    Deserialize_repr, Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, Display,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum SegmentType {
    #[strum(to_string = "Singles", serialize = "single")]
    Singles = 0,
    #[strum(to_string = "Doubles", serialize = "double")]
    Doubles = 1,
    #[strum(to_string = "Trebles", serialize = "treble", serialize = "triple", serialize = "triples")]
    Trebles = 2,
    #[strum(to_string = "Checkout", serialize = "checkouts")]
    Checkout = 3
}

impl SegmentType {
    /// Weight of this segment in the combined assessment score
    pub fn ita_weight(self) -> f64 {
        match self {
            SegmentType::Singles => 3.0,
            SegmentType::Doubles => 2.0,
            SegmentType::Trebles => 2.0,
            SegmentType::Checkout => 1.0
        }
    }
}
