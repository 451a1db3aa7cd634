pub mod checkout;
pub mod constants;
pub mod grouping;
pub mod ita;
pub mod match_rating;
pub mod omr;
pub mod player_rating;
pub mod progression;
pub mod scoring;
pub mod snapshot;
pub mod structures;
