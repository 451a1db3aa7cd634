use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Clone, Debug)]
#[command(
    display_name = "Dart Rating Engine",
    long_about = "Evaluates darts rating formulas against JSON input"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// JSON document to evaluate. Reads stdin when omitted.
    #[arg(short, long, env = "ENGINE_INPUT", global = true)]
    pub input: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        global = true,
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Expected checkout successes for one target
    Checkout,
    /// Rating for a single match
    MatchRating,
    /// Overall match rating over recent weighted match ratings
    Omr,
    /// Blends training rating and OMR into the published rating
    PlayerRating,
    /// Splits candidates into cohorts
    Group,
    /// Applies a session percentage to a training rating
    Progression
}
