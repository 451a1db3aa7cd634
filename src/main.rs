use std::{
    error::Error,
    fs,
    io::{self, Read}
};

use clap::Parser;
use dart_rating_engine::{
    args::{Args, Command},
    config::EngineConfig,
    database::db_structs::GroupingCandidate,
    model::{
        checkout::{expected_checkouts, CheckoutInput},
        grouping::{bulk_assign, GroupingParams},
        match_rating::{match_rating, MatchRatingInput},
        omr::{overall_match_rating, WeightedRating},
        player_rating::player_rating,
        progression::{apply_training_rating_progression, level_change}
    }
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Deserialize)]
struct OmrRequest {
    ratings: Vec<WeightedRating>,
    window: Option<usize>
}

#[derive(Deserialize)]
struct PlayerRatingRequest {
    training_rating: Option<f64>,
    match_rating: Option<f64>
}

#[derive(Deserialize)]
struct GroupRequest {
    params: GroupingParams,
    candidates: Vec<GroupingCandidate>
}

#[derive(Deserialize)]
struct ProgressionRequest {
    training_rating: Option<f64>,
    session_pct: f64
}

fn read_input(args: &Args) -> io::Result<String> {
    match &args.input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn parse<T: DeserializeOwned>(raw: &str) -> Result<T, Box<dyn Error>> {
    Ok(serde_json::from_str(raw)?)
}

fn evaluate(command: Command, raw: &str, config: &EngineConfig) -> Result<Value, Box<dyn Error>> {
    let value = match command {
        Command::Checkout => serde_json::to_value(expected_checkouts(&parse::<CheckoutInput>(raw)?)?)?,
        Command::MatchRating => json!({ "match_rating": match_rating(&parse::<MatchRatingInput>(raw)?)? }),
        Command::Omr => {
            let request: OmrRequest = parse(raw)?;
            let window = request.window.unwrap_or(config.omr_window);
            json!({ "match_rating": overall_match_rating(&request.ratings, window) })
        }
        Command::PlayerRating => {
            let request: PlayerRatingRequest = parse(raw)?;
            json!({
                "player_rating": player_rating(request.training_rating, request.match_rating, config.blend_weights)
            })
        }
        Command::Group => {
            let request: GroupRequest = parse(raw)?;
            serde_json::to_value(bulk_assign(&request.candidates, &request.params)?)?
        }
        Command::Progression => {
            let request: ProgressionRequest = parse(raw)?;
            json!({
                "level_change": level_change(request.session_pct),
                "training_rating": apply_training_rating_progression(request.training_rating, request.session_pct)
            })
        }
    };

    Ok(value)
}

fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .with_writer(io::stderr)
        .init();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid engine configuration: {e}");
            std::process::exit(2);
        }
    };
    debug!(?config, "Loaded engine configuration");

    let result = read_input(&args)
        .map_err(Box::<dyn Error>::from)
        .and_then(|raw| evaluate(args.command, &raw, &config));

    match result {
        Ok(value) => println!("{value:#}"),
        Err(e) => {
            error!(command = ?args.command, "Evaluation failed: {e}");
            std::process::exit(1);
        }
    }
}
