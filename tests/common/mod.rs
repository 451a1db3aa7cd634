#![allow(dead_code)]

use std::sync::Once;

use dart_rating_engine::{
    config::EngineConfig,
    database::{
        db_structs::{Player, Session},
        memory::InMemoryStore
    },
    processor::RatingProcessor,
    utils::test_utils::{generate_classification, generate_level_band, generate_step_darts}
};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize test environment with RUST_LOG=WARN
pub fn init_test_env() {
    INIT.call_once(|| {
        std::env::set_var("RUST_LOG", "warn");
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn processor_with(players: Vec<Player>) -> RatingProcessor<InMemoryStore> {
    processor_with_config(players, EngineConfig::default())
}

pub fn processor_with_config(players: Vec<Player>, config: EngineConfig) -> RatingProcessor<InMemoryStore> {
    RatingProcessor::new(seeded_store(players), config).unwrap()
}

/// Store holding the given players and two level bands (20-29, 30-39)
pub fn seeded_store(players: Vec<Player>) -> InMemoryStore {
    init_test_env();

    let store = InMemoryStore::new();
    for player in players {
        store.insert_player(player).unwrap();
    }
    store.insert_band(generate_level_band(20, 29, 45.0, Some(40.0))).unwrap();
    store.insert_band(generate_level_band(30, 39, 52.0, Some(45.0))).unwrap();

    store
}

/// Registers a session and one run of it. Singles 6/9, doubles hit on the
/// second dart and a checkout finished on the third give a score of 76.
pub fn seed_assessment(store: &InMemoryStore, name: &str) -> (Uuid, Uuid) {
    let session_id = Uuid::new_v4();
    let run_id = Uuid::new_v4();

    let classifications = vec![
        generate_classification(1, 1, Some("single")),
        generate_classification(2, 1, Some("double")),
        generate_classification(3, 1, Some("checkout")),
    ];
    store
        .insert_session(
            Session {
                id: session_id,
                name: name.to_string()
            },
            classifications
        )
        .unwrap();

    let mut darts = Vec::new();
    darts.extend(generate_step_darts(1, 1, 9, &[0, 1, 2, 3, 4, 5]));
    darts.extend(generate_step_darts(2, 1, 2, &[1]));
    darts.extend(generate_step_darts(3, 1, 3, &[2]));
    store.insert_run(run_id, darts).unwrap();

    (session_id, run_id)
}
