use std::fs;
use tempfile::tempdir;
use wc_cli::{
    knockout_stage, load_config, load_frozen, load_tournament, write_json, SimulationMetadata,
};
use wc_core::data::official_bracket;
use wc_core::simulate::TournamentSimulator;
use wc_core::{EngineConfig, TournamentEngine};

#[test]
fn default_data_is_the_sample_draw() {
    let data = load_tournament(None).unwrap();
    assert_eq!(data.teams.len(), 48);
    assert!(data.matches.is_empty());
}

#[test]
fn unreadable_tournament_names_the_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = load_tournament(Some(&missing)).unwrap_err();
    assert!(err.to_string().contains("missing.json"), "{err}");

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    let err = load_tournament(Some(&broken)).unwrap_err();
    assert!(err.to_string().starts_with("Invalid tournament file"), "{err}");
}

#[test]
fn explicit_config_file_is_validated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    fs::write(&path, r#"{ "group_size": 0 }"#).unwrap();
    assert!(load_config(Some(&path)).is_err());

    fs::write(&path, r#"{ "points": { "win": 2, "draw": 1, "loss": 0 } }"#).unwrap();
    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.points.win, 2);
    assert_eq!(config.qualifying_third_places, 8);
}

#[test]
fn simulated_tournament_survives_a_file_round_trip() {
    let dir = tempdir().unwrap();
    let data_path = dir.path().join("tournament.json");
    let frozen_path = dir.path().join("frozen.json");

    let mut data = load_tournament(None).unwrap();
    let mut simulator = TournamentSimulator::new(11);
    simulator.play_group_stage(&mut data);
    let bracket = official_bracket().unwrap();
    let frozen = simulator.play_knockout(&mut data, bracket, &EngineConfig::default()).unwrap();
    write_json(&data_path, &data).unwrap();
    write_json(&frozen_path, &frozen).unwrap();

    let reloaded = load_tournament(Some(&data_path)).unwrap();
    assert_eq!(reloaded, data);
    let restored = load_frozen(&frozen_path).unwrap();
    assert_eq!(restored, frozen);

    let engine = TournamentEngine::official(&reloaded).unwrap();
    let stage = knockout_stage(&engine, Some(restored)).unwrap();
    assert!(stage.drift().unwrap().is_none());
    assert!(stage.stale_fixtures().unwrap().is_empty());
}

#[test]
fn metadata_is_written_as_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("meta.json");
    let meta = SimulationMetadata {
        seed: 3,
        matches_played: 104,
        fingerprint: "ab".repeat(32),
        champion: Some("Brazil".to_string()),
        created_at: "2026-07-19T20:00:00+00:00".to_string(),
    };
    write_json(&path, &meta).unwrap();

    let read: SimulationMetadata =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(read, meta);
}

#[test]
fn malformed_frozen_assignment_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("frozen.json");
    fs::write(&path, r#"{ "qualifying_groups": "ABC" }"#).unwrap();
    let err = load_frozen(&path).unwrap_err();
    assert!(err.to_string().starts_with("Invalid frozen assignment"), "{err}");
}

#[test]
fn bracket_without_a_saved_assignment_is_a_preview() {
    let data = load_tournament(None).unwrap();
    let engine = TournamentEngine::official(&data).unwrap();
    let stage = knockout_stage(&engine, None).unwrap();
    assert!(stage.is_provisional());
    assert!(stage.prepare_fixture(73).is_err());
    assert!(engine.enter_knockout_stage().is_err());
}
