//! Replay fidelity tests
//!
//! Plays full games step by step, keeps every intermediate state, and checks
//! that rebuilding from the recorded log lands on exactly those states.

use auto_duel::{
    game::{reconstruct_state_at_sequence, GameLoop, GameState},
    loader::{CardDatabase, DeckLoader, GameInitializer},
    DuelError,
};
use similar_asserts::assert_eq;
use std::path::PathBuf;

fn initial_state(deck1: &str, deck2: &str, seed: &str) -> GameState {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_decks");
    let catalog = CardDatabase::load(&root.join("catalog")).unwrap();
    let deck1 = DeckLoader::load_from_file(&root.join("decks").join(deck1)).unwrap();
    let deck2 = DeckLoader::load_from_file(&root.join("decks").join(deck2)).unwrap();
    GameInitializer::new(&catalog)
        .init_game("replay", &deck1, &deck2, seed, 50_000)
        .unwrap()
}

/// Every state the game passes through, initial state first
fn play_recording_steps(initial: GameState) -> Vec<GameState> {
    let game = GameLoop::silent();
    let mut states = vec![initial];
    while let Some(last) = states.last() {
        if last.is_over() {
            break;
        }
        let next = game.process_game_step(last).unwrap();
        states.push(next);
    }
    states
}

/// The latest recorded step boundary whose log stays at or before `target`
fn expected_at(states: &[GameState], target: u64) -> &GameState {
    states
        .iter()
        .take_while(|s| s.action_log.last_sequence().unwrap() <= target)
        .last()
        .unwrap()
}

#[test]
fn test_replay_matches_every_step_boundary() {
    let states = play_recording_steps(initial_state("ember_rush.json", "tide_wall.json", "replay-1"));
    let finished = states.last().unwrap();
    assert!(finished.is_over());

    for state in &states {
        let boundary = state.action_log.last_sequence().unwrap();
        let rebuilt = reconstruct_state_at_sequence(finished, boundary).unwrap();
        assert_eq!(&rebuilt, state, "mismatch at sequence {}", boundary);
    }
}

#[test]
fn test_replay_between_boundaries_stops_early() {
    let states = play_recording_steps(initial_state("grave_brand.json", "legion_mix.json", "replay-2"));
    let finished = states.last().unwrap();
    let total = finished.action_log.len() as u64;

    for target in (0..total).step_by(7) {
        let rebuilt = reconstruct_state_at_sequence(finished, target).unwrap();
        let expected = expected_at(&states, target);
        assert_eq!(&rebuilt, expected, "mismatch for target {}", target);
        assert!(rebuilt.action_log.last_sequence().unwrap() <= target);
    }
}

#[test]
fn test_replay_survives_json_roundtrip() {
    let states = play_recording_steps(initial_state("tide_wall.json", "grave_brand.json", "replay-3"));
    let finished = states.last().unwrap();

    let json = serde_json::to_string(finished).unwrap();
    let loaded: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded.action_log, finished.action_log);

    let target = finished.action_log.len() as u64 / 2;
    let rebuilt = reconstruct_state_at_sequence(&loaded, target).unwrap();
    assert_eq!(&rebuilt, expected_at(&states, target));
}

#[test]
fn test_replay_detects_tampered_log() {
    let states = play_recording_steps(initial_state("ember_rush.json", "legion_mix.json", "replay-4"));
    let mut tampered = states.last().unwrap().clone();
    tampered.setup.tactics1 = match tampered.setup.tactics1 {
        auto_duel::core::TacticsType::Aggressive => auto_duel::core::TacticsType::Defensive,
        _ => auto_duel::core::TacticsType::Aggressive,
    };
    tampered.setup.deck1.reverse();

    let last = tampered.action_log.last_sequence().unwrap();
    let result = reconstruct_state_at_sequence(&tampered, last);
    assert!(matches!(result, Err(DuelError::ReplayDivergence { .. })));
}
