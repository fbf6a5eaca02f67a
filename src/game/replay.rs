//! Rebuild past states from a finished (or in-progress) game
//!
//! The engine is deterministic in its setup and rule set, so replay simply
//! recreates the initial state and steps forward. Every entry the replay
//! produces is checked against the recorded log; a mismatch means the
//! recorded game came from different inputs or a different engine.

use crate::game::setup::create_from_setup;
use crate::game::{GameLoop, GameState};
use crate::{DuelError, Result};

/// State at the last step boundary whose log ends at or before `target_sequence`
///
/// Steps happen one phase at a time, so the result is the state right after
/// the step that wrote `target_sequence` unless that step wrote further
/// entries too; then it is the state just before that step.
pub fn reconstruct_state_at_sequence(original: &GameState, target_sequence: u64) -> Result<GameState> {
    reconstruct_with(&GameLoop::silent(), original, target_sequence)
}

/// Replay with a specific loop, for games played with custom card hooks
pub fn reconstruct_with(game: &GameLoop, original: &GameState, target_sequence: u64) -> Result<GameState> {
    let mut state = create_from_setup(original.setup.clone(), original.config.clone())?;
    verify_entries(&state, original, 0)?;

    let recorded = original.action_log.len() as u64;
    while !state.is_over() {
        let next = game.process_game_step(&state)?;
        let Some(last) = next.action_log.last_sequence() else {
            break;
        };
        if last > target_sequence || last >= recorded {
            break;
        }
        verify_entries(&next, original, state.action_log.len())?;
        state = next;
    }
    Ok(state)
}

/// Compare the replayed entries from `from` onward with the recorded ones
fn verify_entries(replayed: &GameState, original: &GameState, from: usize) -> Result<()> {
    for entry in &replayed.action_log.entries()[from..] {
        match original.action_log.get(entry.sequence) {
            Some(recorded) if recorded == entry => {}
            _ => {
                return Err(DuelError::ReplayDivergence {
                    sequence: entry.sequence,
                })
            }
        }
    }
    Ok(())
}
