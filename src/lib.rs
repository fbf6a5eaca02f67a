//! Auto Duel - deterministic two-player auto-battler engine
//!
//! Games are pure values: every step takes a state and returns the next one,
//! all randomness is derived from a seed string, and every observable event
//! lands in an append-only action log. Replaying the log's inputs rebuilds
//! any intermediate state exactly.

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod rng;
pub mod tournament;

pub use config::GameConfig;
pub use error::{DuelError, Result};
pub use game::{
    create_initial_game_state, execute_full_game, process_game_step,
    reconstruct_state_at_sequence, GameState,
};
pub use loader::{CardCatalog, CardDatabase};
