//! Game state, turn structure and the simulation engine

/// Conditional logging that compiles away when the feature is disabled
///
/// Skips the `format!` allocation entirely unless the logger would keep the
/// message, which matters in the tournament hot loop.
macro_rules! log_if_verbose {
    ($logger:expr, $level:ident, $category:literal, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            let level = $crate::game::VerbosityLevel::$level;
            if $logger.enabled(level) {
                $logger.event(level, $category, &format!($($arg)*));
            }
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$logger;
        }
    };
}

pub mod action_log;
pub mod card_hooks;
pub mod combat;
pub mod effect_engine;
pub mod game_loop;
pub mod logger;
pub mod phase;
pub mod replay;
pub mod setup;
pub mod state;
pub mod state_hash;
pub mod tactics;
pub mod targeting;

pub use action_log::{ActionEntry, ActionLog, AttackTarget, EndReason, GameAction};
pub use card_hooks::{CardBehavior, CardHookRegistry};
pub use effect_engine::EffectEngine;
pub use game_loop::{execute_full_game, process_game_step, GameLoop, VerbosityLevel};
pub use logger::{GameLogger, LogEntry, OutputMode};
pub use phase::Phase;
pub use replay::reconstruct_state_at_sequence;
pub use setup::{create_from_setup, create_initial_game_state};
pub use state::{GameResult, GameSetup, GameState};
pub use state_hash::{compute_state_hash, format_hash};
pub use tactics::{choose_attack_target, evaluate_card_for_play};
