//! Turn phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of a turn, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Draw,
    Energy,
    Deploy,
    Battle,
    End,
}

impl Phase {
    /// Get the next phase; `End` wraps to the next turn's `Draw`
    pub fn next(&self) -> Phase {
        match self {
            Phase::Draw => Phase::Energy,
            Phase::Energy => Phase::Deploy,
            Phase::Deploy => Phase::Battle,
            Phase::Battle => Phase::End,
            Phase::End => Phase::Draw,
        }
    }

    /// Does leaving this phase start a new turn?
    pub fn ends_turn(&self) -> bool {
        matches!(self, Phase::End)
    }

    /// Tag mixed into the per-phase RNG seed
    pub fn tag(&self) -> &'static str {
        match self {
            Phase::Draw => "draw",
            Phase::Energy => "energy",
            Phase::Deploy => "deploy",
            Phase::Battle => "battle",
            Phase::End => "end",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
