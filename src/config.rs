//! Rule constants threaded through every game
//!
//! Limits live in a value stored on the game state rather than in global
//! constants, so tests can run alternate rule sets.

use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rule set for a single game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Starting life for both players (also the heal cap)
    pub initial_life: i32,
    pub hand_limit: usize,
    pub field_limit: usize,
    pub energy_limit: u32,
    /// Cards dealt to each player before the first turn
    pub opening_hand_size: usize,
    /// Turn after which the game ends on timeout
    pub max_turns: u32,
    /// Step cap for running a game to completion
    pub max_steps: u32,
    /// Greedy deploy iterations per deploy phase
    pub max_deploy_attempts: u32,
    /// Life lost when drawing from an empty deck
    pub fatigue_damage: i32,
    /// Poison applied by the poison keyword on hit
    pub poison_duration: i32,
    pub poison_damage: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            initial_life: 15,
            hand_limit: 10,
            field_limit: 5,
            energy_limit: 10,
            opening_hand_size: 3,
            max_turns: 30,
            max_steps: 1000,
            max_deploy_attempts: 10,
            fatigue_damage: 1,
            poison_duration: 2,
            poison_damage: 1,
        }
    }
}

impl GameConfig {
    /// Load a rule set from a JSON file; missing fields take their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject rule sets the engine cannot run
    pub fn validate(&self) -> Result<()> {
        if self.initial_life <= 0 {
            return Err(DuelError::InvalidConfig(format!(
                "initial_life must be positive, got {}",
                self.initial_life
            )));
        }
        if self.field_limit == 0 || self.hand_limit == 0 {
            return Err(DuelError::InvalidConfig(
                "field_limit and hand_limit must be at least 1".to_string(),
            ));
        }
        if self.opening_hand_size > self.hand_limit {
            return Err(DuelError::InvalidConfig(format!(
                "opening_hand_size {} exceeds hand_limit {}",
                self.opening_hand_size, self.hand_limit
            )));
        }
        Ok(())
    }
}
