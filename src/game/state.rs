//! Main game state structure

use crate::config::GameConfig;
use crate::core::{Card, Faction, FieldCard, InstanceId, PlayerId, PlayerState, TacticsType};
use crate::game::action_log::{ActionLog, EndReason, GameAction};
use crate::game::Phase;
use crate::rng::SeededRng;
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};

/// Both seats, addressed by `PlayerId`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub player1: PlayerState,
    pub player2: PlayerState,
}

impl Players {
    pub fn get(&self, id: PlayerId) -> &PlayerState {
        match id {
            PlayerId::Player1 => &self.player1,
            PlayerId::Player2 => &self.player2,
        }
    }

    pub fn get_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        match id {
            PlayerId::Player1 => &mut self.player1,
            PlayerId::Player2 => &mut self.player2,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerState> {
        [&self.player1, &self.player2].into_iter()
    }
}

/// Terminal outcome, set once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    /// None on a draw
    pub winner: Option<PlayerId>,
    pub reason: EndReason,
    pub total_turns: u32,
    pub duration_seconds: f64,
    pub end_time: u64,
}

/// Inputs a game was created from, kept so the initial state can be rebuilt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    pub game_id: String,
    /// Decks in their unshuffled order
    pub deck1: Vec<Card>,
    pub deck2: Vec<Card>,
    pub faction1: Faction,
    pub faction2: Faction,
    pub tactics1: TacticsType,
    pub tactics2: TacticsType,
    pub seed: String,
    /// Milliseconds since the epoch; also the base of the logical log clock
    #[serde(default)]
    pub start_time: u64,
}

impl GameSetup {
    pub fn new(
        game_id: impl Into<String>,
        deck1: Vec<Card>,
        deck2: Vec<Card>,
        seed: impl Into<String>,
    ) -> Self {
        GameSetup {
            game_id: game_id.into(),
            deck1,
            deck2,
            faction1: Faction::neutral(),
            faction2: Faction::neutral(),
            tactics1: TacticsType::Balanced,
            tactics2: TacticsType::Balanced,
            seed: seed.into(),
            start_time: 0,
        }
    }

    pub fn with_factions(mut self, faction1: Faction, faction2: Faction) -> Self {
        self.faction1 = faction1;
        self.faction2 = faction2;
        self
    }

    pub fn with_tactics(mut self, tactics1: TacticsType, tactics2: TacticsType) -> Self {
        self.tactics1 = tactics1;
        self.tactics2 = tactics2;
        self
    }

    pub fn with_start_time(mut self, start_time: u64) -> Self {
        self.start_time = start_time;
        self
    }
}

/// Complete game state
///
/// Treated as a value: every step clones its input and returns a new state,
/// so consecutive states never share mutable data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub game_id: String,
    pub turn_number: u32,
    pub current_player: PlayerId,
    pub phase: Phase,
    pub players: Players,
    pub action_log: ActionLog,
    pub random_seed: String,
    pub start_time: u64,
    pub result: Option<GameResult>,
    pub config: GameConfig,
    pub setup: GameSetup,
    next_instance_id: u32,
}

impl GameState {
    /// Bare state with both players at starting life and nothing logged
    ///
    /// Use `create_initial_game_state` for a playable game; this is the
    /// building block it and tests start from.
    pub fn new(setup: GameSetup, config: GameConfig) -> Self {
        let next_instance_id = setup
            .deck1
            .iter()
            .chain(setup.deck2.iter())
            .map(|c| c.id.as_u32() + 1)
            .max()
            .unwrap_or(1);

        let player1 = PlayerState::new(
            PlayerId::Player1,
            setup.faction1.clone(),
            setup.tactics1,
            setup.deck1.clone(),
            config.initial_life,
        );
        let player2 = PlayerState::new(
            PlayerId::Player2,
            setup.faction2.clone(),
            setup.tactics2,
            setup.deck2.clone(),
            config.initial_life,
        );

        GameState {
            game_id: setup.game_id.clone(),
            turn_number: 1,
            current_player: PlayerId::Player1,
            phase: Phase::Draw,
            players: Players { player1, player2 },
            action_log: ActionLog::new(),
            random_seed: setup.seed.clone(),
            start_time: setup.start_time,
            result: None,
            config,
            setup,
            next_instance_id,
        }
    }

    pub fn player(&self, id: PlayerId) -> &PlayerState {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        self.players.get_mut(id)
    }

    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    /// Append to the action log, returning the new sequence number
    pub fn record(&mut self, player_id: PlayerId, action: GameAction) -> u64 {
        self.action_log.append(player_id, self.start_time, action)
    }

    /// Fresh instance id for summoned tokens and other generated cards
    pub fn next_instance_id(&mut self) -> InstanceId {
        let id = InstanceId::new(self.next_instance_id);
        self.next_instance_id += 1;
        id
    }

    /// RNG stream for the current phase of the current turn
    pub fn phase_rng(&self) -> SeededRng {
        SeededRng::for_phase(&self.random_seed, self.turn_number, self.phase.tag())
    }

    /// Look up a creature on either side of the field
    pub fn find_field_card(&self, id: InstanceId) -> Option<&FieldCard> {
        self.players.iter().find_map(|p| p.field_card(id))
    }

    pub fn find_field_card_mut(&mut self, id: InstanceId) -> Option<&mut FieldCard> {
        let owner = self.owner_of(id)?;
        self.players.get_mut(owner).field_card_mut(id)
    }

    /// Controller of a creature currently on the field
    pub fn owner_of(&self, id: InstanceId) -> Option<PlayerId> {
        PlayerId::both()
            .into_iter()
            .find(|pid| self.players.get(*pid).field_card(id).is_some())
    }

    /// Check the structural invariants every reachable state must satisfy
    pub fn integrity_check(&self) -> Result<()> {
        let cfg = &self.config;
        for player in self.players.iter() {
            if player.hand.len() > cfg.hand_limit {
                return Err(DuelError::InvalidState(format!(
                    "{} holds {} cards (limit {})",
                    player.id,
                    player.hand.len(),
                    cfg.hand_limit
                )));
            }
            if player.field.len() > cfg.field_limit {
                return Err(DuelError::InvalidState(format!(
                    "{} has {} creatures on the field (limit {})",
                    player.id,
                    player.field.len(),
                    cfg.field_limit
                )));
            }
            if player.energy > player.max_energy || player.max_energy > cfg.energy_limit {
                return Err(DuelError::InvalidState(format!(
                    "{} energy {}/{} breaks the limit {}",
                    player.id, player.energy, player.max_energy, cfg.energy_limit
                )));
            }
            for (position, fc) in player.field.iter().enumerate() {
                if fc.position != position || fc.owner != player.id {
                    return Err(DuelError::InvalidState(format!(
                        "field card {} of {} is out of place",
                        fc.id(),
                        player.id
                    )));
                }
            }
        }
        if !self.action_log.is_monotonic() {
            return Err(DuelError::InvalidState(
                "action log sequence numbers are not contiguous".to_string(),
            ));
        }
        Ok(())
    }
}
