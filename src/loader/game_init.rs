//! Game initialization from deck lists
//!
//! Resolves both decks against a catalog and builds the opening state

use crate::config::GameConfig;
use crate::game::{create_from_setup, GameSetup, GameState};
use crate::loader::{CardCatalog, DeckList};
use crate::Result;

/// Game builder for initializing games from decks
pub struct GameInitializer<'a, C: CardCatalog> {
    catalog: &'a C,
    config: GameConfig,
}

impl<'a, C: CardCatalog> GameInitializer<'a, C> {
    /// Create a new game initializer with the default rule set
    pub fn new(catalog: &'a C) -> Self {
        GameInitializer {
            catalog,
            config: GameConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// The decks' own factions and tactics are used for the two seats
    ///
    /// Player 2's instance ids continue after player 1's.
    pub fn init_game(
        &self,
        game_id: &str,
        deck1: &DeckList,
        deck2: &DeckList,
        seed: &str,
        start_time: u64,
    ) -> Result<GameState> {
        let cards1 = deck1.instantiate(self.catalog, 1)?;
        let cards2 = deck2.instantiate(self.catalog, cards1.len() as u32 + 1)?;

        let setup = GameSetup::new(game_id, cards1, cards2, seed)
            .with_factions(deck1.faction.clone(), deck2.faction.clone())
            .with_tactics(deck1.tactics, deck2.tactics)
            .with_start_time(start_time);
        create_from_setup(setup, self.config.clone())
    }
}
