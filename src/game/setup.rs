//! Game creation
//!
//! Builds the turn-1 state from two decks: shuffles each deck with its own
//! seeded stream, deals opening hands, picks who goes first and writes the
//! sequence-0 log entry.

use crate::config::GameConfig;
use crate::core::{Card, Faction, PlayerId, TacticsType};
use crate::game::action_log::GameAction;
use crate::game::{GameSetup, GameState, Phase};
use crate::rng::SeededRng;
use crate::{DuelError, Result};
use rustc_hash::FxHashSet;

/// Create a ready-to-step game with the default rule set
#[allow(clippy::too_many_arguments)]
pub fn create_initial_game_state(
    game_id: impl Into<String>,
    deck1: Vec<Card>,
    deck2: Vec<Card>,
    faction1: Faction,
    faction2: Faction,
    tactics1: TacticsType,
    tactics2: TacticsType,
    seed: impl Into<String>,
) -> Result<GameState> {
    let setup = GameSetup::new(game_id, deck1, deck2, seed)
        .with_factions(faction1, faction2)
        .with_tactics(tactics1, tactics2);
    create_from_setup(setup, GameConfig::default())
}

/// Create a ready-to-step game from recorded inputs
///
/// Deterministic in `setup` and `config`: calling it twice yields equal
/// states, which is what replay relies on.
pub fn create_from_setup(setup: GameSetup, config: GameConfig) -> Result<GameState> {
    config.validate()?;
    check_unique_ids(&setup)?;

    let mut state = GameState::new(setup, config);
    let seed = state.random_seed.clone();

    for pid in PlayerId::both() {
        let mut rng = SeededRng::new(&format!("{seed}:shuffle:{pid}"));
        let hand_size = state.config.opening_hand_size;
        let player = state.player_mut(pid);
        rng.shuffle(&mut player.deck);

        for _ in 0..hand_size {
            match player.deck.pop() {
                Some(card) => player.hand.push(card),
                None => break,
            }
        }
    }

    let mut coin = SeededRng::new(&format!("{seed}:first_player"));
    state.current_player = if coin.next_float() < 0.5 {
        PlayerId::Player1
    } else {
        PlayerId::Player2
    };

    state.record(
        state.current_player,
        GameAction::PhaseChange {
            from: None,
            to: Phase::Draw,
            turn_number: state.turn_number,
        },
    );
    Ok(state)
}

/// Instance ids must not repeat within or across decks
fn check_unique_ids(setup: &GameSetup) -> Result<()> {
    let mut seen = FxHashSet::default();
    for card in setup.deck1.iter().chain(setup.deck2.iter()) {
        if !seen.insert(card.id) {
            return Err(DuelError::InvalidDeckFormat(format!(
                "card instance id {} appears more than once",
                card.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InstanceId;

    fn deck(start: u32, count: u32) -> Vec<Card> {
        (start..start + count)
            .map(|i| Card::new_creature(InstanceId::new(i), "grunt", "Grunt", 1, 1, 1))
            .collect()
    }

    fn start(seed: &str) -> GameState {
        create_initial_game_state(
            "setup",
            deck(1, 10),
            deck(11, 10),
            Faction::new("ember"),
            Faction::new("tide"),
            TacticsType::Aggressive,
            TacticsType::Defensive,
            seed,
        )
        .unwrap()
    }

    #[test]
    fn test_opening_hands_and_first_entry() {
        let state = start("opening");
        for pid in PlayerId::both() {
            let player = state.player(pid);
            assert_eq!(player.hand.len(), 3);
            assert_eq!(player.deck.len(), 7);
        }
        assert_eq!(state.action_log.len(), 1);
        let first = &state.action_log.entries()[0];
        assert_eq!(first.sequence, 0);
        assert_eq!(first.player_id, state.current_player);
        assert!(matches!(
            first.action,
            GameAction::PhaseChange { from: None, to: Phase::Draw, turn_number: 1 }
        ));
        assert_eq!(state.player(PlayerId::Player1).faction.as_str(), "ember");
        assert_eq!(state.player(PlayerId::Player2).tactics, TacticsType::Defensive);
    }

    #[test]
    fn test_same_seed_same_start() {
        assert_eq!(start("same"), start("same"));
    }

    #[test]
    fn test_seed_changes_shuffle() {
        let orders: Vec<Vec<InstanceId>> = ["a", "b", "c", "d"]
            .iter()
            .map(|seed| {
                let state = start(seed);
                let p1 = state.player(PlayerId::Player1);
                p1.deck.iter().chain(p1.hand.iter()).map(|c| c.id).collect()
            })
            .collect();
        assert!(orders.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_short_deck_deals_what_it_has() {
        let state = create_initial_game_state(
            "short",
            deck(1, 2),
            Vec::new(),
            Faction::neutral(),
            Faction::neutral(),
            TacticsType::Balanced,
            TacticsType::Balanced,
            "seed",
        )
        .unwrap();
        assert_eq!(state.player(PlayerId::Player1).hand.len(), 2);
        assert!(state.player(PlayerId::Player2).hand.is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = create_initial_game_state(
            "dupes",
            deck(1, 3),
            deck(3, 3),
            Faction::neutral(),
            Faction::neutral(),
            TacticsType::Balanced,
            TacticsType::Balanced,
            "seed",
        );
        assert!(matches!(result, Err(DuelError::InvalidDeckFormat(_))));
    }
}
