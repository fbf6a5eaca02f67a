//! Tournament mode for running many games in parallel and collecting statistics
//!
//! Every game is independent and seeded from the tournament seed plus its
//! index, so the aggregate numbers are the same regardless of thread count.

use crate::{
    config::GameConfig,
    core::PlayerId,
    game::GameLoop,
    loader::{CardDatabase, DeckList, GameInitializer},
    DuelError, Result,
};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Win/loss/draw counts for one pairing, keyed in name order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchupRecord {
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
}

impl MatchupRecord {
    pub fn total(&self) -> usize {
        self.first_wins + self.second_wins + self.draws
    }
}

/// Statistics collected during a tournament
#[derive(Debug, Clone, Default)]
pub struct TournamentStats {
    pub games_played: usize,
    pub failed_games: usize,
    pub p1_wins: usize,
    pub p2_wins: usize,
    pub draws: usize,
    pub total_turns: u64,
    pub deck_wins: HashMap<String, usize>,
    pub deck_games: HashMap<String, usize>,
    pub matchup_results: HashMap<(String, String), MatchupRecord>,
}

impl TournamentStats {
    fn record(&mut self, deck1: &str, deck2: &str, winner: Option<PlayerId>, turns: u32) {
        self.games_played += 1;
        self.total_turns += u64::from(turns);
        *self.deck_games.entry(deck1.to_string()).or_insert(0) += 1;
        *self.deck_games.entry(deck2.to_string()).or_insert(0) += 1;

        let (key, deck1_first) = if deck1 <= deck2 {
            ((deck1.to_string(), deck2.to_string()), true)
        } else {
            ((deck2.to_string(), deck1.to_string()), false)
        };
        let matchup = self.matchup_results.entry(key).or_default();

        match winner {
            Some(PlayerId::Player1) => {
                self.p1_wins += 1;
                *self.deck_wins.entry(deck1.to_string()).or_insert(0) += 1;
                if deck1_first {
                    matchup.first_wins += 1;
                } else {
                    matchup.second_wins += 1;
                }
            }
            Some(PlayerId::Player2) => {
                self.p2_wins += 1;
                *self.deck_wins.entry(deck2.to_string()).or_insert(0) += 1;
                if deck1_first {
                    matchup.second_wins += 1;
                } else {
                    matchup.first_wins += 1;
                }
            }
            None => {
                self.draws += 1;
                matchup.draws += 1;
            }
        }
    }

    pub fn average_turns(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.games_played as f64
        }
    }
}

/// Run `games` games between randomly paired decks
///
/// Decks are `(name, list)` pairs; mirror matches are allowed. Games that fail
/// to build or run are counted in `failed_games` and reported on stderr.
pub fn run_tourney(
    decks: &[(String, DeckList)],
    catalog: &CardDatabase,
    rules: &GameConfig,
    games: usize,
    seed: u64,
) -> Result<TournamentStats> {
    if decks.len() < 2 {
        return Err(DuelError::InvalidConfig(
            "Tournament requires at least 2 decks".to_string(),
        ));
    }
    rules.validate()?;

    let stats = Arc::new(Mutex::new(TournamentStats::default()));
    let initializer = GameInitializer::new(catalog).with_config(rules.clone());

    (0..games).into_par_iter().for_each(|game_idx| {
        let mut deck_rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(game_idx as u64));
        let (deck1_name, deck1) = &decks[deck_rng.gen_range(0..decks.len())];
        let (deck2_name, deck2) = &decks[deck_rng.gen_range(0..decks.len())];

        let game_id = format!("tourney-{game_idx}");
        let game_seed = format!("{seed}-{game_idx}");
        let outcome = initializer
            .init_game(&game_id, deck1, deck2, &game_seed, 0)
            .and_then(|state| GameLoop::silent().execute_full_game(state));

        // A panicking worker poisons the lock; the counts inside are still whole
        let mut stats = stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match outcome {
            Ok(finished) => {
                let (winner, turns) = finished
                    .result
                    .as_ref()
                    .map(|r| (r.winner, r.total_turns))
                    .unwrap_or((None, finished.turn_number));
                stats.record(deck1_name, deck2_name, winner, turns);
            }
            Err(e) => {
                stats.failed_games += 1;
                eprintln!("Warning: Game {game_idx} failed: {e}");
            }
        }

        let completed = stats.games_played + stats.failed_games;
        if completed % 100 == 0 {
            println!("Completed {completed} games");
        }
    });

    let stats = Arc::try_unwrap(stats)
        .map_err(|_| DuelError::InvalidState("tournament stats still shared".to_string()))?
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    Ok(stats)
}

fn percent(part: usize, whole: usize) -> f64 {
    100.0 * part as f64 / whole as f64
}

/// Print the tournament summary the way the CLI shows it
pub fn print_report(stats: &TournamentStats, started: Instant) {
    let elapsed = started.elapsed();

    println!("\n=== Tournament Complete ===");
    println!("Total games played: {}", stats.games_played);
    if stats.failed_games > 0 {
        println!("Failed games: {}", stats.failed_games);
    }
    println!("Elapsed time: {:.2}s", elapsed.as_secs_f64());
    println!(
        "Games per second: {:.2}",
        stats.games_played as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("Average game length: {:.1} turns\n", stats.average_turns());

    println!("=== Player Position Statistics ===");
    let total = stats.p1_wins + stats.p2_wins + stats.draws;
    if total > 0 {
        println!("P1 wins: {} ({:.1}%)", stats.p1_wins, percent(stats.p1_wins, total));
        println!("P2 wins: {} ({:.1}%)", stats.p2_wins, percent(stats.p2_wins, total));
        println!("Draws: {} ({:.1}%)", stats.draws, percent(stats.draws, total));
    }

    println!("\n=== Deck Win Rates ===");
    let mut deck_games: Vec<_> = stats.deck_games.iter().collect();
    deck_games.sort_by_key(|(name, _)| *name);
    for (deck_name, games_played) in deck_games {
        let wins = stats.deck_wins.get(deck_name).copied().unwrap_or(0);
        println!(
            "  {}: {}/{} ({:.1}%)",
            deck_name,
            wins,
            games_played,
            percent(wins, *games_played)
        );
    }

    println!("\n=== Matchup Results ===");
    let mut matchups: Vec<_> = stats.matchup_results.iter().collect();
    matchups.sort_by_key(|&(key, _)| key);
    for ((first, second), record) in matchups {
        let games = record.total();
        if games == 0 {
            continue;
        }
        if first == second {
            println!("  {first} (mirror): {games} games");
            println!(
                "    Player 1: {} ({:.1}%)",
                record.first_wins,
                percent(record.first_wins, games)
            );
            println!(
                "    Player 2: {} ({:.1}%)",
                record.second_wins,
                percent(record.second_wins, games)
            );
        } else {
            println!("  {first} vs {second}: {games} games");
            println!(
                "    {first} wins: {} ({:.1}%)",
                record.first_wins,
                percent(record.first_wins, games)
            );
            println!(
                "    {second} wins: {} ({:.1}%)",
                record.second_wins,
                percent(record.second_wins, games)
            );
        }
        if record.draws > 0 {
            println!("    Draws: {} ({:.1}%)", record.draws, percent(record.draws, games));
        }
    }
}
