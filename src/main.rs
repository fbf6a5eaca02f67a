//! Auto Duel - Main Binary
//!
//! Runs single games, replays recorded games and plays tournaments

use anyhow::{bail, Context, Result};
use auto_duel::{
    config::GameConfig,
    core::PlayerId,
    game::{compute_state_hash, format_hash, reconstruct_state_at_sequence, GameLogger, GameLoop, GameState, VerbosityLevel},
    loader::{CardDatabase, DeckList, DeckLoader, GameInitializer},
    tournament,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Auto Duel - deterministic auto-battler card engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game between two decks
    Run {
        /// Deck file (.json) for player 1
        #[arg(value_name = "PLAYER1_DECK")]
        deck1: PathBuf,

        /// Deck file (.json) for player 2
        #[arg(value_name = "PLAYER2_DECK")]
        deck2: PathBuf,

        /// Card catalog file or directory
        #[arg(long, default_value = "test_decks/catalog")]
        catalog: PathBuf,

        /// Seed string; the same seed and decks always replay the same game
        #[arg(long, default_value = "duel")]
        seed: String,

        /// Rule overrides (.json); missing fields keep their defaults
        #[arg(long, value_name = "RULES_FILE")]
        rules: Option<PathBuf>,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Write the final game state (with its action log) to this file
        #[arg(long, value_name = "STATE_FILE")]
        output: Option<PathBuf>,

        /// Hold the game log in memory and print only its last N lines at the end
        #[arg(long, value_name = "N")]
        log_tail: Option<usize>,
    },

    /// Rebuild a recorded game up to a log sequence number
    Replay {
        /// Saved game state (.json) produced by `run --output`
        #[arg(value_name = "STATE_FILE")]
        state: PathBuf,

        /// Log sequence to stop at (default: the last recorded entry)
        #[arg(long)]
        sequence: Option<u64>,

        /// Write the reconstructed state to this file
        #[arg(long, value_name = "STATE_FILE")]
        output: Option<PathBuf>,
    },

    /// Play many games between randomly paired decks in parallel
    Tourney {
        /// Deck files (.json); at least two
        #[arg(value_name = "DECKS", num_args = 2.., required = true)]
        decks: Vec<PathBuf>,

        /// Card catalog file or directory
        #[arg(long, default_value = "test_decks/catalog")]
        catalog: PathBuf,

        /// Number of games to play
        #[arg(long, short = 'g', default_value_t = 100)]
        games: usize,

        /// Tournament seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Rule overrides (.json)
        #[arg(long, value_name = "RULES_FILE")]
        rules: Option<PathBuf>,
    },

    /// Run games back to back for profiling (use with cargo-flamegraph)
    Profile {
        /// Number of games to run
        #[arg(long, short = 'g', default_value_t = 1000)]
        games: usize,

        /// Random seed for deterministic profiling
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Deck file to use (uses same deck for both players)
        #[arg(long, short = 'd', default_value = "test_decks/decks/ember_rush.json")]
        deck: PathBuf,

        /// Card catalog file or directory
        #[arg(long, default_value = "test_decks/catalog")]
        catalog: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            deck1,
            deck2,
            catalog,
            seed,
            rules,
            verbosity,
            output,
            log_tail,
        } => run_game(
            &deck1,
            &deck2,
            &catalog,
            &seed,
            rules.as_deref(),
            verbosity.into(),
            output.as_deref(),
            log_tail,
        ),
        Commands::Replay {
            state,
            sequence,
            output,
        } => run_replay(&state, sequence, output.as_deref()),
        Commands::Tourney {
            decks,
            catalog,
            games,
            seed,
            rules,
        } => run_tourney(&decks, &catalog, games, seed, rules.as_deref()),
        Commands::Profile {
            games,
            seed,
            deck,
            catalog,
        } => run_profile(games, seed, &deck, &catalog),
    }
}

fn load_catalog(path: &Path) -> Result<CardDatabase> {
    let start = Instant::now();
    let db = CardDatabase::load(path).with_context(|| format!("loading catalog {}", path.display()))?;
    println!("  Loaded {} cards", db.len());
    eprintln!("  (Loading time: {:.2}ms)", start.elapsed().as_secs_f64() * 1000.0);
    Ok(db)
}

fn load_deck(path: &Path) -> Result<DeckList> {
    DeckLoader::load_from_file(path).with_context(|| format!("loading deck {}", path.display()))
}

fn load_rules(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => {
            GameConfig::load_from_file(path).with_context(|| format!("loading rules {}", path.display()))
        }
        None => Ok(GameConfig::default()),
    }
}

fn save_state(state: &GameState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("  State saved to {}", path.display());
    Ok(())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn print_summary(state: &GameState) -> Result<()> {
    println!("\n=== Game Over ===");
    match &state.result {
        Some(result) => {
            match result.winner {
                Some(winner) => println!("Winner: {winner}"),
                None => println!("Game ended in a draw"),
            }
            println!("Turns played: {}", result.total_turns);
            println!("Reason: {:?}", result.reason);
        }
        None => println!("Game still in progress (turn {}, {})", state.turn_number, state.phase),
    }

    println!("\n=== Final State ===");
    for id in PlayerId::both() {
        let player = state.player(id);
        println!(
            "  {id} ({}, {}): {} life, {} on field, {} in deck",
            player.faction,
            player.tactics,
            player.life,
            player.field.len(),
            player.deck.len()
        );
    }
    println!("  Log entries: {}", state.action_log.len());
    println!("  State hash: {}", format_hash(compute_state_hash(state)?));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_game(
    deck1_path: &Path,
    deck2_path: &Path,
    catalog_path: &Path,
    seed: &str,
    rules_path: Option<&Path>,
    verbosity: VerbosityLevel,
    output: Option<&Path>,
    log_tail: Option<usize>,
) -> Result<()> {
    println!("=== Auto Duel ===\n");

    println!("Loading deck files...");
    let deck1 = load_deck(deck1_path)?;
    let deck2 = load_deck(deck2_path)?;
    println!("  Player 1: {} ({} cards)", deck1.name, deck1.total_cards());
    println!("  Player 2: {} ({} cards)\n", deck2.name, deck2.total_cards());

    println!("Loading card database...");
    let catalog = load_catalog(catalog_path)?;
    let rules = load_rules(rules_path)?;

    println!("Initializing game...");
    println!("Using seed: {seed}\n");
    let state = GameInitializer::new(&catalog)
        .with_config(rules)
        .init_game("duel", &deck1, &deck2, seed, now_millis())?;

    let mut logger = GameLogger::with_verbosity(verbosity);
    if log_tail.is_some() {
        logger.enable_capture();
    }
    let mut game_loop = GameLoop::new().with_logger(logger);
    let finished = game_loop.execute_full_game(state)?;
    if let Some(lines) = log_tail {
        game_loop.logger_mut().flush_tail(lines);
    }

    print_summary(&finished)?;
    if let Some(path) = output {
        save_state(&finished, path)?;
    }
    Ok(())
}

fn run_replay(state_path: &Path, sequence: Option<u64>, output: Option<&Path>) -> Result<()> {
    let content =
        std::fs::read_to_string(state_path).with_context(|| format!("reading {}", state_path.display()))?;
    let recorded: GameState = serde_json::from_str(&content).context("parsing saved game state")?;

    let Some(last) = recorded.action_log.last_sequence() else {
        bail!("saved game has an empty action log");
    };
    let target = sequence.unwrap_or(last);
    if target > last {
        bail!("sequence {target} is past the end of the log ({last})");
    }

    println!("Replaying {} to sequence {target} of {last}...", recorded.game_id);
    let rebuilt = reconstruct_state_at_sequence(&recorded, target)?;
    println!(
        "  Reached turn {} {} at sequence {}",
        rebuilt.turn_number,
        rebuilt.phase,
        rebuilt.action_log.last_sequence().unwrap_or(0)
    );
    print_summary(&rebuilt)?;

    if let Some(path) = output {
        save_state(&rebuilt, path)?;
    }
    Ok(())
}

fn run_tourney(
    deck_paths: &[PathBuf],
    catalog_path: &Path,
    games: usize,
    seed: u64,
    rules_path: Option<&Path>,
) -> Result<()> {
    println!("=== Auto Duel - Tournament Mode ===\n");

    println!("Loading decks...");
    let mut decks = Vec::new();
    for path in deck_paths {
        let deck = load_deck(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| deck.name.clone());
        println!("  {}: {} cards", path.display(), deck.total_cards());
        decks.push((name, deck));
    }
    println!();

    println!("Loading card database...");
    let catalog = load_catalog(catalog_path)?;
    let rules = load_rules(rules_path)?;

    println!("\nRunning {games} games with {} decks", decks.len());
    println!("Using tournament seed: {seed}\n");

    let started = Instant::now();
    let stats = tournament::run_tourney(&decks, &catalog, &rules, games, seed)?;
    tournament::print_report(&stats, started);
    Ok(())
}

fn run_profile(iterations: usize, seed: u64, deck_path: &Path, catalog_path: &Path) -> Result<()> {
    println!("=== Auto Duel - Profiling Mode ===\n");

    println!("Loading deck...");
    let deck = load_deck(deck_path)?;
    println!("  Deck: {} cards", deck.total_cards());
    let catalog = load_catalog(catalog_path)?;

    println!("Profiling game execution...");
    println!("Running {iterations} games with seed {seed}\n");

    let initializer = GameInitializer::new(&catalog);
    let game_loop = GameLoop::silent();
    let start = Instant::now();
    let mut total_turns = 0u64;
    let mut total_actions = 0usize;

    for i in 0..iterations {
        let game_seed = format!("{seed}-{i}");
        let state = initializer.init_game("profile", &deck, &deck, &game_seed, 0)?;
        let finished = game_loop.execute_full_game(state)?;
        total_turns += finished.result.as_ref().map(|r| u64::from(r.total_turns)).unwrap_or(0);
        total_actions += finished.action_log.len();

        if (i + 1) % 100 == 0 {
            println!("Completed {} games", i + 1);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("Profiling complete! {iterations} games executed.");
    println!(
        "  {:.2} games/sec, {:.1} turns/game, {:.1} log entries/game",
        iterations as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        total_turns as f64 / iterations.max(1) as f64,
        total_actions as f64 / iterations.max(1) as f64
    );
    println!();
    println!("For CPU profiling:");
    println!("  cargo flamegraph --bin duel -- profile --games {iterations} --seed {seed}");
    Ok(())
}
