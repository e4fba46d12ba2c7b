//! Selfplay command - the alpha-beta player against itself
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_search_config(), load_key_table(), play_match(), report_results()
//! - Level 3: play_single_game(), play_random_opening(), compute_match_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hive_core::zobrist::DEFAULT_KEY_SEED;
use hive_core::{AlphaBetaAI, Color, GameResult, Hive, KeyTable, Move, SearchConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Number of games to play
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Search depth in plies (overrides the config file)
    #[arg(long)]
    pub depth: Option<u32>,

    /// Transposition table buckets (overrides the config file)
    #[arg(long)]
    pub tt_size: Option<usize>,

    /// Seed of the generated key table (overrides the config file)
    #[arg(long)]
    pub key_seed: Option<u64>,

    /// Maximum plies per game, passes included
    #[arg(long, default_value = "200")]
    pub max_plies: usize,

    /// Random legal plies played before the search takes over
    #[arg(long, default_value = "0")]
    pub random_openings: usize,

    /// Search configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Key table JSON file (replaces the generated table)
    #[arg(long, value_name = "FILE")]
    pub keys: Option<PathBuf>,

    /// Print every ply of every game
    #[arg(long)]
    pub verbose: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    result: GameResult,
    /// Plies taken, passes and opening plies included
    plies: usize,
    opening_plies: usize,
    /// `None` is a pass; plies alternate starting with white
    moves: Vec<Option<Move>>,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    white_wins: usize,
    black_wins: usize,
    draws: usize,
    /// Games stopped by the ply cap or by two passes in a row
    unfinished: usize,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run selfplay command
///
/// This function reads like a table of contents:
/// 1. Resolve the search configuration and key table
/// 2. Play the games
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let config = load_search_config(&args)?;
    let keys = load_key_table(&args, &config)?;

    tracing::info!(
        "Starting selfplay: {} games, depth={}, max_plies={}, random_openings={}",
        args.games,
        config.depth,
        args.max_plies,
        args.random_openings
    );

    let results = play_match(&config, &keys, &args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Config file (or defaults) with command-line overrides applied
fn load_search_config(args: &MatchArgs) -> Result<SearchConfig> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };

    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if let Some(tt_size) = args.tt_size {
        config.tt_size = tt_size;
    }
    if let Some(key_seed) = args.key_seed {
        config.key_seed = key_seed;
    }

    Ok(config)
}

/// Key table from disk, or generated from the configured seed
fn load_key_table(args: &MatchArgs, config: &SearchConfig) -> Result<Arc<KeyTable>> {
    let keys = match &args.keys {
        Some(path) => Arc::new(KeyTable::load(path)?),
        None if config.key_seed == DEFAULT_KEY_SEED => KeyTable::shared_default(),
        None => Arc::new(KeyTable::seeded(config.key_seed)),
    };
    Ok(keys)
}

/// Play all games in the match
fn play_match(
    config: &SearchConfig,
    keys: &Arc<KeyTable>,
    args: &MatchArgs,
    seed: Option<u64>,
) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        let record = play_single_game(config, keys, game_num + 1, args, &mut rng)?;

        tracing::info!(
            "Game {}: {:?} ({} plies)",
            record.game_number,
            record.result,
            record.plies
        );
        if args.verbose {
            print_game_moves(&record);
        }

        games.push(record);
    }

    let results = compute_match_statistics(games);
    Ok(results)
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game: random opening plies, then search for both sides
fn play_single_game(
    config: &SearchConfig,
    keys: &Arc<KeyTable>,
    game_number: usize,
    args: &MatchArgs,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut hive = Hive::with_keys(keys.clone());
    let opening_plies = args.random_openings.min(args.max_plies);
    let mut moves = play_random_opening(&mut hive, opening_plies, rng)?;

    let to_move = if moves.len() % 2 == 0 {
        Color::White
    } else {
        Color::Black
    };
    let mut ai = AlphaBetaAI::new(config.clone());
    let (final_state, searched) = ai.play_game(hive, to_move, args.max_plies - moves.len());
    moves.extend(searched);

    let stats = ai.tt_stats();
    tracing::debug!(
        game_number,
        tt_probes = stats.probes,
        tt_hits = stats.hits,
        tt_used = stats.used,
        "transposition table after game"
    );

    Ok(GameRecord {
        game_number,
        result: final_state.result(),
        plies: moves.len(),
        opening_plies,
        moves,
    })
}

/// Play `plies` uniformly random legal plies, white first
fn play_random_opening(hive: &mut Hive, plies: usize, rng: &mut ChaCha8Rng) -> Result<Vec<Option<Move>>> {
    let mut moves = Vec::with_capacity(plies);
    let mut side = Color::White;

    for _ in 0..plies {
        if hive.is_game_over() {
            break;
        }
        let legal = hive.generate_moves(side);
        if legal.is_empty() {
            moves.push(None);
        } else {
            let mv = legal[rng.gen_range(0..legal.len())];
            hive.play(mv)?;
            moves.push(Some(mv));
        }
        side = side.opponent();
    }

    Ok(moves)
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |result: GameResult| games.iter().filter(|g| g.result == result).count();
    let white_wins = count(GameResult::WhiteWins);
    let black_wins = count(GameResult::BlackWins);
    let draws = count(GameResult::Draw);
    let unfinished = count(GameResult::Ongoing);

    let total_plies: usize = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    MatchResults {
        games,
        white_wins,
        black_wins,
        draws,
        unfinished,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn format_ply(mv: Option<Move>) -> String {
    match mv {
        Some(mv) => mv.to_string(),
        None => "pass".to_string(),
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print every ply of one game
fn print_game_moves(record: &GameRecord) {
    println!("Game {}:", record.game_number);
    for (ply, mv) in record.moves.iter().enumerate() {
        let marker = if ply < record.opening_plies { " (random)" } else { "" };
        println!("  {:>3}. {}{}", ply + 1, format_ply(*mv), marker);
    }
    println!("  Result: {:?}", record.result);
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: GameResult,
        plies: usize,
        opening_plies: usize,
        moves: Vec<String>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        white_wins: usize,
        black_wins: usize,
        draws: usize,
        unfinished: usize,
        avg_plies: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        white_wins: results.white_wins,
        black_wins: results.black_wins,
        draws: results.draws,
        unfinished: results.unfinished,
        avg_plies: results.avg_plies,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: g.result,
                plies: g.plies,
                opening_plies: g.opening_plies,
                moves: g.moves.iter().map(|&mv| format_ply(mv)).collect(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Selfplay Results ===");
    println!("Total games: {}", total);
    println!(
        "White wins:  {} ({:.1}%)",
        results.white_wins,
        percent(results.white_wins, total)
    );
    println!(
        "Black wins:  {} ({:.1}%)",
        results.black_wins,
        percent(results.black_wins, total)
    );
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!(
        "Unfinished:  {} ({:.1}%)",
        results.unfinished,
        percent(results.unfinished, total)
    );
    println!("Avg plies:   {:.1}", results.avg_plies);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {:?} in {} plies",
            game.game_number, game.result, game.plies
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
