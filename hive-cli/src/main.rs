//! Hive CLI - Command-line interface
//!
//! Commands:
//! - selfplay: AI vs AI games
//! - moves: list legal moves of the opening position
//! - keygen: write a Zobrist key table
//! - config: write the default search configuration

mod match_cmd;
mod tools_cmd;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hive")]
#[command(about = "Hive rules engine and alpha-beta player")]
struct Cli {
    /// Random seed for reproducible openings
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play AI vs AI games
    Selfplay(match_cmd::MatchArgs),
    /// List legal moves of the opening position
    Moves(tools_cmd::MovesArgs),
    /// Write a Zobrist key table as JSON
    Keygen(tools_cmd::KeygenArgs),
    /// Write the default search configuration as JSON
    Config(tools_cmd::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG controls verbosity)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Selfplay(args) => match_cmd::run(args, cli.seed),
        Commands::Moves(args) => tools_cmd::run_moves(args),
        Commands::Keygen(args) => tools_cmd::run_keygen(args),
        Commands::Config(args) => tools_cmd::run_config(args),
    }
}
