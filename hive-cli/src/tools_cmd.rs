//! Small utility commands: move listing, key generation, config export

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};

use hive_core::zobrist::DEFAULT_KEY_SEED;
use hive_core::{Color, Hive, KeyTable, SearchConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ColorArg {
    White,
    Black,
}

impl From<ColorArg> for Color {
    fn from(color: ColorArg) -> Self {
        match color {
            ColorArg::White => Color::White,
            ColorArg::Black => Color::Black,
        }
    }
}

#[derive(Args)]
pub struct MovesArgs {
    /// Side whose moves are listed
    #[arg(long, value_enum, default_value = "white")]
    pub color: ColorArg,
}

#[derive(Args)]
pub struct KeygenArgs {
    /// Seed for the key generator
    #[arg(long, default_value_t = DEFAULT_KEY_SEED)]
    pub key_seed: u64,

    /// Output JSON file
    #[arg(long, short, value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Output JSON file
    #[arg(long, short, value_name = "FILE")]
    pub output: PathBuf,
}

/// List the legal moves of the opening position
pub fn run_moves(args: MovesArgs) -> Result<()> {
    let color = Color::from(args.color);
    let mut hive = Hive::new();
    let moves = hive.generate_moves(color);

    println!("{} legal moves for {:?}:", moves.len(), color);
    for mv in &moves {
        println!("  {}", mv);
    }
    Ok(())
}

pub fn run_keygen(args: KeygenArgs) -> Result<()> {
    let table = KeyTable::seeded(args.key_seed);
    table.save(&args.output)?;
    tracing::info!("Wrote key table (seed {}) to {}", args.key_seed, args.output.display());
    Ok(())
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    SearchConfig::default().save(&args.output)?;
    tracing::info!("Wrote default config to {}", args.output.display());
    Ok(())
}
