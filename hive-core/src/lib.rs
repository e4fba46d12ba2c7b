//! Hive Core - Rules engine and AI
//!
//! This crate provides the core game logic for Hive:
//! - Board geometry (hex lattice in doubled coordinates)
//! - Piece identities and reserves
//! - Board state with beetle stacks and neighbor bookkeeping
//! - One-hive and freedom-of-movement validation
//! - Per-species move generation
//! - Zobrist fingerprints and a transposition table
//! - Position evaluation and alpha-beta search

pub mod board;
pub mod pieces;
pub mod error;
pub mod game;
pub mod rules;
pub mod movegen;
pub mod zobrist;
pub mod tt;
pub mod eval;
pub mod ai;
pub mod config;

// Re-exports for convenient access
pub use board::{Hex, Neighbors, DIRECTIONS, ORIGIN};
pub use pieces::{Color, PieceId, Species, PIECES_PER_COLOR, PIECE_COUNT};
pub use error::HiveError;
pub use game::{GameResult, Hive, Move, PieceState, Undo};
pub use zobrist::KeyTable;
pub use tt::{TranspositionTable, TtStats};
pub use eval::{evaluate, Heuristics, WIN_VALUE};
pub use ai::{AlphaBetaAI, SearchResult};
pub use config::SearchConfig;
