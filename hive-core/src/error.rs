//! Recoverable errors surfaced to callers of the engine

use crate::board::Hex;
use crate::pieces::PieceId;

#[derive(Debug, thiserror::Error)]
pub enum HiveError {
    #[error("unknown piece token: {0:?}")]
    UnknownPiece(String),

    #[error("key table has {found} keys, expected {expected}")]
    KeyTableSize { expected: usize, found: usize },

    #[error("illegal move: {piece} to {to}")]
    IllegalMove { piece: PieceId, to: Hex },
}
