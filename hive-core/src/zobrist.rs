//! Zobrist keys for position fingerprints
//!
//! Keys are addressed by `(cell, piece)`. The table covers a window of cells
//! around the origin; a hive that crawls outside the window still gets a
//! stable key per cell by mixing a per-piece overflow key with the
//! coordinates.

use crate::board::Hex;
use crate::error::HiveError;
use crate::game::Hive;
use crate::pieces::{Color, PieceId, PIECE_COUNT};
use anyhow::Context;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Half-width of the keyed window in x (doubled coordinates)
const WINDOW_X: i16 = 48;
/// Half-height of the keyed window in y
const WINDOW_Y: i16 = 24;
/// Lattice cells inside the window (only `x + y` even cells exist)
const WINDOW_CELLS: usize = (2 * WINDOW_X as usize) * (2 * WINDOW_Y as usize) / 2;

/// Length of a complete key table: window keys, overflow keys, side key
pub const KEY_TABLE_LEN: usize = WINDOW_CELLS * PIECE_COUNT + PIECE_COUNT + 1;

/// Seed of the built-in table
pub const DEFAULT_KEY_SEED: u64 = 0x4849_5645;

/// Immutable key table, shared between boards
#[derive(Clone, PartialEq, Eq)]
pub struct KeyTable {
    keys: Vec<u64>,
}

impl KeyTable {
    /// Generate a deterministic table from a seed
    pub fn seeded(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let keys = (0..KEY_TABLE_LEN).map(|_| rng.gen::<u64>()).collect();
        Self { keys }
    }

    /// Wrap externally generated keys
    pub fn from_keys(keys: Vec<u64>) -> Result<Self, HiveError> {
        if keys.len() != KEY_TABLE_LEN {
            return Err(HiveError::KeyTableSize {
                expected: KEY_TABLE_LEN,
                found: keys.len(),
            });
        }
        Ok(Self { keys })
    }

    /// Table used when the caller supplies none
    pub fn shared_default() -> Arc<KeyTable> {
        static DEFAULT: OnceLock<Arc<KeyTable>> = OnceLock::new();
        DEFAULT
            .get_or_init(|| Arc::new(KeyTable::seeded(DEFAULT_KEY_SEED)))
            .clone()
    }

    /// Load from a JSON array of keys
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read key table: {}", path.display()))?;
        let keys: Vec<u64> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse key table: {}", path.display()))?;
        Ok(Self::from_keys(keys)?)
    }

    /// Save as a JSON array of keys
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string(&self.keys)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write key table: {}", path.display()))?;
        Ok(())
    }

    /// Key of `piece` standing on top of `cell`
    pub fn key(&self, cell: Hex, piece: PieceId) -> u64 {
        match window_index(cell) {
            Some(slot) => self.keys[slot * PIECE_COUNT + piece.index()],
            None => {
                let overflow = self.keys[WINDOW_CELLS * PIECE_COUNT + piece.index()];
                let packed = ((cell.x as u16 as u64) << 16) | cell.y as u16 as u64;
                splitmix64(overflow ^ packed)
            }
        }
    }

    /// Key of `piece` at stack `level` of `cell` (0 is the ground). Ground
    /// keys are the plain cell keys; higher levels are remixed.
    pub fn stacked_key(&self, cell: Hex, piece: PieceId, level: usize) -> u64 {
        let key = self.key(cell, piece);
        if level == 0 {
            key
        } else {
            splitmix64(key ^ (level as u64).wrapping_mul(0xD6E8_FEB8_6659_FD93))
        }
    }

    /// Key folded in when `color` is to move
    pub fn side_key(&self, color: Color) -> u64 {
        match color {
            Color::White => 0,
            Color::Black => self.keys[KEY_TABLE_LEN - 1],
        }
    }

    /// Recompute a board fingerprint from scratch
    pub fn hash_board(&self, hive: &Hive) -> u64 {
        hive.occupied_cells()
            .filter_map(|cell| hive.top(cell).map(|piece| self.key(cell, piece)))
            .fold(0, |acc, key| acc ^ key)
    }

    /// Recompute a full-position key from scratch: every piece of every
    /// stack at its level
    pub fn position_key(&self, hive: &Hive) -> u64 {
        hive.occupied_cells()
            .flat_map(|cell| {
                hive.stack(cell)
                    .iter()
                    .enumerate()
                    .map(move |(level, &piece)| self.stacked_key(cell, piece, level))
            })
            .fold(0, |acc, key| acc ^ key)
    }
}

impl fmt::Debug for KeyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyTable").field("len", &self.keys.len()).finish()
    }
}

fn window_index(cell: Hex) -> Option<usize> {
    if !(-WINDOW_X..WINDOW_X).contains(&cell.x) || !(-WINDOW_Y..WINDOW_Y).contains(&cell.y) {
        return None;
    }
    let col = (cell.x + WINDOW_X) as usize;
    let row = (cell.y + WINDOW_Y) as usize;
    // a row only holds x of one parity, so halving keeps cells distinct
    Some((row * 2 * WINDOW_X as usize + col) / 2)
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ORIGIN;

    #[test]
    fn test_seeded_is_deterministic() {
        let a = KeyTable::seeded(7);
        let b = KeyTable::seeded(7);
        let piece = PieceId::queen(Color::White);
        assert_eq!(a.key(ORIGIN, piece), b.key(ORIGIN, piece));
        assert_ne!(a.key(ORIGIN, piece), KeyTable::seeded(8).key(ORIGIN, piece));
    }

    #[test]
    fn test_window_cells_are_distinct() {
        let table = KeyTable::seeded(1);
        let piece = PieceId::from_index(3);
        let a = table.key(Hex::new(2, 0), piece);
        let b = table.key(Hex::new(1, 1), piece);
        let c = table.key(Hex::new(-47, -23), piece);
        let d = table.key(Hex::new(46, 22), piece);
        assert!(a != b && b != c && c != d && a != d);
    }

    #[test]
    fn test_window_index_bounds() {
        assert_eq!(window_index(Hex::new(-WINDOW_X, -WINDOW_Y)), Some(0));
        assert_eq!(
            window_index(Hex::new(WINDOW_X - 1, WINDOW_Y - 1)),
            Some(WINDOW_CELLS - 1)
        );
        assert_eq!(window_index(Hex::new(WINDOW_X, 0)), None);
    }

    #[test]
    fn test_overflow_cells_have_keys() {
        let table = KeyTable::seeded(1);
        let piece = PieceId::from_index(0);
        let far = Hex::new(200, 40);
        assert_eq!(table.key(far, piece), table.key(far, piece));
        assert_ne!(table.key(far, piece), table.key(Hex::new(202, 40), piece));
    }

    #[test]
    fn test_stacked_keys_differ_by_level() {
        let table = KeyTable::seeded(3);
        let beetle = PieceId::from_index(6);
        assert_eq!(table.stacked_key(ORIGIN, beetle, 0), table.key(ORIGIN, beetle));
        let levels: Vec<u64> = (0..5).map(|l| table.stacked_key(ORIGIN, beetle, l)).collect();
        for (i, a) in levels.iter().enumerate() {
            assert!(levels[i + 1..].iter().all(|b| b != a));
        }
    }

    #[test]
    fn test_from_keys_checks_length() {
        assert!(KeyTable::from_keys(vec![0; 3]).is_err());
        assert!(KeyTable::from_keys(vec![0; KEY_TABLE_LEN]).is_ok());
    }
}
