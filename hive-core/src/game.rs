//! Board state and the placement/removal primitives
//!
//! The board maps each occupied cell to a stack of pieces (bottom to top).
//! Every piece keeps the set of occupied cells around it; the set is
//! refreshed whenever occupancy changes next to it, so it always reflects
//! the board exactly.

use crate::board::{Hex, Neighbors};
use crate::error::HiveError;
use crate::pieces::{Color, PieceId, Species, PIECE_COUNT};
use crate::zobrist::KeyTable;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    WhiteWins,
    BlackWins,
    /// Both queens were surrounded by the same move
    Draw,
}

/// A placement (piece in reserve) or a relocation (piece on the board)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub piece: PieceId,
    pub to: Hex,
}

impl Move {
    pub fn new(piece: PieceId, to: Hex) -> Self {
        Self { piece, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.piece, self.to)
    }
}

/// Token returned by [`Hive::apply`]; feeding it to [`Hive::undo`] restores
/// the board exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "an applied move must be undone with Hive::undo"]
pub struct Undo {
    piece: PieceId,
    from: Option<Hex>,
}

/// Mutable state of one piece
#[derive(Clone, Copy, Debug)]
pub struct PieceState {
    /// `None` while the piece is in reserve
    pub position: Option<Hex>,
    /// Topmost occupant of its cell
    pub is_top: bool,
    /// Occupied cells adjacent to the piece's cell
    pub neighbors: Neighbors,
    /// Cached by the last generation pass that looked at this piece
    pub is_pinned: bool,
}

impl PieceState {
    const OFF_BOARD: PieceState = PieceState {
        position: None,
        is_top: false,
        neighbors: Neighbors::NONE,
        is_pinned: false,
    };

    pub fn on_board(&self) -> bool {
        self.position.is_some()
    }

    pub fn is_surrounded(&self) -> bool {
        self.neighbors.count() == 6
    }

    pub fn neighbor_cells(&self) -> impl Iterator<Item = Hex> {
        let neighbors = self.neighbors;
        self.position
            .into_iter()
            .flat_map(move |cell| neighbors.cells(cell))
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Complete position: stacks, reserves and the running fingerprint.
/// Clone to search on an independent copy.
#[derive(Clone, Debug)]
pub struct Hive {
    /// Occupied cell -> stack, bottom first
    stacks: FxHashMap<Hex, Vec<PieceId>>,
    /// Indexed by `PieceId::index`
    pieces: [PieceState; PIECE_COUNT],
    keys: Arc<KeyTable>,
    hash: u64,
    /// Covers buried pieces too, so reserves are implied
    position_key: u64,
}

impl Default for Hive {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Hive {
    /// Structural equality: stacks, placements and neighbor sets. Cached
    /// pin flags are not part of the position.
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.position_key == other.position_key
            && self.stacks == other.stacks
            && self.pieces.iter().zip(other.pieces.iter()).all(|(a, b)| {
                a.position == b.position && a.is_top == b.is_top && a.neighbors == b.neighbors
            })
    }
}

impl Hive {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board, both reserves full
    pub fn new() -> Self {
        Self::with_keys(KeyTable::shared_default())
    }

    pub fn with_keys(keys: Arc<KeyTable>) -> Self {
        Self {
            stacks: FxHashMap::default(),
            pieces: [PieceState::OFF_BOARD; PIECE_COUNT],
            keys,
            hash: 0,
            position_key: 0,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn piece(&self, id: PieceId) -> &PieceState {
        &self.pieces[id.index()]
    }

    pub fn position(&self, id: PieceId) -> Option<Hex> {
        self.pieces[id.index()].position
    }

    /// Topmost piece at a cell
    pub fn top(&self, cell: Hex) -> Option<PieceId> {
        self.stacks.get(&cell).and_then(|stack| stack.last().copied())
    }

    /// Pieces at a cell, bottom first
    pub fn stack(&self, cell: Hex) -> &[PieceId] {
        self.stacks.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn height(&self, cell: Hex) -> usize {
        self.stack(cell).len()
    }

    pub fn is_occupied(&self, cell: Hex) -> bool {
        self.stacks.contains_key(&cell)
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = Hex> + '_ {
        self.stacks.keys().copied()
    }

    pub fn occupied_count(&self) -> usize {
        self.stacks.len()
    }

    pub fn pieces_on_board(&self) -> impl Iterator<Item = PieceId> + '_ {
        (0..PIECE_COUNT)
            .map(PieceId::from_index)
            .filter(|&id| self.pieces[id.index()].on_board())
    }

    pub fn placed_count(&self, color: Color) -> usize {
        PieceId::all(color).filter(|&id| self.piece(id).on_board()).count()
    }

    /// Pieces of `color` still in reserve
    pub fn reserve(&self, color: Color) -> impl Iterator<Item = PieceId> + '_ {
        PieceId::all(color).filter(|&id| !self.piece(id).on_board())
    }

    /// Position fingerprint: XOR of the key of every (cell, top piece)
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Fingerprint of the whole position: every piece of every stack at its
    /// level. Unlike [`Hive::hash`] it tells apart boards that differ only
    /// under a beetle.
    pub fn position_key(&self) -> u64 {
        self.position_key
    }

    pub fn keys(&self) -> &Arc<KeyTable> {
        &self.keys
    }

    /// Occupied adjacent directions of a cell
    pub fn occupied_mask(&self, cell: Hex) -> Neighbors {
        (0..6)
            .filter(|&d| self.is_occupied(cell.neighbor(d)))
            .fold(Neighbors::NONE, Neighbors::with)
    }

    // ========================================================================
    // PLACEMENT / REMOVAL
    // ========================================================================

    /// Put `piece` on top of `to`. Only a beetle may land on an occupied cell.
    fn place(&mut self, piece: PieceId, to: Hex) {
        debug_assert!(!self.piece(piece).on_board(), "{piece} is already on the board");
        let stack = self.stacks.entry(to).or_default();
        if let Some(&below) = stack.last() {
            assert_eq!(
                piece.species(),
                Species::Beetle,
                "{piece} cannot climb onto {below} at {to}"
            );
            self.pieces[below.index()].is_top = false;
            self.hash ^= self.keys.key(to, below);
        }
        self.position_key ^= self.keys.stacked_key(to, piece, stack.len());
        stack.push(piece);
        self.hash ^= self.keys.key(to, piece);

        let state = &mut self.pieces[piece.index()];
        state.position = Some(to);
        state.is_top = true;
        self.refresh_neighbors_around(to);
    }

    /// Pop `piece` off its cell and return it to the off-board state
    fn remove(&mut self, piece: PieceId) {
        let cell = self
            .position(piece)
            .unwrap_or_else(|| panic!("{piece} is not on the board"));
        let stack = self.stacks.get_mut(&cell).expect("occupied cell has a stack");
        assert_eq!(stack.pop(), Some(piece), "{piece} is not on top of {cell}");
        self.hash ^= self.keys.key(cell, piece);
        self.position_key ^= self.keys.stacked_key(cell, piece, stack.len());

        match stack.last().copied() {
            Some(new_top) => {
                self.pieces[new_top.index()].is_top = true;
                self.hash ^= self.keys.key(cell, new_top);
            }
            None => {
                self.stacks.remove(&cell);
            }
        }

        self.pieces[piece.index()] = PieceState::OFF_BOARD;
        self.refresh_neighbors_around(cell);
    }

    /// Recompute the neighbor sets of every piece at `cell` and around it
    fn refresh_neighbors_around(&mut self, cell: Hex) {
        for c in std::iter::once(cell).chain(cell.neighbors()) {
            let mask = self.occupied_mask(c);
            if let Some(stack) = self.stacks.get(&c) {
                for id in stack {
                    self.pieces[id.index()].neighbors = mask;
                }
            }
        }
    }

    /// The single mutation primitive: lift `piece` if it is on the board,
    /// then put it on `to`. `None` sends it back to reserve.
    pub fn move_piece(&mut self, piece: PieceId, to: Option<Hex>) {
        if self.piece(piece).on_board() {
            self.remove(piece);
        }
        if let Some(to) = to {
            self.place(piece, to);
        }
    }

    /// Move `piece` to `to`, run `f` on the speculative board, then put the
    /// piece back where it was. The board is restored on every path out of `f`.
    pub fn probe<R>(&mut self, piece: PieceId, to: Option<Hex>, f: impl FnOnce(&mut Self) -> R) -> R {
        let from = self.position(piece);
        self.move_piece(piece, to);
        let result = f(self);
        self.move_piece(piece, from);
        result
    }

    pub(crate) fn set_pinned(&mut self, piece: PieceId, pinned: bool) {
        self.pieces[piece.index()].is_pinned = pinned;
    }

    // ========================================================================
    // APPLY / UNDO
    // ========================================================================

    /// Apply a move without checking legality
    pub fn apply(&mut self, mv: Move) -> Undo {
        let undo = Undo {
            piece: mv.piece,
            from: self.position(mv.piece),
        };
        self.move_piece(mv.piece, Some(mv.to));
        undo
    }

    pub fn undo(&mut self, undo: Undo) {
        self.move_piece(undo.piece, undo.from);
    }

    /// Apply a move for good; nothing will undo it
    pub fn commit(&mut self, mv: Move) {
        self.move_piece(mv.piece, Some(mv.to));
    }

    /// Commit a move after checking it against the generated legal moves
    pub fn play(&mut self, mv: Move) -> Result<(), HiveError> {
        if !self.generate_moves(mv.piece.color()).contains(&mv) {
            return Err(HiveError::IllegalMove {
                piece: mv.piece,
                to: mv.to,
            });
        }
        self.commit(mv);
        tracing::debug!(%mv, hash = self.hash, "committed move");
        Ok(())
    }

    // ========================================================================
    // RESULT
    // ========================================================================

    pub fn is_queen_surrounded(&self, color: Color) -> bool {
        self.piece(PieceId::queen(color)).is_surrounded()
    }

    pub fn result(&self) -> GameResult {
        match (
            self.is_queen_surrounded(Color::White),
            self.is_queen_surrounded(Color::Black),
        ) {
            (true, true) => GameResult::Draw,
            (true, false) => GameResult::BlackWins,
            (false, true) => GameResult::WhiteWins,
            (false, false) => GameResult::Ongoing,
        }
    }

    /// True iff either queen is surrounded
    pub fn is_game_over(&self) -> bool {
        self.result() != GameResult::Ongoing
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ORIGIN;

    fn id(token: &str) -> PieceId {
        token.parse().unwrap()
    }

    /// wQ1 at origin, bQ1 to its east, wB1 to the west
    fn simple_hive() -> Hive {
        let mut hive = Hive::new();
        hive.move_piece(id("wQ1"), Some(ORIGIN));
        hive.move_piece(id("bQ1"), Some(Hex::new(2, 0)));
        hive.move_piece(id("wB1"), Some(Hex::new(-2, 0)));
        hive
    }

    #[test]
    fn test_new_hive_is_empty() {
        let hive = Hive::new();
        assert!(hive.is_empty());
        assert_eq!(hive.hash(), 0);
        assert_eq!(hive.reserve(Color::White).count(), 11);
        assert_eq!(hive.result(), GameResult::Ongoing);
    }

    #[test]
    fn test_place_updates_neighbors() {
        let hive = simple_hive();
        let queen = hive.piece(id("wQ1"));
        assert!(queen.is_top);
        assert_eq!(queen.neighbors.count(), 2);
        let cells: Vec<_> = queen.neighbor_cells().collect();
        assert!(cells.contains(&Hex::new(2, 0)));
        assert!(cells.contains(&Hex::new(-2, 0)));
        assert_eq!(hive.piece(id("bQ1")).neighbors.count(), 1);
    }

    #[test]
    fn test_beetle_stacking() {
        let mut hive = simple_hive();
        hive.move_piece(id("wB1"), Some(ORIGIN));
        assert_eq!(hive.stack(ORIGIN), &[id("wQ1"), id("wB1")]);
        assert!(!hive.piece(id("wQ1")).is_top);
        assert!(hive.piece(id("wB1")).is_top);
        assert!(!hive.is_occupied(Hex::new(-2, 0)));
        assert_eq!(hive.piece(id("bQ1")).neighbors.count(), 1);
        assert_eq!(hive.piece(id("wB1")).neighbors.count(), 1);

        hive.move_piece(id("wB1"), Some(Hex::new(-2, 0)));
        assert!(hive.piece(id("wQ1")).is_top);
        assert_eq!(hive.height(ORIGIN), 1);
    }

    #[test]
    #[should_panic]
    fn test_only_beetles_climb() {
        let mut hive = simple_hive();
        hive.move_piece(id("wA1"), Some(ORIGIN));
    }

    #[test]
    fn test_remove_to_reserve() {
        let mut hive = simple_hive();
        hive.move_piece(id("wB1"), None);
        let beetle = hive.piece(id("wB1"));
        assert!(!beetle.on_board());
        assert!(beetle.neighbors.is_empty());
        assert_eq!(hive.piece(id("wQ1")).neighbors.count(), 1);
    }

    #[test]
    fn test_apply_undo_restores_board() {
        let mut hive = simple_hive();
        let before = hive.clone();
        let undo = hive.apply(Move::new(id("wB1"), ORIGIN));
        assert_ne!(hive, before);
        hive.undo(undo);
        assert_eq!(hive, before);

        let undo = hive.apply(Move::new(id("bA1"), Hex::new(3, 1)));
        hive.undo(undo);
        assert_eq!(hive, before);
    }

    #[test]
    fn test_hash_matches_fold() {
        let mut hive = simple_hive();
        assert_eq!(hive.hash(), hive.keys().hash_board(&hive));
        hive.move_piece(id("wB1"), Some(ORIGIN));
        assert_eq!(hive.hash(), hive.keys().hash_board(&hive));
        hive.move_piece(id("wB1"), Some(Hex::new(-1, 1)));
        assert_eq!(hive.hash(), hive.keys().hash_board(&hive));
    }

    #[test]
    fn test_position_key_sees_buried_pieces() {
        // wB1 covering bQ1 (bA1 in reserve) vs wB1 covering bA1 (bQ1 in reserve)
        let mut on_queen = simple_hive();
        on_queen.move_piece(id("wB1"), Some(Hex::new(2, 0)));

        let mut on_ant = Hive::new();
        on_ant.move_piece(id("wQ1"), Some(ORIGIN));
        on_ant.move_piece(id("bA1"), Some(Hex::new(2, 0)));
        on_ant.move_piece(id("wB1"), Some(Hex::new(2, 0)));

        // the top-only hash cannot tell them apart
        assert_eq!(on_queen.hash(), on_ant.hash());
        assert_ne!(on_queen, on_ant);
        assert_ne!(on_queen.position_key(), on_ant.position_key());
    }

    #[test]
    fn test_position_key_matches_fold() {
        let mut hive = simple_hive();
        assert_eq!(hive.position_key(), hive.keys().position_key(&hive));
        hive.move_piece(id("wB1"), Some(ORIGIN));
        assert_eq!(hive.position_key(), hive.keys().position_key(&hive));
        hive.move_piece(id("bB1"), Some(ORIGIN));
        assert_eq!(hive.stack(ORIGIN), &[id("wQ1"), id("wB1"), id("bB1")]);
        assert_eq!(hive.position_key(), hive.keys().position_key(&hive));
        hive.move_piece(id("bB1"), Some(Hex::new(4, 0)));
        hive.move_piece(id("wB1"), None);
        assert_eq!(hive.position_key(), hive.keys().position_key(&hive));
    }

    #[test]
    fn test_commit_matches_apply() {
        let mut committed = simple_hive();
        committed.commit(Move::new(id("wB1"), ORIGIN));
        let mut applied = simple_hive();
        let _undo = applied.apply(Move::new(id("wB1"), ORIGIN));
        assert_eq!(committed, applied);
        assert_eq!(committed.top(ORIGIN), Some(id("wB1")));
    }

    #[test]
    fn test_probe_restores() {
        let mut hive = simple_hive();
        let before = hive.clone();
        let occupied = hive.probe(id("wB1"), Some(Hex::new(-1, -1)), |h| h.is_occupied(Hex::new(-1, -1)));
        assert!(occupied);
        assert_eq!(hive, before);
    }

    #[test]
    fn test_queen_surrounded_result() {
        let mut hive = Hive::new();
        hive.move_piece(id("bQ1"), Some(ORIGIN));
        let white: Vec<_> = PieceId::all(Color::White).take(6).collect();
        for (piece, cell) in white.into_iter().zip(ORIGIN.neighbors()) {
            hive.move_piece(piece, Some(cell));
        }
        assert!(hive.is_queen_surrounded(Color::Black));
        assert_eq!(hive.result(), GameResult::WhiteWins);
        assert!(hive.is_game_over());
    }
}
