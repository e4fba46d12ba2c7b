//! Fixed-depth alpha-beta search on the shared board
//!
//! Every node applies a move, recurses, and undoes it before trying the
//! next one, so exactly one path of the tree is on the board at any time.

use crate::config::SearchConfig;
use crate::eval::{evaluate, WIN_VALUE};
use crate::game::{Hive, Move};
use crate::pieces::Color;
use crate::tt::{Bound, Entry, TranspositionTable, TtStats};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Root window bound; larger than any evaluation
pub const SCORE_INF: i32 = 10 * WIN_VALUE;

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Outcome of one root search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` when the side to move has no legal move
    pub best: Option<Move>,
    pub score: i32,
    pub nodes: u64,
}

/// Alpha-Beta AI player
pub struct AlphaBetaAI {
    pub config: SearchConfig,
    tt: TranspositionTable,
    nodes: u64,
}

impl AlphaBetaAI {
    pub fn new(config: SearchConfig) -> Self {
        let tt = TranspositionTable::new(config.tt_size);
        Self { config, tt, nodes: 0 }
    }

    pub fn with_depth(depth: u32) -> Self {
        Self::new(SearchConfig::with_depth(depth))
    }

    /// Search the position for `side`. The board is left exactly as it was.
    pub fn search(&mut self, hive: &mut Hive, side: Color) -> SearchResult {
        self.nodes = 0;
        let (score, best) = self.negamax(hive, side, 0, -SCORE_INF, SCORE_INF, None);
        let stats = self.tt.stats();
        tracing::debug!(
            ?side,
            depth = self.config.depth,
            score,
            nodes = self.nodes,
            tt_hits = stats.hits,
            tt_used = stats.used,
            best = %best.map(|m| m.to_string()).unwrap_or_else(|| "pass".into()),
            "search finished"
        );
        SearchResult {
            best,
            score,
            nodes: self.nodes,
        }
    }

    /// Get best move for `side`
    pub fn best_move(&mut self, hive: &mut Hive, side: Color) -> Option<Move> {
        self.search(hive, side).best
    }

    /// Search, then commit the chosen move to the board
    pub fn play_turn(&mut self, hive: &mut Hive, side: Color) -> Option<Move> {
        let mv = self.best_move(hive, side)?;
        hive.commit(mv);
        tracing::debug!(%mv, "applied search move");
        Some(mv)
    }

    /// Play until a queen falls, both sides pass in a row, or `max_plies`
    /// turns have been taken. History entries alternate colors starting
    /// with `to_move`; `None` is a pass.
    pub fn play_game(&mut self, initial: Hive, to_move: Color, max_plies: usize) -> (Hive, Vec<Option<Move>>) {
        let mut hive = initial;
        let mut history = Vec::new();
        let mut side = to_move;
        let mut passes = 0;

        while !hive.is_game_over() && history.len() < max_plies {
            let mv = self.play_turn(&mut hive, side);
            history.push(mv);
            if mv.is_some() {
                passes = 0;
            } else {
                passes += 1;
                if passes >= 2 {
                    break;
                }
            }
            side = side.opponent();
        }

        (hive, history)
    }

    /// Evaluate a position for `side`
    pub fn evaluate(&self, hive: &mut Hive, side: Color) -> i32 {
        evaluate(hive, side, &self.config.heuristics)
    }

    pub fn tt_stats(&self) -> TtStats {
        self.tt.stats()
    }

    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }
}

// ============================================================================
// NEGAMAX WITH ALPHA-BETA
// ============================================================================

impl AlphaBetaAI {
    /// Returns the score for `side` and the move chosen at this node (or
    /// the move that led here, at a leaf).
    fn negamax(
        &mut self,
        hive: &mut Hive,
        side: Color,
        ply: u32,
        mut alpha: i32,
        beta: i32,
        led_here: Option<Move>,
    ) -> (i32, Option<Move>) {
        self.nodes += 1;
        let remaining = self.config.depth.saturating_sub(ply);
        let key = hive.position_key() ^ hive.keys().side_key(side);

        // Transposition lookup; the root always searches to get a move
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(key) {
            tt_move = entry.best;
            if ply > 0 && entry.depth >= remaining {
                let reply = entry.best.or(led_here);
                match entry.bound {
                    Bound::Exact => return (entry.score.clamp(alpha, beta), reply),
                    Bound::Lower if entry.score >= beta => return (beta, reply),
                    Bound::Upper if entry.score <= alpha => return (alpha, reply),
                    _ => {}
                }
            }
        }

        // Terminal: depth limit or decided game
        if remaining == 0 || hive.is_game_over() {
            return self.leaf(hive, side, key, remaining, led_here);
        }

        let mut moves = hive.generate_moves(side);
        if moves.is_empty() {
            return self.leaf(hive, side, key, remaining, led_here);
        }

        // Previously best move first
        if let Some(pos) = tt_move.and_then(|t| moves.iter().position(|&m| m == t)) {
            moves[..=pos].rotate_right(1);
        }

        let mut best = None;
        for mv in moves {
            let undo = hive.apply(mv);
            let (child, _) = self.negamax(hive, side.opponent(), ply + 1, -beta, -alpha, Some(mv));
            hive.undo(undo);
            let score = -child;

            if score >= beta {
                self.tt.store(Entry {
                    key,
                    depth: remaining,
                    score: beta,
                    bound: Bound::Lower,
                    best: Some(mv),
                });
                return (beta, Some(mv));
            }
            if score > alpha {
                alpha = score;
                best = Some(mv);
            }
        }

        let bound = if best.is_some() { Bound::Exact } else { Bound::Upper };
        self.tt.store(Entry {
            key,
            depth: remaining,
            score: alpha,
            bound,
            best,
        });
        (alpha, best)
    }

    fn leaf(&mut self, hive: &mut Hive, side: Color, key: u64, remaining: u32, led_here: Option<Move>) -> (i32, Option<Move>) {
        let score = evaluate(hive, side, &self.config.heuristics);
        self.tt.store(Entry {
            key,
            depth: remaining,
            score,
            bound: Bound::Exact,
            best: None,
        });
        (score, led_here)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Hex, ORIGIN};
    use crate::pieces::{PieceId, Species};

    fn hive_with(placements: &[(&str, Hex)]) -> Hive {
        let mut hive = Hive::new();
        for &(token, cell) in placements {
            hive.move_piece(token.parse().unwrap(), Some(cell));
        }
        hive
    }

    #[test]
    fn test_ai_returns_legal_move() {
        let mut hive = Hive::new();
        let mut ai = AlphaBetaAI::with_depth(2);
        let mv = ai.best_move(&mut hive, Color::White).expect("opening move");
        assert_eq!(mv.to, ORIGIN);
        assert_ne!(mv.piece.species(), Species::QueenBee);
        assert!(hive.is_empty(), "search must not leave moves on the board");
    }

    #[test]
    fn test_search_restores_board() {
        let mut hive = hive_with(&[
            ("wQ1", ORIGIN),
            ("bQ1", Hex::new(2, 0)),
            ("wA1", Hex::new(-2, 0)),
            ("bG1", Hex::new(4, 0)),
        ]);
        let before = hive.clone();
        let mut ai = AlphaBetaAI::with_depth(2);
        let result = ai.search(&mut hive, Color::White);
        assert!(result.best.is_some());
        assert!(result.nodes > 1);
        assert_eq!(hive, before);
    }

    #[test]
    fn test_ai_surrounds_queen() {
        // black queen has five neighbors; the white ant can fill the sixth
        let mut hive = hive_with(&[
            ("bQ1", ORIGIN),
            ("wQ1", Hex::new(2, 0)),
            ("wG1", Hex::new(1, 1)),
            ("wG2", Hex::new(-1, 1)),
            ("wG3", Hex::new(-2, 0)),
            ("bA1", Hex::new(-1, -1)),
            ("wA1", Hex::new(4, 0)),
        ]);
        let mut ai = AlphaBetaAI::with_depth(1);
        let mv = ai.play_turn(&mut hive, Color::White).expect("white has moves");
        assert_eq!(mv.to, Hex::new(1, -1));
        assert!(hive.is_game_over());
    }

    #[test]
    fn test_no_moves_is_a_pass() {
        // white's only piece is covered; no reserve spot exists without the queen
        let mut hive = hive_with(&[("wQ1", ORIGIN), ("bQ1", Hex::new(2, 0)), ("bB1", Hex::new(3, 1))]);
        hive.move_piece("bB1".parse().unwrap(), Some(ORIGIN));
        let mut ai = AlphaBetaAI::with_depth(2);
        let result = ai.search(&mut hive, Color::White);
        assert_eq!(result.best, None);
    }

    #[test]
    fn test_play_game() {
        let mut ai = AlphaBetaAI::with_depth(1);
        let (final_state, history) = ai.play_game(Hive::new(), Color::White, 8);
        assert!(!history.is_empty());
        assert!(final_state.is_all_connected());
        let placed = final_state.pieces_on_board().count();
        assert!(placed >= 1);
        assert!(final_state.piece(PieceId::queen(Color::White)).on_board());
    }

    #[test]
    fn test_tt_keeps_buried_pieces_apart() {
        // identical tops; a white beetle covers bQ1 in one and bA1 in the other
        let covering_queen = hive_with(&[
            ("wQ1", ORIGIN),
            ("bQ1", Hex::new(2, 0)),
            ("bG1", Hex::new(4, 0)),
            ("wA1", Hex::new(-2, 0)),
            ("wB1", Hex::new(2, 0)),
        ]);
        let mut covering_ant = hive_with(&[
            ("wQ1", ORIGIN),
            ("bA1", Hex::new(2, 0)),
            ("bG1", Hex::new(4, 0)),
            ("wA1", Hex::new(-2, 0)),
            ("wB1", Hex::new(2, 0)),
        ]);
        assert_eq!(covering_queen.hash(), covering_ant.hash());

        let mut shared = AlphaBetaAI::with_depth(2);
        shared.search(&mut covering_queen.clone(), Color::White);
        let reused = shared.search(&mut covering_ant.clone(), Color::White);

        let fresh = AlphaBetaAI::with_depth(2).search(&mut covering_ant, Color::White);
        assert_eq!(reused.best, fresh.best);
        assert_eq!(reused.score, fresh.score);
    }

    #[test]
    fn test_tt_is_used() {
        let mut hive = hive_with(&[("wQ1", ORIGIN), ("bQ1", Hex::new(2, 0))]);
        let mut ai = AlphaBetaAI::with_depth(2);
        ai.search(&mut hive, Color::White);
        assert!(ai.tt_stats().used > 0);
        ai.clear_tt();
        assert_eq!(ai.tt_stats().used, 0);
    }
}
