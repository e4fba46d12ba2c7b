//! Legal destinations per species, placement spots, and turn-level moves
//!
//! Movement is generated by walking the piece across the real board and
//! validating each step in the resulting position. Multi-step walks keep an
//! explicit stack of steps, each paired with the step that undoes it.

use crate::board::{Hex, ORIGIN};
use crate::game::{Hive, Move};
use crate::pieces::{Color, PieceId, Species};
use rustc_hash::FxHashSet;

/// Spider walks exactly this many steps
const SPIDER_STEPS: usize = 3;

/// Placements a color makes before its queen is forced
const QUEEN_DEADLINE: usize = 3;

/// One entry of a sliding walk
enum Step {
    /// Slide the piece onto `cell`
    Enter { cell: Hex },
    /// Slide it back to where it came from
    Leave { back_to: Hex },
}

impl Hive {
    // ========================================================================
    // PLACEMENT
    // ========================================================================

    /// Empty cells where `color` may drop a piece from reserve
    pub fn get_placing_spots(&self, color: Color) -> FxHashSet<Hex> {
        let mut spots = FxHashSet::default();

        if self.is_empty() {
            spots.insert(ORIGIN);
            return spots;
        }

        let mut on_board = self.pieces_on_board();
        if let (Some(only), None) = (on_board.next(), on_board.next()) {
            let cell = self.position(only).expect("piece is on the board");
            spots.extend(cell.neighbors());
            return spots;
        }

        let own_tops = self
            .occupied_cells()
            .filter(|&cell| self.top(cell).is_some_and(|p| p.color() == color));
        for cell in own_tops {
            for spot in cell.neighbors() {
                if !self.is_occupied(spot) && !self.touches_color(spot, color.opponent()) {
                    spots.insert(spot);
                }
            }
        }

        spots
    }

    /// Spots for a color's first placement: the origin on an empty board,
    /// otherwise any empty cell touching the hive.
    fn opening_spots(&self) -> FxHashSet<Hex> {
        if self.is_empty() {
            return std::iter::once(ORIGIN).collect();
        }
        self.occupied_cells()
            .flat_map(|cell| cell.neighbors())
            .filter(|&spot| !self.is_occupied(spot))
            .collect()
    }

    fn touches_color(&self, cell: Hex, color: Color) -> bool {
        cell.neighbors()
            .any(|n| self.top(n).is_some_and(|p| p.color() == color))
    }

    // ========================================================================
    // MOVEMENT
    // ========================================================================

    /// Destinations `piece` may move to. Empty for pieces in reserve,
    /// covered pieces, and pieces whose queen has not been placed.
    pub fn get_moving_spots(&mut self, piece: PieceId) -> FxHashSet<Hex> {
        let state = *self.piece(piece);
        let from = match state.position {
            Some(cell) => cell,
            None => return FxHashSet::default(),
        };
        if !state.is_top || !self.piece(PieceId::queen(piece.color())).on_board() {
            return FxHashSet::default();
        }
        // lifting a piece that holds the hive together rules out every move
        if self.height(from) == 1 && !self.probe(piece, None, |hive| hive.is_all_connected()) {
            return FxHashSet::default();
        }

        match piece.species() {
            Species::QueenBee => self.queen_moves(piece, from),
            Species::Beetle => self.beetle_moves(piece, from),
            Species::Grasshopper => self.grasshopper_moves(piece, from),
            Species::Spider => self.spider_moves(piece, from),
            Species::Ant => self.ant_moves(piece, from),
        }
    }

    fn queen_moves(&mut self, piece: PieceId, from: Hex) -> FxHashSet<Hex> {
        from.neighbors()
            .filter(|&to| !self.is_occupied(to) && self.is_valid_slide(piece, from, to, false, false))
            .collect()
    }

    fn beetle_moves(&mut self, piece: PieceId, from: Hex) -> FxHashSet<Hex> {
        from.neighbors()
            .filter(|&to| self.is_valid_slide(piece, from, to, false, true))
            .collect()
    }

    fn grasshopper_moves(&mut self, piece: PieceId, from: Hex) -> FxHashSet<Hex> {
        let mut spots = FxHashSet::default();
        for direction in 0..6 {
            let mut landing = from.neighbor(direction);
            if !self.is_occupied(landing) {
                continue; // must jump over at least one piece
            }
            while self.is_occupied(landing) {
                landing = landing.neighbor(direction);
            }
            if self.is_one_hive(piece, landing, true, false) {
                spots.insert(landing);
            }
        }
        spots
    }

    /// Ground slides from `at` to cells accepted by `allow`
    fn slide_targets(&mut self, piece: PieceId, at: Hex, allow: impl Fn(Hex) -> bool) -> Vec<Hex> {
        at.neighbors()
            .filter(|&to| allow(to) && self.is_valid_slide(piece, at, to, false, false))
            .collect()
    }

    fn spider_moves(&mut self, piece: PieceId, from: Hex) -> FxHashSet<Hex> {
        let mut spots = FxHashSet::default();
        let mut path = vec![from];
        let mut steps: Vec<Step> = self
            .slide_targets(piece, from, |_| true)
            .into_iter()
            .map(|cell| Step::Enter { cell })
            .collect();

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter { cell } => {
                    let back_to = self.position(piece).expect("spider is on the board");
                    self.move_piece(piece, Some(cell));
                    path.push(cell);
                    steps.push(Step::Leave { back_to });

                    // `path` starts with the origin, so its length counts steps plus one
                    if path.len() - 1 == SPIDER_STEPS {
                        spots.insert(cell);
                    } else {
                        let next = self.slide_targets(piece, cell, |c| !path.contains(&c));
                        steps.extend(next.into_iter().map(|cell| Step::Enter { cell }));
                    }
                }
                Step::Leave { back_to } => {
                    path.pop();
                    self.move_piece(piece, Some(back_to));
                }
            }
        }

        debug_assert_eq!(self.position(piece), Some(from));
        spots
    }

    fn ant_moves(&mut self, piece: PieceId, from: Hex) -> FxHashSet<Hex> {
        let mut spots = FxHashSet::default();
        let mut seen = FxHashSet::default();
        seen.insert(from);

        let mut steps = Vec::new();
        for cell in self.slide_targets(piece, from, |_| true) {
            seen.insert(cell);
            steps.push(Step::Enter { cell });
        }

        while let Some(step) = steps.pop() {
            match step {
                Step::Enter { cell } => {
                    let back_to = self.position(piece).expect("ant is on the board");
                    self.move_piece(piece, Some(cell));
                    steps.push(Step::Leave { back_to });
                    spots.insert(cell);

                    for next in self.slide_targets(piece, cell, |c| !seen.contains(&c)) {
                        if seen.insert(next) {
                            steps.push(Step::Enter { cell: next });
                        }
                    }
                }
                Step::Leave { back_to } => {
                    self.move_piece(piece, Some(back_to));
                }
            }
        }

        debug_assert_eq!(self.position(piece), Some(from));
        spots
    }

    // ========================================================================
    // TURN-LEVEL GENERATION
    // ========================================================================

    /// All legal moves for `color`. Empty means the color must pass.
    /// Every reserve piece is offered on every placing spot.
    pub fn generate_moves(&mut self, color: Color) -> Vec<Move> {
        let mut moves = Vec::new();
        let placed = self.placed_count(color);
        let queen_placed = self.piece(PieceId::queen(color)).on_board();
        let board_empty = self.is_empty();
        let forced_queen = placed == QUEEN_DEADLINE && !queen_placed;

        let placing: Vec<Hex> = {
            let spots = if placed == 0 {
                self.opening_spots()
            } else {
                self.get_placing_spots(color)
            };
            sorted(spots)
        };

        for id in PieceId::all(color) {
            let state = *self.piece(id);
            if state.on_board() {
                if !state.is_top {
                    self.set_pinned(id, true);
                    continue;
                }
                if !queen_placed {
                    continue;
                }
                let spots = sorted(self.get_moving_spots(id));
                moves.extend(spots.into_iter().map(|to| Move::new(id, to)));
            } else {
                let species = id.species();
                if forced_queen && species != Species::QueenBee {
                    continue;
                }
                if board_empty && species == Species::QueenBee {
                    continue;
                }
                moves.extend(placing.iter().map(|&to| Move::new(id, to)));
            }
        }

        moves
    }
}

fn sorted(spots: FxHashSet<Hex>) -> Vec<Hex> {
    let mut spots: Vec<Hex> = spots.into_iter().collect();
    spots.sort();
    spots
}
