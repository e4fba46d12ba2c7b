//! One-hive and freedom-of-movement validators
//!
//! Every check that needs a hypothetical position moves the piece on the
//! real board through [`Hive::probe`], which puts it back before returning.

use crate::board::Hex;
use crate::game::Hive;
use crate::pieces::{PieceId, Species};
use rustc_hash::FxHashSet;

impl Hive {
    /// True iff the occupied cells form a single connected component
    /// (vacuously true on an empty board).
    pub fn is_all_connected(&self) -> bool {
        let start = match self.occupied_cells().next() {
            Some(cell) => cell,
            None => return true,
        };

        let mut visited = FxHashSet::default();
        visited.insert(start);
        let mut frontier = vec![start];
        while let Some(cell) = frontier.pop() {
            let top = self.top(cell).expect("occupied cell has a top piece");
            for next in self.piece(top).neighbor_cells() {
                if visited.insert(next) {
                    frontier.push(next);
                }
            }
        }

        visited.len() == self.occupied_count()
    }

    /// Would the hive stay whole if `piece` moved to `to`?
    ///
    /// Lifting the piece must not split the hive. A sliding piece must also
    /// keep touching something it touched before; grasshoppers and beetles
    /// climbing onto a stack are exempt from that contact test.
    pub fn is_one_hive(&mut self, piece: PieceId, to: Hex, is_grasshopper: bool, is_beetle: bool) -> bool {
        let from = match self.position(piece) {
            Some(cell) => cell,
            None => return false,
        };

        self.probe(piece, None, |hive| {
            if !hive.is_all_connected() {
                return false;
            }

            let mut contact: Vec<Hex> = hive.occupied_mask(from).cells(from).collect();
            // a beetle stepping off a stack still touches the stack it left
            if hive.is_occupied(from) {
                contact.push(from);
            }
            let onto_stack = is_beetle && hive.is_occupied(to);

            hive.probe(piece, Some(to), |hive| {
                let touches = is_grasshopper
                    || onto_stack
                    || hive.piece(piece).neighbor_cells().any(|c| contact.contains(&c));
                touches && hive.is_all_connected()
            })
        })
    }

    /// Full check of a one-cell step from `from` to `to`: destination free
    /// (unless beetle), gate passable, hive intact.
    pub fn is_valid_slide(
        &mut self,
        piece: PieceId,
        from: Hex,
        to: Hex,
        is_grasshopper: bool,
        is_beetle: bool,
    ) -> bool {
        if !is_beetle && self.is_occupied(to) {
            return false;
        }
        if !self.is_freedom_of_movement(piece, from, to, is_beetle) {
            return false;
        }
        self.is_one_hive(piece, to, is_grasshopper, is_beetle)
    }

    /// Gate rule for a step from `from` to the adjacent `to`.
    ///
    /// Ground pieces need exactly one of the two flanking cells occupied.
    /// Beetles compare stack heights: the step is blocked when both flanking
    /// stacks reach the higher of the two levels the beetle moves between.
    pub fn is_freedom_of_movement(&self, piece: PieceId, from: Hex, to: Hex, is_beetle: bool) -> bool {
        let direction = match from.direction_to(to) {
            Some(d) => d,
            None => return false,
        };
        let (left, right) = from.gate(direction);

        if !is_beetle {
            return self.is_occupied_by_other(left, piece) != self.is_occupied_by_other(right, piece);
        }

        let left = self.height_without(left, piece);
        let right = self.height_without(right, piece);
        // level the beetle stands on now, and the level it would land on
        let from_level = self.height_without(from, piece) + 1;
        let to_level = self.height_without(to, piece) + 1;

        if from_level >= to_level {
            !(left >= from_level && right >= from_level)
        } else {
            !(left >= to_level && right >= to_level)
        }
    }

    /// A piece with no legal single step. Covered and surrounded pieces are
    /// always pinned. The result is cached on the piece.
    pub fn is_pinned(&mut self, piece: PieceId) -> bool {
        let state = *self.piece(piece);
        let from = match state.position {
            Some(cell) => cell,
            None => return false,
        };

        let pinned = if !state.is_top || state.is_surrounded() {
            true
        } else {
            let is_beetle = piece.species() == Species::Beetle;
            !from
                .neighbors()
                .any(|to| self.is_valid_slide(piece, from, to, false, is_beetle))
        };

        self.set_pinned(piece, pinned);
        pinned
    }

    fn is_occupied_by_other(&self, cell: Hex, piece: PieceId) -> bool {
        self.height_without(cell, piece) > 0
    }

    fn height_without(&self, cell: Hex, piece: PieceId) -> usize {
        let stack = self.stack(cell);
        stack.len() - stack.iter().filter(|&&p| p == piece).count()
    }
}
