//! Hex lattice geometry in doubled coordinates
//!
//! Every cell satisfies `x + y` even; a step to an adjacent cell moves two
//! columns sideways or one column and one row diagonally.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell on the unbounded hive lattice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub x: i16,
    pub y: i16,
}

/// The first placement of the game always lands here
pub const ORIGIN: Hex = Hex::new(0, 0);

/// Direction offsets (dx, dy), ordered so that consecutive indices are
/// adjacent directions (the gate of direction `d` is `d - 1` and `d + 1`).
/// Index: 0=E, 1=SE, 2=SW, 3=W, 4=NW, 5=NE
pub const DIRECTIONS: [(i16, i16); 6] = [
    (2, 0),   // E
    (1, 1),   // SE
    (-1, 1),  // SW
    (-2, 0),  // W
    (-1, -1), // NW
    (1, -1),  // NE
];

impl Hex {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dx, dy) = DIRECTIONS[direction % 6];
        Hex::new(self.x + dx, self.y + dy)
    }

    /// All six adjacent cells, in direction order
    pub fn neighbors(self) -> impl Iterator<Item = Hex> {
        (0..6).map(move |d| self.neighbor(d))
    }

    /// Direction index leading from `self` to an adjacent `other`
    pub fn direction_to(&self, other: Hex) -> Option<usize> {
        let delta = (other.x - self.x, other.y - self.y);
        DIRECTIONS.iter().position(|&d| d == delta)
    }

    pub fn is_adjacent(&self, other: Hex) -> bool {
        self.direction_to(other).is_some()
    }

    /// The two cells flanking a step in `direction`: the cells adjacent to
    /// both `self` and `self.neighbor(direction)`.
    pub fn gate(&self, direction: usize) -> (Hex, Hex) {
        (self.neighbor(direction + 5), self.neighbor(direction + 1))
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Occupied adjacent directions of a cell, one bit per entry of [`DIRECTIONS`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Neighbors(u8);

impl Neighbors {
    pub const NONE: Neighbors = Neighbors(0);

    pub fn with(self, direction: usize) -> Self {
        Neighbors(self.0 | (1 << direction))
    }

    pub fn contains(&self, direction: usize) -> bool {
        self.0 & (1 << direction) != 0
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Absolute cells of the occupied neighbors around `center`
    pub fn cells(self, center: Hex) -> impl Iterator<Item = Hex> {
        (0..6)
            .filter(move |&d| self.contains(d))
            .map(move |d| center.neighbor(d))
    }
}
