//! Piece identity definitions

use crate::error::HiveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pieces each player starts with
pub const PIECES_PER_COLOR: usize = 11;

/// Total pieces in a game
pub const PIECE_COUNT: usize = 2 * PIECES_PER_COLOR;

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn code(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

/// Insect species
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Ant,
    Beetle,
    Grasshopper,
    Spider,
    QueenBee,
}

/// Species definition
#[derive(Clone, Debug)]
pub struct SpeciesInfo {
    pub species: Species,
    pub code: char,
    pub name: &'static str,
    pub count: u8,
    /// Index of ordinal 1 within a color's reserve
    pub first_slot: u8,
}

impl SpeciesInfo {
    const fn new(species: Species, code: char, name: &'static str, count: u8, first_slot: u8) -> Self {
        Self {
            species,
            code,
            name,
            count,
            first_slot,
        }
    }
}

/// Reserve layout of one color: 3 Ants, 3 Grasshoppers, 2 Beetles, 2 Spiders, 1 Queen
pub static SPECIES: [SpeciesInfo; 5] = [
    SpeciesInfo::new(Species::Ant, 'A', "Ant", 3, 0),
    SpeciesInfo::new(Species::Grasshopper, 'G', "Grasshopper", 3, 3),
    SpeciesInfo::new(Species::Beetle, 'B', "Beetle", 2, 6),
    SpeciesInfo::new(Species::Spider, 'S', "Spider", 2, 8),
    SpeciesInfo::new(Species::QueenBee, 'Q', "Queen Bee", 1, 10),
];

impl Species {
    pub fn info(self) -> &'static SpeciesInfo {
        match self {
            Species::Ant => &SPECIES[0],
            Species::Grasshopper => &SPECIES[1],
            Species::Beetle => &SPECIES[2],
            Species::Spider => &SPECIES[3],
            Species::QueenBee => &SPECIES[4],
        }
    }

    fn from_code(code: char) -> Option<Species> {
        SPECIES.iter().find(|s| s.code == code).map(|s| s.species)
    }
}

/// Immutable identity of one of the 22 pieces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u8);

impl PieceId {
    /// Build an identity; `ordinal` is 1-based
    pub fn new(color: Color, species: Species, ordinal: u8) -> Self {
        let info = species.info();
        assert!(
            (1..=info.count).contains(&ordinal),
            "{} has no ordinal {}",
            info.name,
            ordinal
        );
        PieceId(color as u8 * PIECES_PER_COLOR as u8 + info.first_slot + ordinal - 1)
    }

    pub fn queen(color: Color) -> Self {
        PieceId::new(color, Species::QueenBee, 1)
    }

    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < PIECE_COUNT);
        PieceId(index as u8)
    }

    /// Dense index in `0..PIECE_COUNT`
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn color(self) -> Color {
        if (self.0 as usize) < PIECES_PER_COLOR {
            Color::White
        } else {
            Color::Black
        }
    }

    fn slot(self) -> u8 {
        self.0 % PIECES_PER_COLOR as u8
    }

    fn info(self) -> &'static SpeciesInfo {
        let slot = self.slot();
        SPECIES
            .iter()
            .rev()
            .find(|s| s.first_slot <= slot)
            .expect("slot 0 belongs to the first species")
    }

    pub fn species(self) -> Species {
        self.info().species
    }

    pub fn ordinal(self) -> u8 {
        self.slot() - self.info().first_slot + 1
    }

    /// The 11 identities of one color, in reserve order
    pub fn all(color: Color) -> impl Iterator<Item = PieceId> {
        let base = color as usize * PIECES_PER_COLOR;
        (base..base + PIECES_PER_COLOR).map(PieceId::from_index)
    }

    pub fn of_species(color: Color, species: Species) -> impl Iterator<Item = PieceId> {
        (1..=species.info().count).map(move |ordinal| PieceId::new(color, species, ordinal))
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.color().code(), self.info().code, self.ordinal())
    }
}

impl FromStr for PieceId {
    type Err = HiveError;

    /// Parse a canonical token such as `wQ1` or `bA3`
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let unknown = || HiveError::UnknownPiece(token.to_string());
        let mut chars = token.chars();
        let (Some(c), Some(s), Some(o), None) = (chars.next(), chars.next(), chars.next(), chars.next())
        else {
            return Err(unknown());
        };
        let color = match c {
            'w' => Color::White,
            'b' => Color::Black,
            _ => return Err(unknown()),
        };
        let species = Species::from_code(s).ok_or_else(unknown)?;
        let ordinal = o.to_digit(10).ok_or_else(unknown)? as u8;
        if !(1..=species.info().count).contains(&ordinal) {
            return Err(unknown());
        }
        Ok(PieceId::new(color, species, ordinal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_lookup() {
        assert_eq!("wA1".parse::<PieceId>().unwrap().index(), 0);
        assert_eq!("wQ1".parse::<PieceId>().unwrap().index(), 10);
        assert_eq!("bQ1".parse::<PieceId>().unwrap().index(), 21);
        assert!("wQ2".parse::<PieceId>().is_err());
        assert!("xA1".parse::<PieceId>().is_err());
        assert!("wA".parse::<PieceId>().is_err());
        assert!("wA11".parse::<PieceId>().is_err());
    }

    #[test]
    fn test_token_round_trip() {
        for index in 0..PIECE_COUNT {
            let id = PieceId::from_index(index);
            let token = id.to_string();
            assert_eq!(token.len(), 3);
            assert_eq!(token.parse::<PieceId>().unwrap(), id);
        }
    }

    #[test]
    fn test_reserve_composition() {
        let white: Vec<_> = PieceId::all(Color::White).collect();
        assert_eq!(white.len(), PIECES_PER_COLOR);
        let count = |sp| white.iter().filter(|p| p.species() == sp).count();
        assert_eq!(count(Species::Ant), 3);
        assert_eq!(count(Species::Grasshopper), 3);
        assert_eq!(count(Species::Beetle), 2);
        assert_eq!(count(Species::Spider), 2);
        assert_eq!(count(Species::QueenBee), 1);
        assert!(PieceId::all(Color::Black).all(|p| p.color() == Color::Black));
    }

    #[test]
    fn test_queen() {
        let q = PieceId::queen(Color::Black);
        assert_eq!(q.species(), Species::QueenBee);
        assert_eq!(q.color(), Color::Black);
        assert_eq!(q.to_string(), "bQ1");
    }
}
