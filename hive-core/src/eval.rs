//! Static position evaluation

use crate::board::Hex;
use crate::game::Hive;
use crate::pieces::{Color, PieceId, Species};
use serde::{Deserialize, Serialize};

/// Score of a surrounded queen (effectively infinite)
pub const WIN_VALUE: i32 = 1_000_000;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Queen fully surrounded
    pub queen_surrounded: i32,
    /// Per ant, pinned vs. free to move
    pub ant_mobility: i32,
    /// Queen pinned in place
    pub queen_pinned: i32,
    /// Beetle sitting on a queen
    pub beetle_on_queen: i32,
    /// Per open cell next to the enemy queen we can reach or drop on
    pub queen_attack: i32,
    /// Per placement spot
    pub placement_weight: i32,
    /// Per legal move
    pub mobility_weight: i32,
    /// Side to move has no legal move
    pub no_moves_penalty: i32,
    /// Per enemy drop spot next to our queen
    pub queen_exposure: i32,
    /// Flat bonus when the enemy has no drop spot next to our queen
    pub queen_sheltered: i32,
    /// Per friendly grasshopper or beetle next to our queen
    pub queen_defender: i32,
    /// Queens touching each other
    pub queens_adjacent: i32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            queen_surrounded: WIN_VALUE,
            ant_mobility: 20,
            queen_pinned: 30,
            beetle_on_queen: 50,
            queen_attack: 25,
            placement_weight: 1,
            mobility_weight: 2,
            no_moves_penalty: 2000,
            queen_exposure: 25,
            queen_sheltered: 15,
            queen_defender: 10,
            queens_adjacent: 15,
        }
    }
}

/// Evaluate position from `side`'s perspective
pub fn evaluate(hive: &mut Hive, side: Color, heuristics: &Heuristics) -> i32 {
    let opponent = side.opponent();
    let my_queen = PieceId::queen(side);
    let their_queen = PieceId::queen(opponent);

    let mut score = 0i32;

    // Terminal: surrounded queens
    if hive.is_queen_surrounded(opponent) {
        score += heuristics.queen_surrounded;
    }
    if hive.is_queen_surrounded(side) {
        score -= heuristics.queen_surrounded;
    }

    // Ant freedom
    for ant in PieceId::of_species(side, Species::Ant) {
        if hive.piece(ant).on_board() {
            let sign = if hive.is_pinned(ant) { -1 } else { 1 };
            score += sign * heuristics.ant_mobility;
        }
    }
    for ant in PieceId::of_species(opponent, Species::Ant) {
        if hive.piece(ant).on_board() {
            let sign = if hive.is_pinned(ant) { 1 } else { -1 };
            score += sign * heuristics.ant_mobility;
        }
    }

    // Queen freedom
    if hive.is_pinned(their_queen) {
        score += heuristics.queen_pinned;
    }
    if hive.is_pinned(my_queen) {
        score -= heuristics.queen_pinned;
    }

    // Beetles on queens
    score += beetle_pressure(hive, their_queen, side) * heuristics.beetle_on_queen;
    score -= beetle_pressure(hive, my_queen, opponent) * heuristics.beetle_on_queen;

    // Mobility
    let moves = hive.generate_moves(side);
    let placing = if hive.reserve(side).next().is_some() {
        hive.get_placing_spots(side)
    } else {
        Default::default()
    };
    if moves.is_empty() {
        score -= heuristics.no_moves_penalty;
    } else {
        score += placing.len() as i32 * heuristics.placement_weight;
        score += moves.len() as i32 * heuristics.mobility_weight;
    }

    // Pressure on the enemy queen
    if let Some(queen_cell) = hive.position(their_queen) {
        let reachable = queen_cell
            .neighbors()
            .filter(|&c| !hive.is_occupied(c))
            .filter(|c| placing.contains(c) || moves.iter().any(|m| m.to == *c))
            .count();
        score += reachable as i32 * heuristics.queen_attack;
    }

    // Safety of our own queen
    if let Some(queen_cell) = hive.position(my_queen) {
        let enemy_spots = hive.get_placing_spots(opponent);
        let exposed = queen_cell.neighbors().filter(|c| enemy_spots.contains(c)).count();
        if exposed > 0 {
            score -= exposed as i32 * heuristics.queen_exposure;
        } else {
            score += heuristics.queen_sheltered;
        }
        score += queen_guard(hive, queen_cell, side, their_queen, heuristics);
    }

    score
}

/// 1 if a beetle of `attacker` sits on top of `queen`
fn beetle_pressure(hive: &Hive, queen: PieceId, attacker: Color) -> i32 {
    let on_top = hive
        .position(queen)
        .and_then(|cell| hive.top(cell))
        .is_some_and(|top| top != queen && top.species() == Species::Beetle && top.color() == attacker);
    on_top as i32
}

/// Defenders next to our queen, minus the enemy queen pressing against it
fn queen_guard(hive: &Hive, queen_cell: Hex, side: Color, their_queen: PieceId, heuristics: &Heuristics) -> i32 {
    let mut score = 0;
    for top in queen_cell.neighbors().filter_map(|c| hive.top(c)) {
        if top.color() == side && matches!(top.species(), Species::Grasshopper | Species::Beetle) {
            score += heuristics.queen_defender;
        }
        if top == their_queen {
            score -= heuristics.queens_adjacent;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ORIGIN;

    fn hive_with(placements: &[(&str, Hex)]) -> Hive {
        let mut hive = Hive::new();
        for &(token, cell) in placements {
            hive.move_piece(token.parse().unwrap(), Some(cell));
        }
        hive
    }

    #[test]
    fn test_evaluate_symmetric() {
        let mut hive = hive_with(&[("wQ1", ORIGIN), ("bQ1", Hex::new(2, 0))]);
        let heuristics = Heuristics::default();
        let white = evaluate(&mut hive, Color::White, &heuristics);
        let black = evaluate(&mut hive, Color::Black, &heuristics);
        assert_eq!(white, black, "mirror position should score the same for both sides");
    }

    #[test]
    fn test_surrounded_queen_dominates() {
        let mut hive = hive_with(&[("bQ1", ORIGIN)]);
        let white: Vec<PieceId> = PieceId::all(Color::White).take(6).collect();
        for (piece, cell) in white.into_iter().zip(ORIGIN.neighbors()) {
            hive.move_piece(piece, Some(cell));
        }
        let heuristics = Heuristics::default();
        assert!(evaluate(&mut hive, Color::White, &heuristics) > WIN_VALUE / 2);
        assert!(evaluate(&mut hive, Color::Black, &heuristics) < -WIN_VALUE / 2);
    }

    #[test]
    fn test_beetle_on_queen_is_good() {
        let heuristics = Heuristics::default();
        let mut hive = hive_with(&[("wQ1", ORIGIN), ("bQ1", Hex::new(2, 0)), ("wB1", Hex::new(-2, 0))]);
        assert_eq!(beetle_pressure(&hive, PieceId::queen(Color::Black), Color::White), 0);
        hive.move_piece("wB1".parse().unwrap(), Some(Hex::new(2, 0)));
        assert_eq!(beetle_pressure(&hive, PieceId::queen(Color::Black), Color::White), 1);
        assert_eq!(beetle_pressure(&hive, PieceId::queen(Color::White), Color::Black), 0);

        // white gains exactly the beetle weight; black loses it
        let ignored = Heuristics {
            beetle_on_queen: 0,
            ..heuristics.clone()
        };
        let white = evaluate(&mut hive, Color::White, &heuristics);
        assert_eq!(white - evaluate(&mut hive, Color::White, &ignored), heuristics.beetle_on_queen);
        let black = evaluate(&mut hive, Color::Black, &heuristics);
        assert_eq!(black - evaluate(&mut hive, Color::Black, &ignored), -heuristics.beetle_on_queen);
    }

    #[test]
    fn test_evaluate_leaves_board_unchanged() {
        let mut hive = hive_with(&[
            ("wQ1", ORIGIN),
            ("bQ1", Hex::new(2, 0)),
            ("wA1", Hex::new(-2, 0)),
            ("bS1", Hex::new(4, 0)),
        ]);
        let before = hive.clone();
        let _ = evaluate(&mut hive, Color::White, &Heuristics::default());
        assert_eq!(hive, before);
    }

    #[test]
    fn test_default_heuristics() {
        let h = Heuristics::default();
        assert_eq!(h.queen_surrounded, WIN_VALUE);
        assert!(h.no_moves_penalty > h.queen_attack);
        assert!(h.mobility_weight > h.placement_weight);
    }
}
