//! Sliding move generation
//!
//! A penguin slides in a straight line along one of the six hex directions
//! and may stop on any tile it passes. The slide ends before the first hole,
//! occupied tile, or off-board cell.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Direction, Position, Space, DIRECTIONS};
use crate::game::GameState;

/// Relocate one penguin from `from` to `to`
///
/// Ordered by `from` then `to` (each row first, then column); search uses
/// this ordering to break ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    pub const fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

// ============================================================================
// DESTINATIONS
// ============================================================================

fn slide(
    board: &Board,
    occupied: &FxHashSet<Position>,
    from: Position,
    direction: Direction,
) -> Vec<Position> {
    let mut reachable = Vec::new();
    let mut cursor = from.neighbor(direction);
    while matches!(board.space(cursor), Some(Space::Tile { .. })) && !occupied.contains(&cursor) {
        reachable.push(cursor);
        cursor = cursor.neighbor(direction);
    }
    reachable
}

/// Reachable tiles from `from`, grouped by direction in generation order
///
/// Empty when `from` is not an active tile.
pub fn destinations_by_direction(state: &GameState, from: Position) -> Vec<(Direction, Vec<Position>)> {
    if !state.board().is_tile(from) {
        return Vec::new();
    }
    let occupied = state.occupied();
    DIRECTIONS
        .iter()
        .map(|&dir| (dir, slide(state.board(), &occupied, from, dir)))
        .collect()
}

/// Every tile a penguin on `from` could slide to, direction by direction
pub fn destinations(state: &GameState, from: Position) -> Vec<Position> {
    if !state.board().is_tile(from) {
        return Vec::new();
    }
    let occupied = state.occupied();
    collect_destinations(state.board(), &occupied, from)
}

fn collect_destinations(board: &Board, occupied: &FxHashSet<Position>, from: Position) -> Vec<Position> {
    DIRECTIONS
        .iter()
        .flat_map(|&dir| slide(board, occupied, from, dir))
        .collect()
}

/// Legal moves of one team, penguins in team order
pub fn team_moves(state: &GameState, index: usize) -> Vec<Move> {
    let Some(team) = state.team(index) else {
        return Vec::new();
    };
    let occupied = state.occupied();
    team.positions()
        .flat_map(|from| {
            collect_destinations(state.board(), &occupied, from)
                .into_iter()
                .map(move |to| Move::new(from, to))
        })
        .collect()
}

/// Legal moves of the team on duty
pub fn legal_moves(state: &GameState) -> Vec<Move> {
    team_moves(state, state.players_turn())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::{PenguinTeam, TeamColor};

    fn pos(row: i32, column: i32) -> Position {
        Position::new(row, column)
    }

    fn state_with(board: Board, black: &[Position], red: &[Position]) -> GameState {
        let teams = vec![
            PenguinTeam::with_penguins(TeamColor::Black, black, 0),
            PenguinTeam::with_penguins(TeamColor::Red, red, 0),
        ];
        GameState::from_parts(board, teams, 0, 0).unwrap()
    }

    #[test]
    fn test_destinations_even_row() {
        let state = state_with(Board::uniform(5, 3, 1).unwrap(), &[pos(2, 1)], &[]);
        assert_eq!(
            destinations(&state, pos(2, 1)),
            vec![
                pos(0, 1),
                pos(1, 0),
                pos(0, 0),
                pos(1, 1),
                pos(0, 2),
                pos(3, 0),
                pos(4, 0),
                pos(3, 1),
                pos(4, 2),
                pos(4, 1),
            ]
        );
    }

    #[test]
    fn test_destinations_odd_row() {
        let state = state_with(Board::uniform(5, 3, 1).unwrap(), &[pos(1, 1)], &[]);
        assert_eq!(
            destinations(&state, pos(1, 1)),
            vec![
                pos(0, 1),
                pos(0, 2),
                pos(2, 1),
                pos(3, 0),
                pos(4, 0),
                pos(2, 2),
                pos(3, 2),
                pos(3, 1),
            ]
        );
    }

    #[test]
    fn test_penguins_block_slides() {
        let state = state_with(
            Board::uniform(5, 3, 1).unwrap(),
            &[pos(2, 1)],
            &[pos(0, 1), pos(3, 1)],
        );
        assert_eq!(
            destinations(&state, pos(2, 1)),
            vec![
                pos(1, 0),
                pos(0, 0),
                pos(1, 1),
                pos(0, 2),
                pos(3, 0),
                pos(4, 0),
                pos(4, 1),
            ]
        );
    }

    #[test]
    fn test_holes_block_slides() {
        let board = Board::from_fish_rows(&[vec![2, 1, 5], vec![5, 3, 2]]).unwrap();
        let state = state_with(board, &[pos(1, 1)], &[]);
        assert_eq!(destinations(&state, pos(1, 1)), vec![pos(0, 1), pos(0, 2)]);

        let holed = state.add_holes(&[pos(0, 2)]).unwrap();
        assert_eq!(destinations(&holed, pos(1, 1)), vec![pos(0, 1)]);
    }

    #[test]
    fn test_destinations_by_direction() {
        let state = state_with(Board::uniform(5, 3, 1).unwrap(), &[pos(1, 1)], &[]);
        let grouped = destinations_by_direction(&state, pos(1, 1));
        assert_eq!(grouped.len(), 6);
        assert_eq!(grouped[0], (Direction::Up, vec![]));
        assert_eq!(grouped[3], (Direction::DownLeft, vec![pos(2, 1), pos(3, 0), pos(4, 0)]));
        assert!(destinations_by_direction(&state, pos(7, 7)).is_empty());
    }

    #[test]
    fn test_legal_moves_follow_team_order() {
        let board = Board::uniform(6, 1, 1).unwrap();
        let state = state_with(board, &[pos(4, 0), pos(0, 0)], &[pos(1, 0)]);
        assert_eq!(
            legal_moves(&state),
            vec![
                Move::new(pos(4, 0), pos(2, 0)),
                Move::new(pos(4, 0), pos(3, 0)),
                Move::new(pos(4, 0), pos(5, 0)),
                Move::new(pos(0, 0), pos(2, 0)),
            ]
        );
        assert_eq!(
            team_moves(&state, 1),
            vec![
                Move::new(pos(1, 0), pos(2, 0)),
                Move::new(pos(1, 0), pos(3, 0)),
                Move::new(pos(1, 0), pos(5, 0)),
            ]
        );
        assert!(team_moves(&state, 2).is_empty());
    }

    #[test]
    fn test_move_ordering() {
        let a = Move::new(pos(0, 1), pos(4, 0));
        let b = Move::new(pos(1, 0), pos(0, 0));
        let c = Move::new(pos(0, 1), pos(2, 2));
        assert!(a < b);
        assert!(c < a);
        assert_eq!(a.to_string(), "(0, 1) -> (4, 0)");
    }
}
