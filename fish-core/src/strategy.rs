//! Fixed-depth minimax and the row-major placement strategy
//!
//! The search counts one level per individual action, skips included. Leaves
//! are valued by the score of the team that was on duty at the root; that
//! team maximizes and every other team minimizes. Equally valued root moves
//! are resolved in favour of the smallest [`Move`].

use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use thiserror::Error;

use crate::board::Position;
use crate::game::{GameState, RuleError};
use crate::moves::Move;
use crate::tree::{generate_children, Action};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("the team on duty has no legal move")]
    NoLegalMove,
    #[error("no free tile left to place a penguin")]
    NoPlacement,
    #[error("search needs at least one level")]
    ZeroDepth,
    #[error("search was cancelled")]
    Cancelled,
    #[error(transparent)]
    Rule(#[from] RuleError),
}

// ============================================================================
// SEARCH
// ============================================================================

/// Best move for the team on duty, looking `levels` actions ahead
pub fn minimax_move(state: &GameState, levels: u32) -> Result<Move, StrategyError> {
    minimax_move_until(state, levels, &AtomicBool::new(false))
}

/// [`minimax_move`] that gives up with [`StrategyError::Cancelled`] once
/// `stop` is set
pub fn minimax_move_until(state: &GameState, levels: u32, stop: &AtomicBool) -> Result<Move, StrategyError> {
    if levels == 0 {
        return Err(StrategyError::ZeroDepth);
    }
    let root = state.players_turn();
    let candidates: Vec<(Move, GameState)> = generate_children(state)
        .into_iter()
        .filter_map(|(action, next)| match action {
            Action::Move(mv) => Some((mv, next)),
            Action::Skip => None,
        })
        .collect();

    #[cfg(feature = "parallel")]
    let scored: Vec<(Move, u32)> = candidates
        .par_iter()
        .map(|(mv, next)| (*mv, minimax_value(next, levels - 1, root, stop)))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let scored: Vec<(Move, u32)> = candidates
        .iter()
        .map(|(mv, next)| (*mv, minimax_value(next, levels - 1, root, stop)))
        .collect();

    if stop.load(Ordering::Relaxed) {
        return Err(StrategyError::Cancelled);
    }

    scored
        .into_iter()
        .reduce(|best, candidate| {
            let better = candidate.1 > best.1 || (candidate.1 == best.1 && candidate.0 < best.0);
            if better {
                candidate
            } else {
                best
            }
        })
        .map(|(mv, _)| mv)
        .ok_or(StrategyError::NoLegalMove)
}

fn minimax_value(state: &GameState, levels: u32, root: usize, stop: &AtomicBool) -> u32 {
    let score = state.team(root).map_or(0, |team| team.score);
    if levels == 0 || stop.load(Ordering::Relaxed) {
        return score;
    }
    let children = generate_children(state);
    let values = children
        .iter()
        .map(|(_, next)| minimax_value(next, levels - 1, root, stop));
    let value = if state.players_turn() == root {
        values.max()
    } else {
        values.min()
    };
    value.unwrap_or(score)
}

/// First free active tile in row-major order
pub fn placement(state: &GameState) -> Result<Position, StrategyError> {
    state
        .board()
        .positions()
        .find(|&pos| state.is_valid_placement(pos).is_ok())
        .ok_or(StrategyError::NoPlacement)
}

// ============================================================================
// MINIMAX AI
// ============================================================================

/// Minimax player scaling its depth with the number of teams
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinimaxAI {
    /// Levels searched per team still in the game
    pub levels_per_team: u32,
}

impl Default for MinimaxAI {
    fn default() -> Self {
        Self { levels_per_team: 1 }
    }
}

impl MinimaxAI {
    pub fn new(levels_per_team: u32) -> Self {
        Self { levels_per_team }
    }

    /// Search depth for the given state
    pub fn levels(&self, state: &GameState) -> u32 {
        self.levels_per_team * state.teams().len() as u32
    }

    pub fn best_move(&self, state: &GameState) -> Result<Move, StrategyError> {
        minimax_move(state, self.levels(state))
    }

    /// [`best_move`](Self::best_move), abandoned once `stop` is set
    pub fn best_move_until(&self, state: &GameState, stop: &AtomicBool) -> Result<Move, StrategyError> {
        minimax_move_until(state, self.levels(state), stop)
    }

    pub fn place(&self, state: &GameState) -> Result<Position, StrategyError> {
        placement(state)
    }

    /// Play every team with this AI until nobody can move
    pub fn play_out(&self, initial: GameState) -> Result<(GameState, Vec<Action>), StrategyError> {
        let mut state = initial;
        let mut history = Vec::new();

        while !state.is_game_over() {
            let action = if state.can_team_move(state.players_turn()) {
                Action::Move(self.best_move(&state)?)
            } else {
                Action::Skip
            };
            state = match action {
                Action::Move(mv) => state.move_penguin(mv)?,
                Action::Skip => state.skip_turn()?,
            };
            history.push(action);
        }

        Ok((state, history))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::team::{PenguinTeam, TeamColor};

    fn pos(row: i32, column: i32) -> Position {
        Position::new(row, column)
    }

    fn mv(from: (i32, i32), to: (i32, i32)) -> Move {
        Move::new(pos(from.0, from.1), pos(to.0, to.1))
    }

    fn column_board(fish: &[u32]) -> Board {
        let rows: Vec<Vec<u32>> = fish.iter().map(|&f| vec![f]).collect();
        Board::from_fish_rows(&rows).unwrap()
    }

    fn duel(board: Board, black: &[Position], red: &[Position], players_turn: usize) -> GameState {
        let teams = vec![
            PenguinTeam::with_penguins(TeamColor::Black, black, 0),
            PenguinTeam::with_penguins(TeamColor::Red, red, 0),
        ];
        GameState::from_parts(board, teams, 1, players_turn).unwrap()
    }

    fn small_board() -> Board {
        Board::from_fish_rows(&[vec![1, 2], vec![1, 4], vec![1, 2], vec![2, 4]]).unwrap()
    }

    fn twelve_tiles() -> GameState {
        let black = [pos(0, 0), pos(2, 0), pos(4, 0), pos(6, 0)];
        let red = [pos(1, 0), pos(3, 0), pos(5, 0), pos(7, 0)];
        let board = column_board(&[1, 3, 2, 6, 5, 4, 1, 3, 2, 6, 5, 4]);
        let teams = vec![
            PenguinTeam::with_penguins(TeamColor::Black, &black, 0),
            PenguinTeam::with_penguins(TeamColor::Red, &red, 0),
        ];
        GameState::from_parts(board, teams, 0, 0).unwrap()
    }

    #[test]
    fn test_depth_changes_the_choice() {
        let board = column_board(&[1, 3, 2, 6, 5, 4]);
        let state = duel(board.clone(), &[pos(0, 0)], &[pos(1, 0)], 0);
        assert_eq!(minimax_move(&state, 6), Ok(mv((0, 0), (4, 0))));
        assert_eq!(minimax_move(&state, 2), Ok(mv((0, 0), (2, 0))));

        let other = duel(board, &[pos(0, 0)], &[pos(1, 0)], 1);
        assert_eq!(minimax_move(&other, 2), Ok(mv((1, 0), (2, 0))));
    }

    #[test]
    fn test_opponent_perspective() {
        let red_to_move = duel(small_board(), &[pos(3, 1)], &[pos(2, 1)], 1);
        assert_eq!(minimax_move(&red_to_move, 15), Ok(mv((2, 1), (1, 1))));

        let black_to_move = duel(small_board(), &[pos(3, 1)], &[pos(2, 1)], 0);
        assert_eq!(minimax_move(&black_to_move, 20), Ok(mv((3, 1), (1, 1))));
    }

    #[test]
    fn test_search_to_the_end() {
        let red_to_move = duel(small_board(), &[pos(1, 1)], &[pos(0, 0)], 1);
        assert_eq!(minimax_move(&red_to_move, 20), Ok(mv((0, 0), (2, 1))));

        let black_to_move = duel(small_board(), &[pos(1, 1)], &[pos(0, 0)], 0);
        assert_eq!(minimax_move(&black_to_move, 20), Ok(mv((1, 1), (0, 1))));
    }

    #[test]
    fn test_single_team() {
        let board = Board::from_fish_rows(&[vec![2, 1, 5], vec![5, 3, 2]]).unwrap();
        let team = PenguinTeam::with_penguins(TeamColor::Black, &[pos(1, 1)], 0);
        let state = GameState::from_parts(board, vec![team], 0, 0).unwrap();
        assert_eq!(minimax_move(&state, 1), Ok(mv((1, 1), (0, 1))));
        assert_eq!(minimax_move(&state, 20), Ok(mv((1, 1), (0, 1))));
    }

    #[test]
    fn test_twelve_tile_column() {
        let state = twelve_tiles();
        assert_eq!(minimax_move(&state, 1), Ok(mv((6, 0), (8, 0))));
        assert_eq!(minimax_move(&state, 2), Ok(mv((6, 0), (8, 0))));
        assert_eq!(minimax_move(&state, 6), Ok(mv((6, 0), (10, 0))));
        assert_eq!(minimax_move(&state, 30), Ok(mv((6, 0), (10, 0))));
    }

    #[test]
    fn test_search_is_deterministic() {
        let state = twelve_tiles();
        let first = minimax_move(&state, 4);
        assert!((0..3).all(|_| minimax_move(&state, 4) == first));
    }

    #[test]
    fn test_zero_depth() {
        assert_eq!(minimax_move(&twelve_tiles(), 0), Err(StrategyError::ZeroDepth));
    }

    #[test]
    fn test_cancelled_search() {
        let stop = AtomicBool::new(true);
        assert_eq!(
            minimax_move_until(&twelve_tiles(), 30, &stop),
            Err(StrategyError::Cancelled)
        );
        assert_eq!(
            MinimaxAI::new(3).best_move_until(&twelve_tiles(), &AtomicBool::new(false)),
            Ok(mv((6, 0), (10, 0)))
        );
    }

    #[test]
    fn test_no_legal_move() {
        let stuck = Board::from_fish_rows(&[vec![1, 0], vec![0, 0], vec![1, 1], vec![1, 1]]).unwrap();
        let skip_only = duel(stuck, &[pos(0, 0)], &[pos(2, 0)], 0);
        assert_eq!(minimax_move(&skip_only, 3), Err(StrategyError::NoLegalMove));

        let over = Board::from_fish_rows(&[vec![1, 0], vec![0, 0], vec![1, 0]]).unwrap();
        let terminal = duel(over, &[pos(0, 0)], &[pos(2, 0)], 0);
        assert_eq!(minimax_move(&terminal, 3), Err(StrategyError::NoLegalMove));
    }

    #[test]
    fn test_placement_row_major() {
        let board = Board::from_fish_rows(&[vec![1, 2], vec![0, 4], vec![1, 2], vec![0, 4]]).unwrap();
        let mut state = GameState::new(board, &[TeamColor::Black, TeamColor::Red]);
        let mut picks = Vec::new();
        for _ in 0..6 {
            let pick = placement(&state).unwrap();
            picks.push(pick);
            state = state.place_penguin(pick).unwrap();
        }
        assert_eq!(
            picks,
            vec![pos(0, 0), pos(0, 1), pos(1, 1), pos(2, 0), pos(2, 1), pos(3, 1)]
        );
        assert_eq!(placement(&state), Err(StrategyError::NoPlacement));
    }

    #[test]
    fn test_ai_levels_scale_with_teams() {
        let ai = MinimaxAI::new(3);
        assert_eq!(ai.levels(&twelve_tiles()), 6);
        assert_eq!(ai.best_move(&twelve_tiles()), Ok(mv((6, 0), (10, 0))));
        assert_eq!(MinimaxAI::default().levels_per_team, 1);
    }

    #[test]
    fn test_play_out() {
        let (end, history) = MinimaxAI::new(3).play_out(twelve_tiles()).unwrap();
        assert!(end.is_game_over());
        assert_eq!(end.scores(), vec![(TeamColor::Black, 6), (TeamColor::Red, 9)]);
        assert_eq!(history.first(), Some(&Action::Move(mv((6, 0), (10, 0)))));
        assert_eq!(end.turn() as usize, history.len());
        let black: Vec<Position> = end.team(0).unwrap().positions().collect();
        assert_eq!(black, vec![pos(0, 0), pos(2, 0), pos(4, 0), pos(8, 0)]);
    }
}
