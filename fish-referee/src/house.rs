//! Built-in minimax player

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use fish_core::{GameState, MinimaxAI, Move, Position};

use crate::player::Player;

/// Player backed by [`MinimaxAI`]
///
/// Searches run on the blocking pool and stop as soon as the proposal is
/// dropped, e.g. when the referee's timeout aborts it.
///
/// The default is one search level per team in the game, shallower than the
/// classic three: a full-width search of `3 * teams` levels on a 5x5 board
/// does not finish inside the default 5 s action timeout. Use
/// [`with_levels_per_team`](Self::with_levels_per_team) for deeper play on
/// small boards.
#[derive(Clone, Debug)]
pub struct HousePlayer {
    name: String,
    age: u32,
    ai: MinimaxAI,
}

impl HousePlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: 0,
            ai: MinimaxAI::default(),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    /// Search depth per team still in the game
    pub fn with_levels_per_team(mut self, levels_per_team: u32) -> Self {
        self.ai = MinimaxAI::new(levels_per_team);
        self
    }

    pub fn ai(&self) -> MinimaxAI {
        self.ai
    }
}

#[async_trait]
impl Player for HousePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn age(&self) -> u32 {
        self.age
    }

    async fn propose_placement(&self, state: &GameState) -> Result<Position> {
        Ok(self.ai.place(state)?)
    }

    async fn propose_move(&self, state: &GameState) -> Result<Move> {
        let ai = self.ai;
        let state = state.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let _guard = StopOnDrop(stop.clone());
        let mv = tokio::task::spawn_blocking(move || ai.best_move_until(&state, &stop)).await??;
        Ok(mv)
    }
}

/// Raises the flag when dropped, cancelling a search that nobody awaits
struct StopOnDrop(Arc<AtomicBool>);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fish_core::{Board, PenguinTeam, TeamColor};

    fn pos(row: i32, column: i32) -> Position {
        Position::new(row, column)
    }

    #[tokio::test]
    async fn test_house_player_places_row_major() {
        let board = Board::from_fish_rows(&[vec![0, 2], vec![1, 1]]).unwrap();
        let state = GameState::new(board, &[TeamColor::Black, TeamColor::Red]);
        let player = HousePlayer::new("house");
        assert_eq!(player.propose_placement(&state).await.unwrap(), pos(0, 1));
    }

    #[tokio::test]
    async fn test_house_player_moves_with_scaled_depth() {
        let rows: Vec<Vec<u32>> = [1, 3, 2, 6, 5, 4, 1, 3, 2, 6, 5, 4]
            .iter()
            .map(|&f| vec![f])
            .collect();
        let board = Board::from_fish_rows(&rows).unwrap();
        let teams = vec![
            PenguinTeam::with_penguins(
                TeamColor::Black,
                &[pos(0, 0), pos(2, 0), pos(4, 0), pos(6, 0)],
                0,
            ),
            PenguinTeam::with_penguins(
                TeamColor::Red,
                &[pos(1, 0), pos(3, 0), pos(5, 0), pos(7, 0)],
                0,
            ),
        ];
        let state = GameState::from_parts(board, teams, 8, 0).unwrap();

        let shallow = HousePlayer::new("one");
        assert_eq!(shallow.ai().levels_per_team, 1);
        assert_eq!(
            shallow.propose_move(&state).await.unwrap(),
            Move::new(pos(6, 0), pos(8, 0))
        );
        let deep = HousePlayer::new("three").with_levels_per_team(3);
        assert_eq!(deep.ai().levels(&state), 6);
        assert_eq!(
            deep.propose_move(&state).await.unwrap(),
            Move::new(pos(6, 0), pos(10, 0))
        );
    }

    #[tokio::test]
    async fn test_house_player_reports_stuck_team() {
        let board = Board::from_fish_rows(&[vec![1, 0], vec![0, 0], vec![1, 0]]).unwrap();
        let teams = vec![
            PenguinTeam::with_penguins(TeamColor::Black, &[pos(0, 0)], 0),
            PenguinTeam::with_penguins(TeamColor::Red, &[pos(2, 0)], 0),
        ];
        let state = GameState::from_parts(board, teams, 0, 0).unwrap();
        assert!(HousePlayer::new("stuck").propose_move(&state).await.is_err());
    }

    #[tokio::test]
    async fn test_abandoned_search_is_cancelled() {
        let stop = Arc::new(AtomicBool::new(false));
        let worker = stop.clone();
        let search = tokio::task::spawn_blocking(move || {
            while !worker.load(Ordering::Relaxed) {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        });
        drop(StopOnDrop(stop.clone()));
        search.await.unwrap();
        assert!(stop.load(Ordering::Relaxed));
    }
}
