//! Immutable game state
//!
//! A [`GameState`] is a board plus the teams in turn order, the number of
//! actions taken so far and the index of the team on duty. Every transition
//! returns a new state; nothing here mutates in place.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, BoardError, Position, Space, TileError, DIRECTIONS};
use crate::moves::{self, Move};
use crate::team::{Penguin, PenguinTeam, TeamColor};

// ============================================================================
// ERRORS
// ============================================================================

/// A proposed action or state that breaks the rules
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error(transparent)]
    Tile(#[from] TileError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("{0} is already occupied")]
    Occupied(Position),
    #[error("the team on duty has no penguin at {0}")]
    NotOwnPenguin(Position),
    #[error("{to} cannot be reached from {from}")]
    Unreachable { from: Position, to: Position },
    #[error("no team is on duty")]
    NoTeams,
    #[error("turn pointer {players_turn} is out of range for {teams} teams")]
    TurnOutOfRange { players_turn: usize, teams: usize },
    #[error("more than one penguin on {0}")]
    Overlap(Position),
    #[error("color {0} is used by more than one team")]
    DuplicateColor(TeamColor),
    #[error("no team at index {0}")]
    UnknownTeam(usize),
    #[error("action {0} of the sequence is not legal")]
    IllegalAction(usize),
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Snapshots are checked by [`GameState::from_parts`] when deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameState")]
pub struct GameState {
    board: Board,
    teams: Vec<PenguinTeam>,
    turn: u32,
    players_turn: usize,
}

#[derive(Deserialize)]
struct RawGameState {
    board: Board,
    teams: Vec<PenguinTeam>,
    turn: u32,
    players_turn: usize,
}

impl TryFrom<RawGameState> for GameState {
    type Error = RuleError;

    fn try_from(raw: RawGameState) -> Result<Self, Self::Error> {
        GameState::from_parts(raw.board, raw.teams, raw.turn, raw.players_turn)
    }
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Fresh state with one empty team per color, in the given order
    pub fn new(board: Board, colors: &[TeamColor]) -> Self {
        Self {
            board,
            teams: colors.iter().copied().map(PenguinTeam::new).collect(),
            turn: 0,
            players_turn: 0,
        }
    }

    /// Arbitrary state, checked for consistency
    pub fn from_parts(
        board: Board,
        teams: Vec<PenguinTeam>,
        turn: u32,
        players_turn: usize,
    ) -> Result<Self, RuleError> {
        if players_turn > 0 && players_turn >= teams.len() {
            return Err(RuleError::TurnOutOfRange {
                players_turn,
                teams: teams.len(),
            });
        }

        let mut colors = FxHashSet::default();
        let mut seen = FxHashSet::default();
        for team in &teams {
            if !colors.insert(team.color) {
                return Err(RuleError::DuplicateColor(team.color));
            }
            for pos in team.positions() {
                board.validate_tile(pos)?;
                if !seen.insert(pos) {
                    return Err(RuleError::Overlap(pos));
                }
            }
        }

        Ok(Self {
            board,
            teams,
            turn,
            players_turn,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Teams in turn order
    pub fn teams(&self) -> &[PenguinTeam] {
        &self.teams
    }

    /// Number of placements, moves and skips taken so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Index of the team on duty
    pub fn players_turn(&self) -> usize {
        self.players_turn
    }

    pub fn current_team(&self) -> Option<&PenguinTeam> {
        self.teams.get(self.players_turn)
    }

    pub fn team(&self, index: usize) -> Option<&PenguinTeam> {
        self.teams.get(index)
    }

    pub fn team_index(&self, color: TeamColor) -> Option<usize> {
        self.teams.iter().position(|t| t.color == color)
    }

    /// Color and score of every team, in turn order
    pub fn scores(&self) -> Vec<(TeamColor, u32)> {
        self.teams.iter().map(|t| (t.color, t.score)).collect()
    }

    /// Color of the penguin standing on `pos`, if any
    pub fn penguin_at(&self, pos: Position) -> Option<TeamColor> {
        self.teams
            .iter()
            .find(|t| t.has_penguin_at(pos))
            .map(|t| t.color)
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.penguin_at(pos).is_some()
    }

    pub(crate) fn occupied(&self) -> FxHashSet<Position> {
        self.teams.iter().flat_map(|t| t.positions()).collect()
    }

    fn next_turn(&self) -> usize {
        if self.teams.is_empty() {
            0
        } else {
            (self.players_turn + 1) % self.teams.len()
        }
    }

    // ========================================================================
    // LEGALITY
    // ========================================================================

    /// Placement must land on an empty active tile
    pub fn is_valid_placement(&self, pos: Position) -> Result<(), RuleError> {
        self.board.validate_tile(pos)?;
        if self.is_occupied(pos) {
            return Err(RuleError::Occupied(pos));
        }
        Ok(())
    }

    /// Move must start on a penguin of the team on duty and slide to a
    /// reachable empty tile
    pub fn is_valid_move(&self, mv: Move) -> Result<(), RuleError> {
        let team = self.current_team().ok_or(RuleError::NoTeams)?;
        if !team.has_penguin_at(mv.from) {
            return Err(RuleError::NotOwnPenguin(mv.from));
        }
        self.board.validate_tile(mv.to)?;
        if self.is_occupied(mv.to) {
            return Err(RuleError::Occupied(mv.to));
        }
        if !moves::destinations(self, mv.from).contains(&mv.to) {
            return Err(RuleError::Unreachable {
                from: mv.from,
                to: mv.to,
            });
        }
        Ok(())
    }

    /// At least one neighbouring tile is free
    pub fn can_penguin_move(&self, pos: Position) -> bool {
        let occupied = self.occupied();
        self.penguin_can_step(pos, &occupied)
    }

    pub fn can_team_move(&self, index: usize) -> bool {
        let occupied = self.occupied();
        self.team_can_step(index, &occupied)
    }

    /// Any team has a legal move; false means the game is over
    pub fn can_any_penguin_move(&self) -> bool {
        let occupied = self.occupied();
        (0..self.teams.len()).any(|i| self.team_can_step(i, &occupied))
    }

    pub fn is_game_over(&self) -> bool {
        !self.can_any_penguin_move()
    }

    fn team_can_step(&self, index: usize, occupied: &FxHashSet<Position>) -> bool {
        self.teams.get(index).is_some_and(|team| {
            team.positions()
                .any(|pos| self.penguin_can_step(pos, occupied))
        })
    }

    fn penguin_can_step(&self, pos: Position, occupied: &FxHashSet<Position>) -> bool {
        DIRECTIONS.iter().any(|&dir| {
            let next = pos.neighbor(dir);
            matches!(self.board.space(next), Some(Space::Tile { .. })) && !occupied.contains(&next)
        })
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Place a penguin for the team on duty and pass the turn
    pub fn place_penguin(&self, pos: Position) -> Result<Self, RuleError> {
        if self.teams.is_empty() {
            return Err(RuleError::NoTeams);
        }
        self.is_valid_placement(pos)?;
        let mut next = self.clone();
        next.teams[self.players_turn].penguins.push(Penguin::new(pos));
        next.players_turn = self.next_turn();
        next.turn += 1;
        Ok(next)
    }

    /// Apply a validated move for the team on duty
    pub fn move_penguin(&self, mv: Move) -> Result<Self, RuleError> {
        self.is_valid_move(mv)?;
        self.relocate(mv)
    }

    /// Apply a move already known to be legal
    ///
    /// Credits the fish on `from` to the team on duty, turns `from` into a
    /// hole and passes the turn.
    pub(crate) fn relocate(&self, mv: Move) -> Result<Self, RuleError> {
        let fish = self.board.fish_at(mv.from);
        let mut next = self.clone();
        next.board = self.board.remove_tile(mv.from)?;
        let team = next
            .teams
            .get_mut(self.players_turn)
            .ok_or(RuleError::NoTeams)?;
        if let Some(penguin) = team.penguins.iter_mut().find(|p| p.position == mv.from) {
            penguin.position = mv.to;
        }
        team.score += fish;
        next.players_turn = self.next_turn();
        next.turn += 1;
        Ok(next)
    }

    /// Pass the turn without changing board or teams
    pub fn skip_turn(&self) -> Result<Self, RuleError> {
        if self.teams.is_empty() {
            return Err(RuleError::NoTeams);
        }
        let mut next = self.clone();
        next.players_turn = self.next_turn();
        next.turn += 1;
        Ok(next)
    }

    /// Drop a team, keeping the turn pointer on the team that was due next
    pub fn remove_team(&self, index: usize) -> Result<Self, RuleError> {
        if index >= self.teams.len() {
            return Err(RuleError::UnknownTeam(index));
        }
        let mut next = self.clone();
        if index == self.players_turn && self.players_turn == self.teams.len() - 1 {
            next.players_turn = 0;
        } else if self.players_turn > index {
            next.players_turn -= 1;
        }
        next.teams.remove(index);
        Ok(next)
    }

    /// Turn more positions into holes; none may be under a penguin
    pub fn add_holes(&self, holes: &[Position]) -> Result<Self, RuleError> {
        if let Some(&pos) = holes.iter().find(|&&pos| self.is_occupied(pos)) {
            return Err(RuleError::Occupied(pos));
        }
        let mut next = self.clone();
        next.board = self.board.add_holes(holes)?;
        Ok(next)
    }
}

// ============================================================================
// TESTS
// ============================================================================
