//! Teams and their penguins

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Position;

/// Penguins per team in a one-player game; each extra player takes one away
pub const BASE_TEAM_SIZE: usize = 6;

/// Team colors, assigned to players in turn order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamColor {
    Black,
    Red,
    White,
    Brown,
}

/// Default color palette
pub const PALETTE: [TeamColor; 4] = [
    TeamColor::Black,
    TeamColor::Red,
    TeamColor::White,
    TeamColor::Brown,
];

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TeamColor::Black => "black",
            TeamColor::Red => "red",
            TeamColor::White => "white",
            TeamColor::Brown => "brown",
        };
        f.write_str(name)
    }
}

/// Penguins each player places in a game of `players`
pub fn penguins_per_player(players: usize) -> usize {
    BASE_TEAM_SIZE.saturating_sub(players)
}

/// A single piece on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Penguin {
    pub position: Position,
}

impl Penguin {
    pub const fn new(position: Position) -> Self {
        Self { position }
    }
}

/// One player's pieces and score
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenguinTeam {
    pub color: TeamColor,
    pub penguins: Vec<Penguin>,
    pub score: u32,
}

impl PenguinTeam {
    /// Empty team with no score
    pub fn new(color: TeamColor) -> Self {
        Self {
            color,
            penguins: Vec::new(),
            score: 0,
        }
    }

    /// Team with penguins already on the given positions
    pub fn with_penguins(color: TeamColor, positions: &[Position], score: u32) -> Self {
        Self {
            color,
            penguins: positions.iter().copied().map(Penguin::new).collect(),
            score,
        }
    }

    pub fn has_penguin_at(&self, pos: Position) -> bool {
        self.penguins.iter().any(|p| p.position == pos)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.penguins.iter().map(|p| p.position)
    }
}
