//! End-of-match reporting

use std::fmt;

use fish_core::{GameState, TeamColor};
use serde::{Deserialize, Serialize};

use crate::player::PlayerRef;

/// A player who finished the match, with the team it played
#[derive(Clone)]
pub struct PlayerResult {
    pub player: PlayerRef,
    pub color: TeamColor,
    pub score: u32,
}

impl fmt::Debug for PlayerResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerResult")
            .field("player", &self.player.name())
            .field("color", &self.color)
            .field("score", &self.score)
            .finish()
    }
}

impl PlayerResult {
    fn standing(&self) -> Standing {
        Standing {
            name: self.player.name().to_string(),
            color: self.color,
            score: self.score,
        }
    }
}

/// Outcome of one match
///
/// Winners and losers are listed in turn order. Ejected players appear only
/// in `kicked`, in the order they were removed.
#[derive(Clone)]
pub struct GameEndReport {
    pub winners: Vec<PlayerResult>,
    pub losers: Vec<PlayerResult>,
    pub kicked: Vec<PlayerRef>,
    pub final_state: GameState,
}

impl fmt::Debug for GameEndReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEndReport")
            .field("winners", &self.winners)
            .field("losers", &self.losers)
            .field("kicked", &self.kicked_names())
            .field("turn", &self.final_state.turn())
            .finish()
    }
}

impl GameEndReport {
    pub fn winner_names(&self) -> Vec<&str> {
        self.winners.iter().map(|r| r.player.name()).collect()
    }

    pub fn loser_names(&self) -> Vec<&str> {
        self.losers.iter().map(|r| r.player.name()).collect()
    }

    pub fn kicked_names(&self) -> Vec<&str> {
        self.kicked.iter().map(|p| p.name()).collect()
    }

    /// Serializable snapshot of the outcome
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            winners: self.winners.iter().map(PlayerResult::standing).collect(),
            losers: self.losers.iter().map(PlayerResult::standing).collect(),
            kicked: self.kicked.iter().map(|p| p.name().to_string()).collect(),
            turns: self.final_state.turn(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub color: TeamColor,
    pub score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub winners: Vec<Standing>,
    pub losers: Vec<Standing>,
    pub kicked: Vec<String>,
    pub turns: u32,
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |standings: &[Standing]| {
            standings
                .iter()
                .map(|s| format!("{} ({}, {})", s.name, s.color, s.score))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "Winners: {}", list(&self.winners))?;
        writeln!(f, "Losers:  {}", list(&self.losers))?;
        writeln!(f, "Kicked:  {}", self.kicked.join(", "))?;
        write!(f, "Turns:   {}", self.turns)
    }
}
