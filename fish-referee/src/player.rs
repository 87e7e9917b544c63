//! Player trait
//!
//! Anything the referee can seat at the table: the built-in
//! [`HousePlayer`](crate::HousePlayer), a network adapter, a test double.
//! Every call is bounded by the referee's timeouts and runs on its own task,
//! so implementations must be `Send + Sync`.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use fish_core::{GameState, Move, Position, TeamColor};

#[async_trait]
pub trait Player: Send + Sync {
    /// Display name, also the tie-break when ordering players
    fn name(&self) -> &str;

    /// Age used to order players (youngest first)
    fn age(&self) -> u32 {
        0
    }

    /// Color assignment, the full turn order and the starting state
    async fn setup(&self, _color: TeamColor, _turn_order: &[TeamColor], _state: &GameState) -> Result<()> {
        Ok(())
    }

    /// Where the team on duty places its next penguin
    async fn propose_placement(&self, state: &GameState) -> Result<Position>;

    /// Placement is over; movement begins from this state
    async fn game_starting(&self, _state: &GameState) -> Result<()> {
        Ok(())
    }

    /// Move for the team on duty
    async fn propose_move(&self, state: &GameState) -> Result<Move>;

    /// Some action was accepted or a player was removed
    async fn state_changed(&self, _state: &GameState) -> Result<()> {
        Ok(())
    }

    /// This player broke a rule and left the game
    async fn kicked(&self) -> Result<()> {
        Ok(())
    }

    async fn game_over(&self, _won: bool) -> Result<()> {
        Ok(())
    }
}

/// Shared handle the referee keeps for each seat
pub type PlayerRef = Arc<dyn Player>;

/// Sort players by age, then by name
pub fn order_players(mut players: Vec<PlayerRef>) -> Vec<PlayerRef> {
    players.sort_by(|a, b| a.age().cmp(&b.age()).then_with(|| a.name().cmp(b.name())));
    players
}
