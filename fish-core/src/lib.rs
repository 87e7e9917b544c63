//! Fish Core - Rules engine and AI
//!
//! This crate provides the core game logic for Fish:
//! - Board geometry (doubled hex-offset grid of tiles and holes)
//! - Penguins, teams and the immutable game state
//! - Sliding move generation and validation
//! - Lazy game-tree expansion
//! - Fixed-depth minimax AI with deterministic tie-breaking

pub mod board;
pub mod team;
pub mod game;
pub mod moves;
pub mod tree;
pub mod strategy;

// Re-exports for convenient access
pub use board::{
    hole_budget, Board, BoardConfig, BoardError, Direction, Position, Space, TileError,
    DEFAULT_MAX_FISH, DIRECTIONS,
};
pub use team::{penguins_per_player, Penguin, PenguinTeam, TeamColor, BASE_TEAM_SIZE, PALETTE};
pub use game::{GameState, RuleError};
pub use moves::{destinations, destinations_by_direction, legal_moves, team_moves, Move};
pub use tree::{generate_children, query, Action, GameTree};
pub use strategy::{minimax_move, minimax_move_until, placement, MinimaxAI, StrategyError};
