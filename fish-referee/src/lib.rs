//! Fish Referee - Runs complete matches between player actors
//!
//! This crate provides match infrastructure:
//! - The asynchronous player contract and a built-in minimax player
//! - Setup, placement and movement phases with per-call timeouts
//! - Ejection of players that break the rules, fail or stall
//! - End-of-match reports
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_match (orchestration)
//! - Level 2: setup, placement_phase, movement_phase, finish (phases)
//! - Level 3: solicit, eject, notice posting (single player calls)
//! - Level 4: bounded task execution, per-player notice couriers, configuration

mod config;
mod house;
mod notice;
mod player;
mod referee;
mod report;

pub use config::RefereeConfig;
pub use house::HousePlayer;
pub use player::{order_players, Player, PlayerRef};
pub use referee::{ActionError, Match, Phase, Referee, RefereeError, Seat};
pub use report::{GameEndReport, MatchSummary, PlayerResult, Standing};
