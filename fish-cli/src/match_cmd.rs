//! Play command - run matches between house players
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: play_single_game()
//! - Level 4: configuration and formatting utilities

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use fish_referee::{order_players, HousePlayer, MatchSummary, PlayerRef, Referee, RefereeConfig};
use serde::Serialize;
use tokio::task::JoinSet;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Comma-separated player names (seated by name)
    #[arg(long, value_delimiter = ',', default_value = "alice,bob")]
    pub players: Vec<String>,

    /// Board rows
    #[arg(long, default_value = "5")]
    pub rows: usize,

    /// Board columns
    #[arg(long, default_value = "5")]
    pub columns: usize,

    /// Maximum fish on a generated tile
    #[arg(long, default_value = "5")]
    pub max_fish: u32,

    /// Minimax levels per team still in the game
    #[arg(long, default_value = "1")]
    pub levels_per_team: u32,

    /// Time each player has per placement or move, in milliseconds
    #[arg(long, default_value = "5000")]
    pub timeout_ms: u64,

    /// Number of independent games, run concurrently
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    game_number: usize,
    #[serde(flatten)]
    summary: MatchSummary,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Play every game concurrently
/// 2. Report results in game order
pub async fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting {} game(s): {} on {}x{} (levels per team={})",
        args.games,
        args.players.join(", "),
        args.rows,
        args.columns,
        args.levels_per_team
    );

    let records = play_games(&args, seed).await?;
    report_results(&records, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

async fn play_games(args: &PlayArgs, seed: Option<u64>) -> Result<Vec<GameRecord>> {
    let mut set = JoinSet::new();
    for index in 0..args.games {
        let referee = Referee::new(referee_config(args, seed, index));
        let players = house_players(&args.players, args.levels_per_team);
        set.spawn(play_single_game(referee, players, index + 1));
    }

    let mut records = Vec::with_capacity(args.games);
    while let Some(joined) = set.join_next().await {
        let record = joined.context("game task failed")??;
        tracing::info!(
            "Game {}: winners {:?} after {} turns",
            record.game_number,
            record
                .summary
                .winners
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>(),
            record.summary.turns
        );
        records.push(record);
    }
    records.sort_by_key(|r| r.game_number);
    Ok(records)
}

fn report_results(records: &[GameRecord], args: &PlayArgs) -> Result<()> {
    if args.json {
        let json = serde_json::to_string_pretty(records).context("failed to serialize results")?;
        println!("{json}");
    } else {
        for record in records {
            println!("\n=== Game {} ===", record.game_number);
            println!("{}", record.summary);
        }
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

async fn play_single_game(referee: Referee, players: Vec<PlayerRef>, game_number: usize) -> Result<GameRecord> {
    let report = referee
        .run_match(order_players(players))
        .await
        .with_context(|| format!("game {game_number} could not be played"))?;
    Ok(GameRecord {
        game_number,
        summary: report.summary(),
    })
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Per-game config; seeded runs give each game its own derived seed
fn referee_config(args: &PlayArgs, seed: Option<u64>, index: usize) -> RefereeConfig {
    let config = RefereeConfig::default()
        .with_board_size(args.rows, args.columns)
        .with_max_fish(args.max_fish)
        .with_action_timeout(Duration::from_millis(args.timeout_ms));
    match seed {
        Some(seed) => config.with_seed(seed.wrapping_add(index as u64)),
        None => config,
    }
}

fn house_players(names: &[String], levels_per_team: u32) -> Vec<PlayerRef> {
    names
        .iter()
        .map(|name| {
            Arc::new(HousePlayer::new(name.as_str()).with_levels_per_team(levels_per_team)) as PlayerRef
        })
        .collect()
}
