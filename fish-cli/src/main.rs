//! Fish CLI - Command-line interface
//!
//! Commands:
//! - play: Run one or more matches between house players
//! - board: Generate a board for a player count and print it as JSON

mod match_cmd;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fish_core::{hole_budget, Board, DEFAULT_MAX_FISH};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use match_cmd::PlayArgs;

#[derive(Parser)]
#[command(name = "fish")]
#[command(about = "Referee and minimax players for the penguin fish game")]
struct Cli {
    /// Random seed for reproducible boards
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run matches between house players
    Play(PlayArgs),
    /// Print a generated board
    Board {
        #[arg(long, default_value = "5")]
        rows: usize,
        #[arg(long, default_value = "5")]
        columns: usize,
        #[arg(long, default_value = "2")]
        players: usize,
        #[arg(long, default_value_t = DEFAULT_MAX_FISH)]
        max_fish: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => match_cmd::run(args, cli.seed).await,
        Commands::Board {
            rows,
            columns,
            players,
            max_fish,
        } => print_board(rows, columns, players, max_fish, cli.seed),
    }
}

fn print_board(rows: usize, columns: usize, players: usize, max_fish: u32, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    tracing::info!(
        "Generating {}x{} board for {} players ({} holes)",
        rows,
        columns,
        players,
        hole_budget(rows, columns, players)
    );
    let board = Board::for_players(rows, columns, players, max_fish, &mut rng)
        .context("failed to generate board")?;
    println!("{}", serde_json::to_string_pretty(&board)?);
    Ok(())
}
