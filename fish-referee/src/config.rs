//! Referee configuration
//!
//! Level 4 - Utilities and configuration

use std::time::Duration;

use fish_core::{TeamColor, DEFAULT_MAX_FISH, PALETTE};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Limits and defaults for running matches
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefereeConfig {
    /// Time a player has to propose a placement or move
    pub action_timeout: Duration,
    /// Time a player has to acknowledge a notification
    pub notify_timeout: Duration,
    /// Fewest players a match may start with
    pub min_players: usize,
    /// Most players a match may start with (also capped by the palette)
    pub max_players: usize,
    /// Colors handed out in turn order
    pub palette: Vec<TeamColor>,
    /// Board size used when no board is supplied
    pub rows: usize,
    pub columns: usize,
    /// Upper bound of the random fish count per tile
    pub max_fish: u32,
    /// Random seed for board generation (None = entropy)
    pub seed: Option<u64>,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_secs(5),
            notify_timeout: Duration::from_secs(5),
            min_players: 2,
            max_players: 4,
            palette: PALETTE.to_vec(),
            rows: 5,
            columns: 5,
            max_fish: DEFAULT_MAX_FISH,
            seed: None,
        }
    }
}

impl RefereeConfig {
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn with_player_bounds(mut self, min_players: usize, max_players: usize) -> Self {
        self.min_players = min_players;
        self.max_players = max_players;
        self
    }

    pub fn with_palette(mut self, palette: Vec<TeamColor>) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_board_size(mut self, rows: usize, columns: usize) -> Self {
        self.rows = rows;
        self.columns = columns;
        self
    }

    pub fn with_max_fish(mut self, max_fish: u32) -> Self {
        self.max_fish = max_fish;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Largest player count the palette and bounds allow
    pub fn effective_max_players(&self) -> usize {
        self.max_players.min(self.palette.len())
    }

    pub fn accepts_player_count(&self, players: usize) -> bool {
        (self.min_players..=self.effective_max_players()).contains(&players)
    }

    pub(crate) fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}
