//! Hex board geometry with doubled offset coordinates
//!
//! Rows are stacked half a hex apart, so a tile's vertical neighbours are two
//! rows away and its four diagonal neighbours are one row away, with a column
//! shift that depends on the parity of the row:
//!
//! ```text
//!    _____         _____
//!   /     \       /     \
//!  /  0,0  \_____/  0,1  \_____
//!  \       /     \       /     \
//!   \_____/  1,0  \_____/  1,1  \
//!   /     \       /     \       /
//!  /  2,0  \_____/  2,1  \_____/
//!  \       /     \       /     \
//!   \_____/  3,0  \_____/  3,1  \
//!         \       /     \       /
//!          \_____/       \_____/
//! ```

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::team::BASE_TEAM_SIZE;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default maximum fish on a generated tile
pub const DEFAULT_MAX_FISH: u32 = 5;

/// Spare tiles per generated hole
const TILES_PER_HOLE: usize = 5;

// ============================================================================
// ERRORS
// ============================================================================

/// Why a position does not resolve to an active tile
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("coordinates of {0} are not natural numbers")]
    NotNatural(Position),
    #[error("no space at {0}")]
    OutOfRange(Position),
    #[error("no active tile at {0}")]
    Hole(Position),
}

/// Board construction failures
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("rows and columns must be positive, got {rows}x{columns}")]
    InvalidDimensions { rows: usize, columns: usize },
    #[error("fish per tile must be a positive integer")]
    InvalidFish,
    #[error("hole {0} is outside the board")]
    HoleOutOfRange(Position),
    #[error("{holes} holes leave no room for {min_active} active tiles among {capacity} spaces")]
    NotEnoughTiles {
        holes: usize,
        min_active: usize,
        capacity: usize,
    },
    #[error("{rows}x{columns} board needs {expected} spaces, found {found}")]
    SpaceCount {
        rows: usize,
        columns: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row} has {found} spaces, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

// ============================================================================
// POSITIONS AND DIRECTIONS
// ============================================================================

/// Board coordinates
///
/// Signed so that proposals from players can carry negative coordinates;
/// those are rejected by [`Board::validate_tile`] as [`TileError::NotNatural`].
/// Ordering is row first, then column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub column: i32,
}

impl Position {
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Both coordinates are natural numbers
    pub fn is_natural(&self) -> bool {
        self.row >= 0 && self.column >= 0
    }

    /// Adjacent position in the given direction (may be off the board)
    pub fn neighbor(&self, direction: Direction) -> Position {
        let even_row = self.row.rem_euclid(2) == 0;
        let (dr, dc) = match direction {
            Direction::Up => (-2, 0),
            Direction::Down => (2, 0),
            Direction::UpLeft => (-1, if even_row { -1 } else { 0 }),
            Direction::UpRight => (-1, if even_row { 0 } else { 1 }),
            Direction::DownLeft => (1, if even_row { -1 } else { 0 }),
            Direction::DownRight => (1, if even_row { 0 } else { 1 }),
        };
        Position::new(self.row + dr, self.column + dc)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// The six hex directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    Down,
}

/// Directions in move-generation order
pub const DIRECTIONS: [Direction; 6] = [
    Direction::Up,
    Direction::UpLeft,
    Direction::UpRight,
    Direction::DownLeft,
    Direction::DownRight,
    Direction::Down,
];

// ============================================================================
// SPACES
// ============================================================================

/// A board cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Space {
    Hole,
    Tile { fish: u32 },
}

impl Space {
    /// Fish on this space (0 for a hole)
    pub fn fish(&self) -> u32 {
        match self {
            Space::Hole => 0,
            Space::Tile { fish } => *fish,
        }
    }

    pub fn is_hole(&self) -> bool {
        matches!(self, Space::Hole)
    }
}

// ============================================================================
// BOARD CONFIGURATION
// ============================================================================

/// Parameters for [`Board::create`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: usize,
    pub columns: usize,
    /// Positions turned into holes (duplicates allowed)
    pub holes: Vec<Position>,
    /// Fish per tile, or the upper bound when randomized
    pub max_fish: u32,
    /// Minimum number of tiles that must stay active
    pub min_active_tiles: usize,
    /// Draw each tile's fish uniformly from 1..=max_fish
    pub randomize_fish: bool,
}

impl BoardConfig {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            holes: Vec::new(),
            max_fish: DEFAULT_MAX_FISH,
            min_active_tiles: 0,
            randomize_fish: false,
        }
    }

    pub fn with_holes(mut self, holes: Vec<Position>) -> Self {
        self.holes = holes;
        self
    }

    pub fn with_max_fish(mut self, max_fish: u32) -> Self {
        self.max_fish = max_fish;
        self
    }

    pub fn with_min_active_tiles(mut self, min_active_tiles: usize) -> Self {
        self.min_active_tiles = min_active_tiles;
        self
    }

    pub fn randomized(mut self) -> Self {
        self.randomize_fish = true;
        self
    }

    fn validate(&self) -> Result<(), BoardError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(BoardError::InvalidDimensions {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.max_fish == 0 {
            return Err(BoardError::InvalidFish);
        }
        if let Some(hole) = self
            .holes
            .iter()
            .find(|hole| !in_range(self.rows, self.columns, **hole))
        {
            return Err(BoardError::HoleOutOfRange(*hole));
        }
        let capacity = self.rows * self.columns;
        if self.holes.len() + self.min_active_tiles > capacity {
            return Err(BoardError::NotEnoughTiles {
                holes: self.holes.len(),
                min_active: self.min_active_tiles,
                capacity,
            });
        }
        Ok(())
    }
}

/// Number of holes to scatter on a board for the given player count
///
/// One hole per five tiles left over once every player has room for
/// `6 - players` penguins.
pub fn hole_budget(rows: usize, columns: usize, players: usize) -> usize {
    let reserved = players * BASE_TEAM_SIZE.saturating_sub(players);
    (rows * columns).saturating_sub(reserved) / TILES_PER_HOLE
}

fn in_range(rows: usize, columns: usize, pos: Position) -> bool {
    pos.is_natural() && (pos.row as usize) < rows && (pos.column as usize) < columns
}

// ============================================================================
// BOARD
// ============================================================================

/// Rectangular grid of spaces, stored row-major
///
/// Boards are values: every mutation returns a new board. Deserialization
/// goes through the same checks as construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    rows: usize,
    columns: usize,
    spaces: Vec<Space>,
}

/// Unchecked wire form of [`Board`]
#[derive(Deserialize)]
struct RawBoard {
    rows: usize,
    columns: usize,
    spaces: Vec<Space>,
}

impl TryFrom<RawBoard> for Board {
    type Error = BoardError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        let RawBoard { rows, columns, spaces } = raw;
        if rows == 0 || columns == 0 {
            return Err(BoardError::InvalidDimensions { rows, columns });
        }
        let expected = rows.checked_mul(columns).unwrap_or(usize::MAX);
        if spaces.len() != expected {
            return Err(BoardError::SpaceCount {
                rows,
                columns,
                expected,
                found: spaces.len(),
            });
        }
        if spaces.iter().any(|space| matches!(space, Space::Tile { fish: 0 })) {
            return Err(BoardError::InvalidFish);
        }
        Ok(Board { rows, columns, spaces })
    }
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Build a board from a validated configuration
    pub fn create<R: Rng + ?Sized>(config: &BoardConfig, rng: &mut R) -> Result<Self, BoardError> {
        config.validate()?;
        let spaces = (0..config.rows * config.columns)
            .map(|_| {
                let fish = if config.randomize_fish {
                    rng.gen_range(1..=config.max_fish)
                } else {
                    config.max_fish
                };
                Space::Tile { fish }
            })
            .collect();
        let board = Board {
            rows: config.rows,
            columns: config.columns,
            spaces,
        };
        board.add_holes(&config.holes)
    }

    /// Board with no holes and the same fish on every tile
    pub fn uniform(rows: usize, columns: usize, fish: u32) -> Result<Self, BoardError> {
        let config = BoardConfig::new(rows, columns).with_max_fish(fish);
        config.validate()?;
        Ok(Board {
            rows,
            columns,
            spaces: vec![Space::Tile { fish }; rows * columns],
        })
    }

    /// Board from literal fish counts, one inner vector per row (0 = hole)
    pub fn from_fish_rows(fish_rows: &[Vec<u32>]) -> Result<Self, BoardError> {
        let rows = fish_rows.len();
        let columns = fish_rows.first().map_or(0, Vec::len);
        if rows == 0 || columns == 0 {
            return Err(BoardError::InvalidDimensions { rows, columns });
        }
        let mut spaces = Vec::with_capacity(rows * columns);
        for (row, fish_row) in fish_rows.iter().enumerate() {
            if fish_row.len() != columns {
                return Err(BoardError::RaggedRow {
                    row,
                    expected: columns,
                    found: fish_row.len(),
                });
            }
            spaces.extend(fish_row.iter().map(|&fish| match fish {
                0 => Space::Hole,
                fish => Space::Tile { fish },
            }));
        }
        Ok(Board { rows, columns, spaces })
    }

    /// Smallest square board holding the holes plus `min_tiles` one-fish tiles
    pub fn with_minimum_tiles(holes: &[Position], min_tiles: usize) -> Result<Self, BoardError> {
        let total = holes.len() + min_tiles;
        let mut side = 0;
        while side * side < total {
            side += 1;
        }
        let config = BoardConfig::new(side, side)
            .with_holes(holes.to_vec())
            .with_max_fish(1)
            .with_min_active_tiles(min_tiles);
        config.validate()?;
        Board::uniform(side, side, 1)?.add_holes(holes)
    }

    /// Randomized board with room for every player's penguins
    ///
    /// Scatters [`hole_budget`] holes at random (possibly repeated) positions
    /// and draws each tile's fish from `1..=max_fish`.
    pub fn for_players<R: Rng + ?Sized>(
        rows: usize,
        columns: usize,
        players: usize,
        max_fish: u32,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        if rows == 0 || columns == 0 {
            return Err(BoardError::InvalidDimensions { rows, columns });
        }
        let holes = (0..hole_budget(rows, columns, players))
            .map(|_| {
                Position::new(
                    rng.gen_range(0..rows) as i32,
                    rng.gen_range(0..columns) as i32,
                )
            })
            .collect();
        let config = BoardConfig::new(rows, columns)
            .with_holes(holes)
            .with_max_fish(max_fish)
            .with_min_active_tiles(players * BASE_TEAM_SIZE.saturating_sub(players))
            .randomized();
        Board::create(&config, rng)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Raw space at a position, or None off the board
    pub fn space(&self, pos: Position) -> Option<Space> {
        self.index(pos).map(|i| self.spaces[i])
    }

    /// Ensure the position resolves to an in-bounds, non-hole tile
    pub fn validate_tile(&self, pos: Position) -> Result<(), TileError> {
        if !pos.is_natural() {
            return Err(TileError::NotNatural(pos));
        }
        match self.space(pos) {
            None => Err(TileError::OutOfRange(pos)),
            Some(Space::Hole) => Err(TileError::Hole(pos)),
            Some(Space::Tile { .. }) => Ok(()),
        }
    }

    /// Active tile at a position
    pub fn get_tile(&self, pos: Position) -> Result<Space, TileError> {
        self.validate_tile(pos)?;
        self.space(pos).ok_or(TileError::OutOfRange(pos))
    }

    /// Fish at a position (0 for holes and invalid positions)
    pub fn fish_at(&self, pos: Position) -> u32 {
        self.space(pos).map_or(0, |space| space.fish())
    }

    pub fn is_tile(&self, pos: Position) -> bool {
        self.validate_tile(pos).is_ok()
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.columns).map(move |column| Position::new(row as i32, column as i32))
        })
    }

    /// Number of spaces that are still tiles
    pub fn active_tiles(&self) -> usize {
        self.spaces.iter().filter(|space| !space.is_hole()).count()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if in_range(self.rows, self.columns, pos) {
            Some(pos.row as usize * self.columns + pos.column as usize)
        } else {
            None
        }
    }

    // ========================================================================
    // TRANSFORMATIONS
    // ========================================================================

    /// Copy of this board with the tile at `pos` turned into a hole
    pub fn remove_tile(&self, pos: Position) -> Result<Board, TileError> {
        self.validate_tile(pos)?;
        let mut board = self.clone();
        if let Some(i) = board.index(pos) {
            board.spaces[i] = Space::Hole;
        }
        Ok(board)
    }

    /// Copy of this board with every listed position turned into a hole
    pub fn add_holes(&self, holes: &[Position]) -> Result<Board, BoardError> {
        let mut board = self.clone();
        for &hole in holes {
            let i = board.index(hole).ok_or(BoardError::HoleOutOfRange(hole))?;
            board.spaces[i] = Space::Hole;
        }
        Ok(board)
    }
}

// ============================================================================
// TESTS
// ============================================================================
