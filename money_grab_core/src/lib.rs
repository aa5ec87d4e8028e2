use serde::{Deserialize, Serialize};

pub mod agent;
pub mod config;
pub mod coords;
pub mod enemy;
pub mod level;
pub mod map;
pub mod maze;
pub mod movement;
pub mod session;

pub use config::{ConfigError, ContactRule, EnemyBehaviorMode, GameConfig};
pub use level::{GameEvent, Level};
pub use session::{Session, SessionStatus, Snapshot};

/// Unique identifier for entities (agents, enemies).
pub type EntityId = usize;

/// A discrete grid cell, addressed as `(row, col)`. Orders row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Manhattan distance between two cells.
    pub fn manhattan(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The neighbouring cell in `direction`, or `None` when it would leave the
    /// non-negative quadrant. Upper bounds are checked by the grid.
    pub fn step(&self, direction: Direction) -> Option<Position> {
        let (dr, dc) = direction.delta();
        Some(Position {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }
}

/// A continuous position in pixel space. Agents move through these between cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPosition {
    pub x: f32,
    pub y: f32,
}

impl PixelPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        PixelPosition { x, y }
    }
}

/// Movement direction. `None` means stationary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// Candidate order used by every greedy decision; the first best wins ties.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(d_row, d_col)` unit offset.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::None => (0, 0),
        }
    }

    pub fn is_none(self) -> bool {
        self == Direction::None
    }
}
