//! Level layouts: hand-authored templates, the per-level generator, and a small
//! text loader for custom rooms.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{Direction, Position, map::Grid};

/// Static type of a maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    #[default]
    Open,
}

/// Errors raised while turning text into a maze.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("Maze text is empty")]
    Empty,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Maze must be at least 3x3, got {rows}x{cols}")]
    TooSmall { rows: usize, cols: usize },
    #[error("Multiple '{marker}' markers found")]
    DuplicateMarker { marker: char },
    #[error("No '{marker}' marker found")]
    MissingMarker { marker: char },
}

/// Which edge of the map holds the exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Right,
    Up,
    Down,
    Left,
}

impl Side {
    const ROTATION: [Side; 4] = [Side::Right, Side::Up, Side::Down, Side::Left];

    /// Exit side for a level; rotates through right, up, down, left.
    pub fn for_level(level_index: u32) -> Side {
        Self::ROTATION[level_index as usize % Self::ROTATION.len()]
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Right => Side::Left,
            Side::Left => Side::Right,
            Side::Up => Side::Down,
            Side::Down => Side::Up,
        }
    }

    /// Direction pointing from the border into the map.
    pub fn inward(self) -> Direction {
        match self {
            Side::Right => Direction::Left,
            Side::Left => Direction::Right,
            Side::Up => Direction::Down,
            Side::Down => Direction::Up,
        }
    }

    /// Middle border cell of this side.
    fn midpoint(self, rows: usize, cols: usize) -> Position {
        match self {
            Side::Right => Position::new(rows / 2, cols - 1),
            Side::Left => Position::new(rows / 2, 0),
            Side::Up => Position::new(0, cols / 2),
            Side::Down => Position::new(rows - 1, cols / 2),
        }
    }
}

const TEMPLATES: [[&str; 15]; 3] = [
    [
        "#####################",
        "#...................#",
        "#.###.#####.#####.#.#",
        "#.#.............#.#.#",
        "#.#.###.###.###.#...#",
        "#...#.........#...#.#",
        "#.###.##.#.##.###.#.#",
        "#.......#...#.......#",
        "#.###.##.#.##.###.#.#",
        "#...#.........#...#.#",
        "#.#.###.###.###.#...#",
        "#.#.............#.#.#",
        "#.###.#####.#####.#.#",
        "#...................#",
        "#####################",
    ],
    [
        "#####################",
        "#...................#",
        "#.##.####...####.##.#",
        "#.#...........#...#.#",
        "#.#.##.#####.##.#.#.#",
        "#....#...#...#..#...#",
        "#.##.#.#...#.#.##.#.#",
        "#......#.#.#........#",
        "#.##.#.#...#.#.##.#.#",
        "#....#...#...#..#...#",
        "#.#.##.#####.##.#.#.#",
        "#.#...........#...#.#",
        "#.##.####...####.##.#",
        "#...................#",
        "#####################",
    ],
    [
        "#####################",
        "#...................#",
        "#.#.#.#.#.#.#.#.#.#.#",
        "#...................#",
        "#.###.###...###.###.#",
        "#.#.............#.#.#",
        "#.#.#.##.#.##.#.#...#",
        "#.....#.......#.....#",
        "#.#.#.##.#.##.#.#...#",
        "#.#.............#.#.#",
        "#.###.###...###.###.#",
        "#...................#",
        "#.#.#.#.#.#.#.#.#.#.#",
        "#...................#",
        "#####################",
    ],
];

/// Number of built-in layouts cycled through by [`Maze::generate`].
pub const TEMPLATE_COUNT: usize = TEMPLATES.len();

/// A walled grid together with its entrance and exit cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    pub grid: Grid<Tile>,
    pub entrance: Position,
    pub exit: Position,
}

impl Maze {
    /// Builds the maze for `level_index`. Same input, same maze.
    ///
    /// Carving runs in a fixed order: template, corridor clearing around the
    /// entrance and exit, outer border forced to wall, then the entrance and
    /// exit cells opened. Any other order can seal the exit.
    pub fn generate(level_index: u32) -> Maze {
        let template = &TEMPLATES[level_index as usize % TEMPLATE_COUNT];
        let mut grid = Grid::from_generator(template.len(), template[0].len(), |p| {
            tile_for(template[p.row].as_bytes()[p.col] as char)
        });
        let (rows, cols) = (grid.rows(), grid.cols());

        let exit_side = Side::for_level(level_index);
        let exit = exit_side.midpoint(rows, cols);
        let entrance = exit_side.opposite().midpoint(rows, cols);

        for (cell, side) in [(entrance, exit_side.opposite()), (exit, exit_side)] {
            if let Some(inner) = grid.neighbor(cell, side.inward()) {
                clear_square(&mut grid, inner);
            }
        }
        clear_inner_edge(&mut grid, exit_side);

        for pos in grid_positions(rows, cols) {
            if grid.is_border(pos) {
                grid[pos] = Tile::Wall;
            }
        }
        grid[entrance] = Tile::Open;
        grid[exit] = Tile::Open;

        Maze {
            grid,
            entrance,
            exit,
        }
    }

    /// Parses a custom room. `#` is wall, `S` the entrance, `X` the exit and
    /// anything else open floor.
    pub fn parse(text: &str) -> Result<Maze, MazeError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(MazeError::Empty);
        }
        let cols = lines[0].chars().count();
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(MazeError::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
        }
        let rows = lines.len();
        if rows < 3 || cols < 3 {
            return Err(MazeError::TooSmall { rows, cols });
        }

        let mut entrance = None;
        let mut exit = None;
        let mut grid = Grid::filled(rows, cols, Tile::Open);
        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(row, col);
                let slot = match ch {
                    'S' => Some(&mut entrance),
                    'X' => Some(&mut exit),
                    _ => None,
                };
                if let Some(slot) = slot {
                    if slot.replace(pos).is_some() {
                        return Err(MazeError::DuplicateMarker { marker: ch });
                    }
                }
                grid[pos] = tile_for(ch);
            }
        }

        Ok(Maze {
            grid,
            entrance: entrance.ok_or(MazeError::MissingMarker { marker: 'S' })?,
            exit: exit.ok_or(MazeError::MissingMarker { marker: 'X' })?,
        })
    }

    pub fn is_open(&self, pos: Position) -> bool {
        matches!(self.grid.get(pos), Some(Tile::Open))
    }

    /// Number of open cells.
    pub fn open_count(&self) -> usize {
        self.grid.iter().filter(|t| **t == Tile::Open).count()
    }

    /// Open cells in breadth-first order from `start`, each paired with its
    /// step distance. Walls and unreachable cells are omitted.
    pub fn flood_from(&self, start: Position) -> Vec<(Position, usize)> {
        let mut order = Vec::new();
        if !self.is_open(start) {
            return order;
        }
        let mut seen = Grid::filled(self.grid.rows(), self.grid.cols(), false);
        let mut queue = VecDeque::from([(start, 0)]);
        seen[start] = true;
        while let Some((pos, dist)) = queue.pop_front() {
            order.push((pos, dist));
            for direction in Direction::ALL {
                if let Some(next) = self.grid.neighbor(pos, direction) {
                    if self.is_open(next) && !seen[next] {
                        seen[next] = true;
                        queue.push_back((next, dist + 1));
                    }
                }
            }
        }
        order
    }

    /// Whether `to` can be reached from `from` through open cells.
    pub fn is_reachable(&self, from: Position, to: Position) -> bool {
        self.flood_from(from).iter().any(|(pos, _)| *pos == to)
    }

    /// The open cell closest (in steps) to `target`, searching outward
    /// through the grid rather than the maze so walls at `target` are fine.
    pub fn nearest_open(&self, target: Position) -> Option<Position> {
        self.grid
            .enumerate()
            .filter(|(_, tile)| **tile == Tile::Open)
            .map(|(pos, _)| pos)
            .min_by_key(|pos| (pos.manhattan(&target), pos.row, pos.col))
    }
}

fn tile_for(ch: char) -> Tile {
    if ch == '#' { Tile::Wall } else { Tile::Open }
}

fn grid_positions(rows: usize, cols: usize) -> impl Iterator<Item = Position> {
    (0..rows).flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
}

/// Opens the 3x3 block centred on `center`, clipped to the grid.
fn clear_square(grid: &mut Grid<Tile>, center: Position) {
    for row in center.row.saturating_sub(1)..=center.row + 1 {
        for col in center.col.saturating_sub(1)..=center.col + 1 {
            if let Some(tile) = grid.get_mut(Position::new(row, col)) {
                *tile = Tile::Open;
            }
        }
    }
}

/// Opens the full line of cells just inside the exit edge.
fn clear_inner_edge(grid: &mut Grid<Tile>, side: Side) {
    let (rows, cols) = (grid.rows(), grid.cols());
    let line: Vec<Position> = match side {
        Side::Right => (1..rows - 1).map(|r| Position::new(r, cols - 2)).collect(),
        Side::Left => (1..rows - 1).map(|r| Position::new(r, 1)).collect(),
        Side::Up => (1..cols - 1).map(|c| Position::new(1, c)).collect(),
        Side::Down => (1..cols - 1).map(|c| Position::new(rows - 2, c)).collect(),
    };
    for pos in line {
        grid[pos] = Tile::Open;
    }
}
