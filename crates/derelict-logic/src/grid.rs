//! The ship grid — a dense, fixed-size map from coordinates to cells.
//!
//! A grid never holds an absent entry: unoccupied coordinates are explicit
//! [`Cell::EmptySpace`]. Cells are stored row-major.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cells::Cell;

/// Grid coordinate. Signed so neighbor offsets can step off the edge and be
/// rejected by [`Grid::contains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }

    /// Squared Euclidean distance.
    pub fn distance_sq(self, other: Coord) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// The 3×3 block centered here, self included, in row-major order.
    pub fn block(self) -> impl Iterator<Item = Coord> {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| self.offset(dx, dy)))
    }

    /// The 8 surrounding coordinates.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        self.block().filter(move |c| *c != self)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The nine directions a prompt can answer, `Here` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Here,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::Here,
    ];

    /// `(dx, dy)` with y growing southwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
            Direction::Here => (0, 0),
        }
    }

    /// Roguelike key mapping (`hjkl yubn .`).
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'k' => Some(Direction::North),
            'u' => Some(Direction::NorthEast),
            'l' => Some(Direction::East),
            'n' => Some(Direction::SouthEast),
            'j' => Some(Direction::South),
            'b' => Some(Direction::SouthWest),
            'h' => Some(Direction::West),
            'y' => Some(Direction::NorthWest),
            '.' => Some(Direction::Here),
            _ => None,
        }
    }
}

/// Errors building a grid or level from caller-supplied data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// Width or height is zero.
    EmptyDimensions { width: usize, height: usize },
    /// Cell vector length does not match `width * height`.
    CellCountMismatch { expected: usize, found: usize },
    /// Layout rows are not all the same length.
    RaggedRow { row: usize, expected: usize, found: usize },
    /// Layout contains a character with no cell mapping.
    UnknownGlyph { glyph: char, at: Coord },
    /// Spawn point lies outside the grid.
    SpawnOutOfBounds(Coord),
    /// Spawn point is not walkable.
    SpawnBlocked(Coord),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::EmptyDimensions { width, height } => {
                write!(f, "grid dimensions must be non-zero, got {}x{}", width, height)
            }
            LevelError::CellCountMismatch { expected, found } => {
                write!(f, "expected {} cells, found {}", expected, found)
            }
            LevelError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "layout row {} has {} columns, expected {}",
                row, found, expected
            ),
            LevelError::UnknownGlyph { glyph, at } => {
                write!(f, "unknown layout glyph {:?} at {}", glyph, at)
            }
            LevelError::SpawnOutOfBounds(at) => write!(f, "spawn {} is outside the grid", at),
            LevelError::SpawnBlocked(at) => write!(f, "spawn {} is not walkable", at),
        }
    }
}

impl std::error::Error for LevelError {}

/// Fixed-size grid of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid of empty space.
    pub fn new(width: usize, height: usize) -> Result<Self, LevelError> {
        Self::filled(width, height, Cell::EmptySpace)
    }

    /// A grid with every coordinate set to `cell`.
    pub fn filled(width: usize, height: usize, cell: Cell) -> Result<Self, LevelError> {
        if width == 0 || height == 0 {
            return Err(LevelError::EmptyDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![cell; width * height],
        })
    }

    /// Wrap a fully populated row-major cell vector.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Result<Self, LevelError> {
        if width == 0 || height == 0 {
            return Err(LevelError::EmptyDimensions { width, height });
        }
        if cells.len() != width * height {
            return Err(LevelError::CellCountMismatch {
                expected: width * height,
                found: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.x >= 0 && at.y >= 0 && (at.x as usize) < self.width && (at.y as usize) < self.height
    }

    /// Row-major index, or `None` when out of bounds.
    pub fn index(&self, at: Coord) -> Option<usize> {
        if self.contains(at) {
            Some(at.y as usize * self.width + at.x as usize)
        } else {
            None
        }
    }

    /// Coordinate of a row-major index.
    pub fn coord(&self, index: usize) -> Coord {
        Coord::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn get(&self, at: Coord) -> Option<&Cell> {
        self.index(at).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, at: Coord) -> Option<&mut Cell> {
        self.index(at).map(move |i| &mut self.cells[i])
    }

    /// Replace the cell at `at`, returning the old one. Out of bounds is a no-op.
    pub fn set(&mut self, at: Coord, cell: Cell) -> Option<Cell> {
        self.get_mut(at).map(|slot| std::mem::replace(slot, cell))
    }

    /// Fill an inclusive rectangle.
    pub fn fill_rect(&mut self, from: Coord, to: Coord, cell: Cell) {
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for x in from.x.min(to.x)..=from.x.max(to.x) {
                self.set(Coord::new(x, y), cell);
            }
        }
    }

    /// In-bounds members of the 3×3 block around `at`, self included.
    pub fn block(&self, at: Coord) -> impl Iterator<Item = Coord> + '_ {
        at.block().filter(move |c| self.contains(*c))
    }

    /// In-bounds neighbors of `at`.
    pub fn neighbors(&self, at: Coord) -> impl Iterator<Item = Coord> + '_ {
        at.neighbors().filter(move |c| self.contains(*c))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Every coordinate, row-major.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Coord::new(x, y)))
    }

    /// Current glyph of every row, for debugging and snapshots.
    pub fn render_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(Cell::glyph).collect())
            .collect()
    }
}
