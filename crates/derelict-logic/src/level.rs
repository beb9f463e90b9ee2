//! Level construction — ASCII layouts and the built-in test ship.
//!
//! Level generation proper lives outside the core. What the core accepts is
//! a fully populated [`Grid`] plus a spawn point; this module validates that
//! pair and offers an ASCII shorthand for writing one by hand.
//!
//! Layout glyphs:
//!
//! | Glyph | Cell |
//! |-------|------|
//! | ` ` | empty space |
//! | `.` | floor |
//! | `#` / `D` | wall / damaged wall |
//! | `+` / `/` / `d` | closed / open / damaged door |
//! | `-` / `~` | conduit / damaged conduit |
//! | `*` / `%` | wall conduit / damaged wall conduit |
//! | `P` / `p` | power generator / damaged |
//! | `A` / `a` | air generator / damaged |
//! | `E` | ship entrance |

use crate::cells::{Cell, CellKind};
use crate::grid::{Coord, Grid, LevelError};

/// A grid plus where the player starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub grid: Grid,
    pub spawn: Coord,
}

impl Level {
    /// Pair a grid with a spawn point, rejecting spawns the player could
    /// never stand on.
    pub fn new(grid: Grid, spawn: Coord) -> Result<Self, LevelError> {
        match grid.get(spawn) {
            None => Err(LevelError::SpawnOutOfBounds(spawn)),
            Some(cell) if !cell.traversable() => Err(LevelError::SpawnBlocked(spawn)),
            Some(_) => Ok(Self { grid, spawn }),
        }
    }
}

/// Cell for a layout glyph.
pub fn cell_for_glyph(glyph: char) -> Option<Cell> {
    let cell = match glyph {
        ' ' => Cell::EmptySpace,
        '.' => Cell::Floor,
        '#' => CellKind::Wall.pristine(),
        'D' => CellKind::Wall.pristine().damaged(),
        '+' => CellKind::Door.pristine(),
        '/' => Cell::Door {
            open: true,
            damaged: false,
        },
        'd' => CellKind::Door.pristine().damaged(),
        '-' => CellKind::Conduit.pristine(),
        '~' => CellKind::Conduit.pristine().damaged(),
        '*' => CellKind::WallConduit.pristine(),
        '%' => CellKind::WallConduit.pristine().damaged(),
        'P' => CellKind::PowerGenerator.pristine(),
        'p' => CellKind::PowerGenerator.pristine().damaged(),
        'A' => CellKind::AirGenerator.pristine(),
        'a' => CellKind::AirGenerator.pristine().damaged(),
        'E' => Cell::ShipEntrance,
        _ => return None,
    };
    Some(cell)
}

/// Build a level from equal-length ASCII rows.
pub fn parse_layout(rows: &[&str], spawn: Coord) -> Result<Level, LevelError> {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.chars().count());
    if width == 0 || height == 0 {
        return Err(LevelError::EmptyDimensions { width, height });
    }

    let mut cells = Vec::with_capacity(width * height);
    for (y, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != width {
            return Err(LevelError::RaggedRow {
                row: y,
                expected: width,
                found,
            });
        }
        for (x, glyph) in row.chars().enumerate() {
            let cell = cell_for_glyph(glyph).ok_or(LevelError::UnknownGlyph {
                glyph,
                at: Coord::new(x as i32, y as i32),
            })?;
            cells.push(cell);
        }
    }

    Level::new(Grid::from_cells(width, height, cells)?, spawn)
}

const REFERENCE_LAYOUT: [&str; 23] = [
    "                                                                     ",
    "                                                                     ",
    "          ###############################                            ",
    "          #.......#.........#..#........#                            ",
    "          +.......#.........#..#........#                            ",
    "##        #.......#.........#..#....PP..#                            ",
    "E+        #.......#.........#..#....PP-.#                            ",
    "##        #.......#.........#..#......-.#                            ",
    "          #.......#.........#..+......-.#                            ",
    "          #.......#.........#..#......-.#                            ",
    "          #.......######+####..#......-.#                            ",
    "          #.......+.........#..#......-.#                            ",
    "          #.......#.........#..#######*##                            ",
    "          #.......#.........+..#......-.#                            ",
    "          #.......#.........#..#......~.#                            ",
    "          #.......#.........#..#......-.#                            ",
    "          ##############+####..+......-.#                            ",
    "          #...........#.....#..#......-.#                            ",
    "          #...........#.....#..#....AA-.#                            ",
    "          #...........+.....#..#....AA..#                            ",
    "          #...........#.....#..#........#                            ",
    "          #...........#.....#..#........#                            ",
    "          ###############################                            ",
];

/// Where the player's own ship docks on the reference level.
pub const REFERENCE_ENTRANCE: Coord = Coord::new(0, 6);

/// The built-in test ship: a small airlock off the player's ship, a gap of
/// open space, and a derelict with a power plant, an air plant and a
/// conduit run between them that is burned out part way.
pub fn reference_level() -> Result<Level, LevelError> {
    parse_layout(&REFERENCE_LAYOUT, REFERENCE_ENTRANCE)
}
