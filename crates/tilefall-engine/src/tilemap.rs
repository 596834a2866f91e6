//! Static tile grid used as the collision oracle.
//!
//! A [`TileMap`] is parsed once from rows of `'0'` (empty) and `'1'` (solid)
//! characters; row index is `y` from the top, column index is `x` from the
//! left. It never changes afterwards.
//!
//! Queries outside the grid answer "not solid". The world is bounded by
//! [`WorldBounds`](crate::config::WorldBounds) checks, not by the grid edge,
//! so leaving the grid is not an obstruction.

use crate::geometry::Rect;

/// The prototype level: 20 x 20 tiles with a floor on row 18.
pub const DEFAULT_LEVEL: &str = "\
00000000000000000000
00000000000000000000
00000000000000000000
00000000000000000000
00000000000000000000
00000000000000000000
00000000000000000000
00000000000000000000
00000100010000000000
00000000000000000000
00000100010000000000
00000000000000000000
00010001001000000000
00000001100000000000
00000110000001000000
00000000000000000000
00000000100100010000
00000000000000000000
11111111111111111110
00000000000000000000";

/// Errors from parsing a level.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MapError {
    #[error("level has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, column {column}: expected '0' or '1', found {found:?}")]
    InvalidCell {
        row: usize,
        column: usize,
        found: char,
    },

    #[error("tile size must be positive, got {0}")]
    ZeroTileSize(i32),
}

/// Immutable solid/empty grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    /// Row-major, `width * height` cells.
    cells: Vec<bool>,
    width: usize,
    height: usize,
    tile_size: i32,
}

impl TileMap {
    /// Build a map from equal-length rows of `'0'`/`'1'`.
    pub fn parse<S: AsRef<str>>(rows: &[S], tile_size: i32) -> Result<Self, MapError> {
        if tile_size <= 0 {
            return Err(MapError::ZeroTileSize(tile_size));
        }
        let first = rows.first().ok_or(MapError::Empty)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MapError::Empty);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (column, ch) in line.chars().enumerate() {
                match ch {
                    '0' => cells.push(false),
                    '1' => cells.push(true),
                    found => {
                        return Err(MapError::InvalidCell { row, column, found });
                    }
                }
            }
        }

        tracing::debug!(width, height = rows.len(), tile_size, "tile map parsed");
        Ok(Self {
            cells,
            width,
            height: rows.len(),
            tile_size,
        })
    }

    /// Parse a newline-separated level literal such as [`DEFAULT_LEVEL`].
    pub fn from_level(text: &str, tile_size: i32) -> Result<Self, MapError> {
        let rows: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        Self::parse(&rows, tile_size)
    }

    /// Whether tile `(tile_x, tile_y)` is solid. Outside the grid: `false`.
    pub fn is_solid(&self, tile_x: i32, tile_y: i32) -> bool {
        if tile_x < 0 || tile_y < 0 {
            return false;
        }
        let (tx, ty) = (tile_x as usize, tile_y as usize);
        if tx >= self.width || ty >= self.height {
            return false;
        }
        self.cells[ty * self.width + tx]
    }

    /// The tile containing pixel `(px, py)`, flooring towards negative infinity.
    pub fn tile_at(&self, px: i32, py: i32) -> (i32, i32) {
        (px.div_euclid(self.tile_size), py.div_euclid(self.tile_size))
    }

    /// `true` if any of the rect's four corners lies in a solid tile.
    ///
    /// Exact for squares no larger than a tile; bigger squares can straddle a
    /// solid tile between their corners without it being seen.
    pub fn overlaps(&self, rect: &Rect) -> bool {
        rect.corners().iter().any(|&(px, py)| {
            let (tx, ty) = self.tile_at(px, py);
            self.is_solid(tx, ty)
        })
    }

    /// Every solid tile as `(tile_x, tile_y)`, row by row.
    pub fn solid_tiles(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, solid)| **solid)
            .map(|(i, _)| ((i % self.width) as i32, (i / self.width) as i32))
    }

    /// Grid width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn pixel_width(&self) -> i32 {
        self.width as i32 * self.tile_size
    }

    pub fn pixel_height(&self) -> i32 {
        self.height as i32 * self.tile_size
    }
}
