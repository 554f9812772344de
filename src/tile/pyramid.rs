//! Pyramid geometry.
//!
//! Levels are numbered from coarse to fine: level `num_levels - 1` is full
//! resolution (subsample factor 1) and level 0 is the coarsest, with factor
//! `2^(num_levels - 1)`. A tile at level `L` covers
//! `tile_size × 2^((num_levels - 1) - L)` source pixels on each axis.
//!
//! ```text
//!  level 0          level 1               level 2 (full resolution)
//! ┌───────┐     ┌───┬───┐             ┌─┬─┬─┬─┐
//! │       │     │   │   │             ├─┼─┼─┼─┤
//! │  4x   │     ├───┼───┤   2x        ├─┼─┼─┼─┤   1x
//! │       │     │   │   │             ├─┼─┼─┼─┤
//! └───────┘     └───┴───┘             └─┴─┴─┴─┘
//! ```

use std::fmt;

use crate::image::BoundingBox;

/// Identifies one requested tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileLocator {
    /// Tile column (0-indexed from left)
    pub col: u32,

    /// Tile row (0-indexed from top)
    pub row: u32,

    /// Pyramid level (`num_levels - 1` = full resolution)
    pub level: u32,
}

impl TileLocator {
    pub fn new(col: u32, row: u32, level: u32) -> Self {
        Self { col, row, level }
    }
}

impl fmt::Display for TileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.level, self.col, self.row)
    }
}

/// Number of pyramid levels for an image and tile size.
///
/// Equals `1 + ceil(log2(max(cols, rows) / max(tile_width, tile_height)))`,
/// clamped so that there is always at least one level.
pub fn num_levels(cols: u32, rows: u32, tile_width: u32, tile_height: u32) -> u32 {
    let max_dimension = cols.max(rows) as u64;
    let max_tile = tile_width.max(tile_height) as u64;
    if max_tile == 0 {
        return 1;
    }

    let mut extra = 0;
    while (max_tile << extra) < max_dimension {
        extra += 1;
    }
    1 + extra
}

/// Downsampling factor for `level`, or `None` if the level does not exist.
pub fn subsample_factor(level: u32, num_levels: u32) -> Option<u64> {
    if level >= num_levels {
        return None;
    }
    let shift = (num_levels - 1) - level;
    1u64.checked_shl(shift)
}

/// Full-resolution source region covered by a tile.
///
/// Returns `None` if the level does not exist or the region cannot be
/// represented.
pub fn tile_to_bbox(
    tile_size: (u32, u32),
    locator: TileLocator,
    num_levels: u32,
) -> Option<BoundingBox> {
    let factor = i64::try_from(subsample_factor(locator.level, num_levels)?).ok()?;
    let width = (tile_size.0 as i64).checked_mul(factor)?;
    let height = (tile_size.1 as i64).checked_mul(factor)?;
    let x = (locator.col as i64).checked_mul(width)?;
    let y = (locator.row as i64).checked_mul(height)?;
    // Right and bottom edges must be representable too
    x.checked_add(width)?;
    y.checked_add(height)?;
    Some(BoundingBox::new(x, y, width, height))
}

/// Image dimensions as seen at a subsample factor (rounded up).
pub fn level_dimensions(cols: u32, rows: u32, factor: u64) -> (u32, u32) {
    let factor = factor.max(1);
    (
        (cols as u64).div_ceil(factor) as u32,
        (rows as u64).div_ceil(factor) as u32,
    )
}
