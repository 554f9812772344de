use std::path::Path;

use tracing::{debug, info, warn};

use super::pyramid::{level_dimensions, num_levels, subsample_factor, tile_to_bbox};
use super::{PixelDispatch, TileLocator, TileResource};
use crate::error::{IoError, TileError};
use crate::image::BoundingBox;
use crate::pixel::{ChannelType, PixelFormat, PixelRgba};
use crate::raster::{FileRaster, RasterSource};

// =============================================================================
// Tile Generator
// =============================================================================

/// Produces fixed-size pyramid tiles from a raster source.
///
/// The generator holds no state besides the source: every query is passed
/// through to the source on each call, and [`generate_tile`] allocates its own
/// buffers. One generator can therefore serve concurrent requests from many
/// threads, provided the source tolerates concurrent reads.
///
/// # Example
///
/// ```
/// use raster_tiler::image::ImageBuffer;
/// use raster_tiler::pixel::PixelGray;
/// use raster_tiler::raster::MemoryRaster;
/// use raster_tiler::tile::{TileGenerator, TileLocator};
///
/// let image = ImageBuffer::from_fn(1000, 600, |x, y| PixelGray::<u8>::new((x ^ y) as u8));
/// let generator = TileGenerator::new(MemoryRaster::from_image(&image));
///
/// assert_eq!(generator.num_levels(), 3);
///
/// // Coarsest level: the whole image subsampled by 4 into one tile
/// let tile = generator.generate_tile(TileLocator::new(0, 0, 0)).unwrap();
/// assert_eq!((tile.cols(), tile.rows()), (250, 150));
/// ```
///
/// [`generate_tile`]: TileGenerator::generate_tile
#[derive(Debug)]
pub struct TileGenerator<R> {
    source: R,
}

impl TileGenerator<FileRaster> {
    /// Open an image file and tile it with `block_size` square tiles.
    pub fn open(path: impl AsRef<Path>, block_size: u32) -> Result<Self, IoError> {
        let path = path.as_ref();
        info!("Loading image: {}", path.display());
        let source = FileRaster::open_with_block_size(path, block_size)?;
        Ok(Self::new(source))
    }
}

impl<R: RasterSource> TileGenerator<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// The underlying raster source.
    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn cols(&self) -> u32 {
        self.source.cols()
    }

    pub fn rows(&self) -> u32 {
        self.source.rows()
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.source.pixel_format()
    }

    pub fn channel_type(&self) -> ChannelType {
        self.source.channel_type()
    }

    /// Tile size as `(width, height)`, taken from the source's block size.
    pub fn tile_size(&self) -> (u32, u32) {
        self.source.block_read_size()
    }

    /// Number of pyramid levels, recomputed from the live source.
    pub fn num_levels(&self) -> u32 {
        let (tile_width, tile_height) = self.tile_size();
        num_levels(self.cols(), self.rows(), tile_width, tile_height)
    }

    /// Image dimensions at `level`, or `None` if the level does not exist.
    pub fn level_dimensions(&self, level: u32) -> Option<(u32, u32)> {
        let factor = subsample_factor(level, self.num_levels())?;
        Some(level_dimensions(self.cols(), self.rows(), factor))
    }

    /// Number of tile columns and rows at `level`.
    pub fn tiles_at_level(&self, level: u32) -> Option<(u32, u32)> {
        let (width, height) = self.level_dimensions(level)?;
        let (tile_width, tile_height) = self.tile_size();
        if tile_width == 0 || tile_height == 0 {
            return None;
        }
        Some((width.div_ceil(tile_width), height.div_ceil(tile_height)))
    }

    /// Generate the tile at `locator`.
    ///
    /// 1. Compute the full-resolution region covered by the tile.
    /// 2. If it misses the image (or the level does not exist), log a
    ///    warning and return a blank gray 8-bit tile of the full tile size.
    /// 3. Crop the region to the image; edge tiles come out smaller.
    /// 4. Read it using the source's pixel layout and subsample it by the
    ///    level's factor.
    ///
    /// # Errors
    ///
    /// - [`TileError::UnsupportedFormat`] if the source's layout cannot be tiled
    /// - [`TileError::Raster`] if reading the source fails
    pub fn generate_tile(&self, locator: TileLocator) -> Result<TileResource, TileError> {
        let tile_size = self.tile_size();
        let num_levels = self.num_levels();
        let image_bbox = self.source.bounds();

        let tile_bbox = tile_to_bbox(tile_size, locator, num_levels)
            .filter(|bbox| image_bbox.intersects(bbox));
        let Some(mut tile_bbox) = tile_bbox else {
            warn!(
                source = self.source.identifier(),
                tile = %locator,
                num_levels,
                "Tile requested outside image bounds, returning blank tile"
            );
            return Ok(TileResource::blank(tile_size.0, tile_size.1));
        };

        tile_bbox.crop(&image_bbox);
        let factor = subsample_factor(locator.level, num_levels).unwrap_or(1);

        debug!(
            tile = %locator,
            bbox = %tile_bbox,
            factor,
            "Generating tile"
        );

        PixelDispatch::build(&self.source, tile_bbox, factor)
    }

    /// Value range of the image. Not implemented.
    pub fn minmax(&self) -> Result<(f64, f64), TileError> {
        Err(TileError::NotImplemented {
            operation: "TileGenerator::minmax",
        })
    }

    /// Sample a single pixel at a pyramid level. Not implemented.
    pub fn sample(
        &self,
        _x: i32,
        _y: i32,
        _level: u32,
        _transaction_id: i32,
    ) -> Result<PixelRgba<f32>, TileError> {
        Err(TileError::NotImplemented {
            operation: "TileGenerator::sample",
        })
    }

    /// Full-resolution region a tile reads, after cropping to the image.
    ///
    /// `None` when the tile would be blank.
    pub fn source_region(&self, locator: TileLocator) -> Option<BoundingBox> {
        let image_bbox = self.source.bounds();
        tile_to_bbox(self.tile_size(), locator, self.num_levels())
            .and_then(|bbox| bbox.intersection(&image_bbox))
    }
}

// =============================================================================
// Tests
// =============================================================================
