//! Raster source abstraction.
//!
//! A [`RasterSource`] is a randomly readable raster with known dimensions,
//! pixel layout and preferred block size. The tile generator only ever talks
//! to this trait, so any backing store can be tiled:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             TileGenerator               │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          RasterSource Trait             │
//! └────────────────────┬────────────────────┘
//!                      │
//!        ┌─────────────┼──────────────────┐
//!        ▼             ▼                  ▼
//! ┌─────────────┐ ┌─────────────┐ ┌────────────────────┐
//! │ FileRaster  │ │MemoryRaster │ │ DiskCacheImageView │
//! │ (PNG/TIFF)  │ │ (bytes)     │ │ (temp file)        │
//! └─────────────┘ └─────────────┘ └────────────────────┘
//! ```
//!
//! # Buffer layout
//!
//! [`RasterSource::read`] fills a caller-provided buffer with the pixels of a
//! bounding box in native endianness, plane-major then row-major, with
//! interleaved channels. The buffer must be exactly
//! `width * height * planes * bytes_per_pixel` bytes.

mod file;
mod memory;

use serde::Serialize;

use crate::error::{IoError, RasterError};
use crate::image::BoundingBox;
use crate::pixel::{bytes_per_pixel, ChannelType, PixelFormat};

pub use file::FileRaster;
pub use memory::MemoryRaster;

/// Default block size for sources without a native tiling.
pub const DEFAULT_BLOCK_SIZE: u32 = 256;

// =============================================================================
// RasterSource Trait
// =============================================================================

/// Randomly readable raster.
///
/// Implementations must tolerate concurrent reads from multiple threads;
/// the tile generator shares one source across all in-flight requests.
pub trait RasterSource: Send + Sync {
    fn cols(&self) -> u32;

    fn rows(&self) -> u32;

    fn planes(&self) -> u32;

    fn pixel_format(&self) -> PixelFormat;

    fn channel_type(&self) -> ChannelType;

    /// Preferred read granularity as `(width, height)`.
    fn block_read_size(&self) -> (u32, u32);

    /// Identifier for logging (path, URI or a synthetic name).
    fn identifier(&self) -> &str;

    /// Fill `buffer` with the pixels inside `bbox`.
    ///
    /// # Errors
    ///
    /// - [`RasterError::RegionOutOfBounds`] if `bbox` is empty or not fully
    ///   inside the raster
    /// - [`RasterError::Io`] if the buffer size is wrong or the read fails
    fn read(&self, buffer: &mut [u8], bbox: BoundingBox) -> Result<(), RasterError>;

    /// The valid region `[0, cols) × [0, rows)`.
    fn bounds(&self) -> BoundingBox {
        BoundingBox::from_dimensions(self.cols(), self.rows())
    }

    fn bytes_per_pixel(&self) -> usize {
        bytes_per_pixel(self.pixel_format(), self.channel_type())
    }

    /// Snapshot of the source's metadata.
    fn info(&self) -> RasterInfo {
        let (tile_width, tile_height) = self.block_read_size();
        RasterInfo {
            identifier: self.identifier().to_string(),
            cols: self.cols(),
            rows: self.rows(),
            planes: self.planes(),
            pixel_format: self.pixel_format(),
            channel_type: self.channel_type(),
            tile_width,
            tile_height,
        }
    }
}

impl<T: RasterSource + ?Sized> RasterSource for std::sync::Arc<T> {
    fn cols(&self) -> u32 {
        (**self).cols()
    }

    fn rows(&self) -> u32 {
        (**self).rows()
    }

    fn planes(&self) -> u32 {
        (**self).planes()
    }

    fn pixel_format(&self) -> PixelFormat {
        (**self).pixel_format()
    }

    fn channel_type(&self) -> ChannelType {
        (**self).channel_type()
    }

    fn block_read_size(&self) -> (u32, u32) {
        (**self).block_read_size()
    }

    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn read(&self, buffer: &mut [u8], bbox: BoundingBox) -> Result<(), RasterError> {
        (**self).read(buffer, bbox)
    }
}

// =============================================================================
// Raster Info
// =============================================================================

/// Serializable description of a raster source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterInfo {
    pub identifier: String,
    pub cols: u32,
    pub rows: u32,
    pub planes: u32,
    pub pixel_format: PixelFormat,
    pub channel_type: ChannelType,
    pub tile_width: u32,
    pub tile_height: u32,
}

// =============================================================================
// Region Helpers
// =============================================================================

/// Number of bytes a read of `bbox` produces.
pub(crate) fn region_len(bbox: &BoundingBox, planes: u32, bpp: usize) -> usize {
    bbox.area() as usize * planes as usize * bpp
}

/// Validate a read request against raster bounds and buffer size.
pub(crate) fn check_region(
    bbox: &BoundingBox,
    cols: u32,
    rows: u32,
    expected_len: usize,
    buffer_len: usize,
) -> Result<(), RasterError> {
    if !BoundingBox::from_dimensions(cols, rows).contains(bbox) {
        return Err(RasterError::RegionOutOfBounds {
            bbox: *bbox,
            cols,
            rows,
        });
    }
    if expected_len != buffer_len {
        return Err(IoError::BufferSize {
            expected: expected_len,
            actual: buffer_len,
        }
        .into());
    }
    Ok(())
}

/// Copy `bbox` out of a plane-major, row-major image held in `src`.
///
/// The region must already have been validated with [`check_region`].
pub(crate) fn copy_region(
    src: &[u8],
    cols: u32,
    rows: u32,
    planes: u32,
    bpp: usize,
    bbox: &BoundingBox,
    dst: &mut [u8],
) {
    let row_len = bbox.width as usize * bpp;
    let mut out = 0;
    for plane in 0..planes as usize {
        for y in bbox.y as usize..bbox.bottom() as usize {
            let start = ((plane * rows as usize + y) * cols as usize + bbox.x as usize) * bpp;
            dst[out..out + row_len].copy_from_slice(&src[start..start + row_len]);
            out += row_len;
        }
    }
}
