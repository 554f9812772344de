//! # raster-tiler
//!
//! Multi-resolution tile pyramids for large raster images.
//!
//! This library serves fixed-size tiles from a randomly readable raster at
//! any zoom level, generated on demand. Intermediate images can be
//! materialized into disk-backed temporary storage that is shared between
//! copies and released automatically.
//!
//! ## Features
//!
//! - **On-demand pyramids**: Any tile at any level, computed from the source by integer subsampling
//! - **Typed pixels over runtime layouts**: A static dispatch table maps format and channel type onto generic code
//! - **Disk-backed caching**: Reference-counted temporary files for materialized image expressions
//! - **Async serving**: Tile generation on the blocking pool with an LRU tile cache
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`pixel`] - Pixel formats, channel types and typed pixels
//! - [`mod@image`] - Bounding boxes, owned image buffers and lazy image expressions
//! - [`raster`] - The raster source abstraction with in-memory and file-backed sources
//! - [`cache`] - Disk-backed cached image views
//! - [`tile`] - Pyramid geometry, tile generation, caching and encoding
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use raster_tiler::image::ImageBuffer;
//! use raster_tiler::pixel::PixelRgb;
//! use raster_tiler::raster::MemoryRaster;
//! use raster_tiler::tile::{TileGenerator, TileLocator};
//!
//! let image = ImageBuffer::from_fn(600, 400, |x, y| PixelRgb::<u8>::new(x as u8, y as u8, 0));
//! let generator = TileGenerator::new(MemoryRaster::from_image(&image).with_block_size(256, 256));
//!
//! // 600 px wide with 256 px tiles: full resolution plus two coarser levels
//! assert_eq!(generator.num_levels(), 3);
//!
//! let tile = generator.generate_tile(TileLocator::new(2, 1, 2)).unwrap();
//! assert_eq!((tile.cols(), tile.rows()), (88, 144));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod image;
pub mod pixel;
pub mod raster;
pub mod tile;

// Re-export commonly used types
pub use cache::DiskCacheImageView;
pub use config::{Cli, Command, InfoConfig, PyramidConfig, TileConfig};
pub use error::{CacheError, IoError, RasterError, TileError};
pub use image::{BoundingBox, ImageBuffer, ImageExpr};
pub use pixel::{ChannelType, Pixel, PixelFormat};
pub use raster::{FileRaster, MemoryRaster, RasterInfo, RasterSource};
pub use tile::{
    PngTileEncoder, TileCache, TileCacheKey, TileGenerator, TileLocator, TileResource,
    TileResponse, TileService,
};
