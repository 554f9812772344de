//! Tile pyramid generation.
//!
//! This module turns a [`RasterSource`](crate::raster::RasterSource) into a
//! multi-resolution pyramid of fixed-size tiles, generated on demand.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        CLI / async callers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              TileService                │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  TileCache   │  │ PngTileEncoder  │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │ spawn_blocking
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             TileGenerator               │
//! │   pyramid math → crop → PixelDispatch   │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             RasterSource                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileGenerator`]: Synchronous, stateless tile production
//! - [`TileLocator`]: Tile column, row and level
//! - [`TileResource`]: Type-erased tile pixels plus layout metadata
//! - [`PixelDispatch`]: Runtime layout to typed builder table
//! - [`TileService`]: Async front end with caching
//! - [`TileCache`]: LRU cache of generated tiles with size-based eviction
//! - [`PngTileEncoder`]: PNG encoding of finished tiles

mod cache;
mod dispatch;
mod encoder;
mod generator;
mod pyramid;
mod resource;
mod service;

pub use cache::{TileCache, TileCacheKey, DEFAULT_TILE_CACHE_CAPACITY};
pub use dispatch::{PixelDispatch, TileBuildFn};
pub use encoder::PngTileEncoder;
pub use generator::TileGenerator;
pub use pyramid::{level_dimensions, num_levels, subsample_factor, tile_to_bbox, TileLocator};
pub use resource::TileResource;
pub use service::{TileResponse, TileService};
