//! Tile Service for orchestrating tile generation.
//!
//! The TileService is the async entry point for tile requests. It
//! orchestrates:
//! - Cache lookups
//! - Tile generation on the blocking pool
//! - Result caching
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TileService                          │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │                     get_tile()                        │  │
//! │  │  1. Check cache     2. spawn_blocking(generate_tile)  │  │
//! │  │                     3. Cache & return                 │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! │            │                              │                 │
//! │            ▼                              ▼                 │
//! │     ┌───────────┐               ┌──────────────────┐        │
//! │     │ TileCache │               │  TileGenerator   │        │
//! │     └───────────┘               └──────────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::trace;

use crate::error::TileError;
use crate::raster::RasterSource;

use super::cache::{TileCache, TileCacheKey};
use super::{TileGenerator, TileLocator, TileResource};

// =============================================================================
// Tile Response
// =============================================================================

/// Response from the tile service.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// The generated tile
    pub tile: TileResource,

    /// Whether this tile was served from cache
    pub cache_hit: bool,
}

// =============================================================================
// Tile Service
// =============================================================================

/// Service for generating and caching tiles of one raster.
///
/// Generation is CPU- and disk-bound, so it runs on tokio's blocking pool;
/// many requests can be in flight at once. Only successful tiles are cached,
/// so a failed request is retried in full next time.
///
/// # Example
///
/// ```
/// use raster_tiler::image::ImageBuffer;
/// use raster_tiler::pixel::PixelGray;
/// use raster_tiler::raster::MemoryRaster;
/// use raster_tiler::tile::{TileGenerator, TileLocator, TileService};
///
/// #[tokio::main]
/// async fn main() {
///     let img = ImageBuffer::from_fn(512, 512, |x, _| PixelGray::<u8>::new(x as u8));
///     let service = TileService::new(TileGenerator::new(MemoryRaster::from_image(&img)));
///
///     let first = service.get_tile(TileLocator::new(0, 0, 0)).await.unwrap();
///     assert!(!first.cache_hit);
///     assert_eq!(first.tile.cols(), 256);
///
///     let again = service.get_tile(TileLocator::new(0, 0, 0)).await.unwrap();
///     assert!(again.cache_hit);
/// }
/// ```
pub struct TileService<R: RasterSource + 'static> {
    generator: Arc<TileGenerator<R>>,

    /// Cache for generated tiles
    cache: TileCache,

    /// Cache key prefix for this source
    source_id: Arc<str>,
}

impl<R: RasterSource + 'static> TileService<R> {
    /// Create a new tile service with default cache settings.
    pub fn new(generator: TileGenerator<R>) -> Self {
        Self::with_cache(Arc::new(generator), TileCache::new())
    }

    /// Create a new tile service with custom cache capacity in bytes.
    pub fn with_cache_capacity(generator: TileGenerator<R>, cache_capacity: usize) -> Self {
        Self::with_cache(Arc::new(generator), TileCache::with_capacity(cache_capacity))
    }

    /// Create a new tile service around a shared generator and cache.
    pub fn with_cache(generator: Arc<TileGenerator<R>>, cache: TileCache) -> Self {
        let source_id = Arc::from(generator.source().identifier());
        Self {
            generator,
            cache,
            source_id,
        }
    }

    /// Get a tile, using cache when available.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The source layout is unsupported
    /// - Reading the source fails
    /// - The generation task panics or is cancelled
    pub async fn get_tile(&self, locator: TileLocator) -> Result<TileResponse, TileError> {
        let cache_key = TileCacheKey::new(self.source_id.clone(), locator);

        if let Some(tile) = self.cache.get(&cache_key).await {
            trace!(tile = %locator, "Tile cache hit");
            return Ok(TileResponse {
                tile,
                cache_hit: true,
            });
        }

        let tile = self.generate_tile(locator).await?;
        self.cache.put(cache_key, tile.clone()).await;

        Ok(TileResponse {
            tile,
            cache_hit: false,
        })
    }

    /// Generate a tile without consulting or filling the cache.
    pub async fn generate_tile(&self, locator: TileLocator) -> Result<TileResource, TileError> {
        let generator = Arc::clone(&self.generator);
        tokio::task::spawn_blocking(move || generator.generate_tile(locator))
            .await
            .map_err(|e| TileError::Task {
                message: e.to_string(),
            })?
    }

    /// Get tile cache statistics.
    ///
    /// Returns `(current_size, capacity, entry_count)`.
    pub async fn cache_stats(&self) -> (usize, usize, usize) {
        let size = self.cache.size().await;
        let capacity = self.cache.capacity();
        let count = self.cache.len().await;
        (size, capacity, count)
    }

    /// Clear the tile cache.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Get a reference to the underlying generator.
    pub fn generator(&self) -> &Arc<TileGenerator<R>> {
        &self.generator
    }
}

// =============================================================================
// Tests
// =============================================================================
