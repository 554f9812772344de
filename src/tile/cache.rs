//! Tile cache for generated tiles.
//!
//! Generating a tile reads a source region and subsamples it, which is
//! expensive for coarse levels. This LRU cache keeps finished tiles so repeat
//! requests skip both steps.
//!
//! # Cache Key
//!
//! Tiles are cached by source identifier plus [`TileLocator`], so two sources
//! sharing a cache never collide on the same coordinates.
//!
//! # Size-Based Eviction
//!
//! The cache tracks the total pixel bytes of cached tiles and evicts
//! least-recently-used entries when the capacity is exceeded.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;

use super::{TileLocator, TileResource};

/// Default cache capacity: 64MB
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 64 * 1024 * 1024;

/// Default maximum number of entries (to bound LRU overhead)
const DEFAULT_MAX_ENTRIES: usize = 10_000;

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for generated tiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileCacheKey {
    /// Source identifier (typically the file path)
    pub source: Arc<str>,

    /// Tile coordinates and level
    pub locator: TileLocator,
}

impl TileCacheKey {
    pub fn new(source: impl Into<Arc<str>>, locator: TileLocator) -> Self {
        Self {
            source: source.into(),
            locator,
        }
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

/// LRU cache for generated tiles with size-based capacity.
///
/// # Thread Safety
///
/// The cache is thread-safe and can be shared across async tasks via `Arc`.
///
/// # Example
///
/// ```
/// use raster_tiler::tile::{TileCache, TileCacheKey, TileLocator, TileResource};
///
/// #[tokio::main]
/// async fn main() {
///     let cache = TileCache::new();
///
///     let key = TileCacheKey::new("scan.tif", TileLocator::new(1, 2, 0));
///     let tile = TileResource::blank(256, 256);
///
///     cache.put(key.clone(), tile.clone()).await;
///     assert_eq!(cache.get(&key).await, Some(tile));
/// }
/// ```
pub struct TileCache {
    cache: RwLock<LruCache<TileCacheKey, TileResource>>,

    /// Maximum total size in bytes
    max_size: usize,

    /// Current total size in bytes
    current_size: RwLock<usize>,
}

impl TileCache {
    /// Create a new tile cache with default capacity (64MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Create a new tile cache with the specified capacity in bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a new tile cache with specified capacity and maximum entries.
    ///
    /// A `max_entries` of zero is treated as one.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(entries)),
            max_size,
            current_size: RwLock::new(0),
        }
    }

    /// Get a tile from the cache, marking it as recently used.
    pub async fn get(&self, key: &TileCacheKey) -> Option<TileResource> {
        let mut cache = self.cache.write().await;
        cache.get(key).cloned()
    }

    /// Check if a tile is in the cache without updating LRU order.
    pub async fn contains(&self, key: &TileCacheKey) -> bool {
        let cache = self.cache.read().await;
        cache.contains(key)
    }

    /// Store a tile in the cache.
    ///
    /// Least-recently-used entries are evicted until the cache is within
    /// capacity. A tile larger than the whole capacity is not kept.
    pub async fn put(&self, key: TileCacheKey, tile: TileResource) {
        let tile_size = tile.byte_len();
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;

        // `push` hands back either the replaced value for `key` or an entry
        // evicted by the entry limit; both leave the cache
        if let Some((_, displaced)) = cache.push(key, tile) {
            *current_size = current_size.saturating_sub(displaced.byte_len());
        }
        *current_size += tile_size;

        while *current_size > self.max_size {
            match cache.pop_lru() {
                Some((_, evicted)) => {
                    *current_size = current_size.saturating_sub(evicted.byte_len());
                }
                None => break,
            }
        }
    }

    /// Remove a tile from the cache, returning it if present.
    pub async fn remove(&self, key: &TileCacheKey) -> Option<TileResource> {
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;

        let tile = cache.pop(key)?;
        *current_size = current_size.saturating_sub(tile.byte_len());
        Some(tile)
    }

    /// Clear all entries from the cache.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;
        cache.clear();
        *current_size = 0;
    }

    /// Get the current number of cached tiles.
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.len()
    }

    pub async fn is_empty(&self) -> bool {
        let cache = self.cache.read().await;
        cache.is_empty()
    }

    /// Get the current total size of cached tiles in bytes.
    pub async fn size(&self) -> usize {
        *self.current_size.read().await
    }

    /// Get the maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
