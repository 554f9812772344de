//! Tile service integration tests.
//!
//! Tests verify:
//! - Tile cache avoids repeated source reads
//! - Concurrent requests are served correctly
//! - Failed requests are surfaced and not cached

use std::sync::Arc;

use raster_tiler::error::TileError;
use raster_tiler::pixel::{ChannelType, PixelFormat, PixelGray};
use raster_tiler::raster::MemoryRaster;
use raster_tiler::tile::{TileCache, TileGenerator, TileLocator, TileService};

use super::test_utils::{gray16_ramp, gray16_raster, TrackingRaster};

// =============================================================================
// Cache Effectiveness
// =============================================================================

#[tokio::test]
async fn test_repeat_request_skips_source() {
    let raster = TrackingRaster::new(gray16_raster(200, 200, 64));
    let service = TileService::new(TileGenerator::new(raster.clone()));
    let locator = TileLocator::new(1, 1, 1);

    let first = service.get_tile(locator).await.unwrap();
    assert!(!first.cache_hit);
    assert_eq!(raster.request_count(), 1);

    for _ in 0..5 {
        let response = service.get_tile(locator).await.unwrap();
        assert!(response.cache_hit);
        assert_eq!(response.tile, first.tile);
    }
    assert_eq!(raster.request_count(), 1);
}

#[tokio::test]
async fn test_generate_tile_bypasses_cache() {
    let raster = TrackingRaster::new(gray16_raster(200, 200, 64));
    let service = TileService::new(TileGenerator::new(raster.clone()));
    let locator = TileLocator::new(0, 0, 2);

    service.generate_tile(locator).await.unwrap();
    service.generate_tile(locator).await.unwrap();
    assert_eq!(raster.request_count(), 2);

    let (_, _, count) = service.cache_stats().await;
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_small_cache_evicts() {
    let raster = TrackingRaster::new(gray16_raster(64, 64, 32));
    // Room for exactly one 32x32 u16 tile
    let service = TileService::with_cache(
        Arc::new(TileGenerator::new(raster.clone())),
        TileCache::with_capacity(32 * 32 * 2),
    );
    let first = TileLocator::new(0, 0, 1);
    let second = TileLocator::new(1, 0, 1);

    assert!(!service.get_tile(first).await.unwrap().cache_hit);
    assert!(service.get_tile(first).await.unwrap().cache_hit);
    assert!(!service.get_tile(second).await.unwrap().cache_hit);
    assert!(!service.get_tile(first).await.unwrap().cache_hit);
    assert_eq!(raster.request_count(), 3);

    let response = service.get_tile(first).await.unwrap();
    let image = response.tile.to_image::<PixelGray<u16>>().unwrap();
    assert_eq!(image.get(1, 1), gray16_ramp(64, 64).get(1, 1));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pyramid_requests() {
    let raster = TrackingRaster::new(gray16_raster(512, 256, 64));
    let service = Arc::new(TileService::new(TileGenerator::new(raster.clone())));
    let generator = Arc::clone(service.generator());

    let mut handles = Vec::new();
    for level in 0..generator.num_levels() {
        let (tiles_x, tiles_y) = generator.tiles_at_level(level).unwrap();
        for row in 0..tiles_y {
            for col in 0..tiles_x {
                let service = Arc::clone(&service);
                let locator = TileLocator::new(col, row, level);
                handles.push(tokio::spawn(async move {
                    (locator, service.get_tile(locator).await)
                }));
            }
        }
    }

    let total = handles.len();
    // 1 + 2 + 8 + 32 tiles across four levels
    assert_eq!(total, 43);

    for handle in handles {
        let (locator, result) = handle.await.unwrap();
        let response = result.unwrap();
        let expected = generator.generate_tile(locator).unwrap();
        assert_eq!(response.tile, expected, "tile {locator}");
    }

    let (_, _, cached) = service.cache_stats().await;
    assert_eq!(cached, total);
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_unsupported_format_surfaces() {
    let raster = MemoryRaster::new(
        16,
        16,
        1,
        PixelFormat::RgbAlpha,
        ChannelType::Float32,
        vec![0u8; 16 * 16 * 16],
    )
    .unwrap();
    let service = TileService::new(TileGenerator::new(raster));

    let err = service.get_tile(TileLocator::new(0, 0, 0)).await.unwrap_err();
    assert!(matches!(
        err,
        TileError::UnsupportedFormat {
            pixel_format: PixelFormat::RgbAlpha,
            channel_type: ChannelType::Float32,
        }
    ));

    // Out-of-bounds requests still succeed with a blank tile
    let blank = service.get_tile(TileLocator::new(3, 3, 0)).await.unwrap();
    assert_eq!(blank.tile.channel_type(), ChannelType::Uint8);
    let (_, _, count) = service.cache_stats().await;
    assert_eq!(count, 1);
}
