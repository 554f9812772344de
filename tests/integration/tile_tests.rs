//! Tile generation integration tests.
//!
//! Tests verify:
//! - Pyramid level count and per-level geometry
//! - Finest level is pixel-identical to a direct source read
//! - Coarse levels subsample by the level factor
//! - Out-of-bounds requests produce blank tiles, partial tiles are cropped
//! - Unsupported layouts fail without producing data
//! - Concurrent generation from many threads

use std::sync::Arc;
use std::thread;

use raster_tiler::error::TileError;
use raster_tiler::image::{BoundingBox, ImageBuffer};
use raster_tiler::pixel::{ChannelType, PixelFormat, PixelGray, PixelGrayA, PixelRgb, PixelRgba};
use raster_tiler::raster::{MemoryRaster, RasterSource};
use raster_tiler::tile::{num_levels, TileGenerator, TileLocator};

use super::test_utils::{gray16_ramp, gray16_raster, TrackingRaster};

// =============================================================================
// Pyramid Geometry
// =============================================================================

#[test]
fn test_num_levels_follows_source() {
    let generator = TileGenerator::new(gray16_raster(1000, 700, 128));
    // 1000 / 128 = 7.8 → ceil(log2) = 3
    assert_eq!(generator.num_levels(), 4);
    assert_eq!(generator.tile_size(), (128, 128));
    assert_eq!(num_levels(1000, 700, 128, 128), generator.num_levels());
}

#[test]
fn test_level_grid_covers_image() {
    let generator = TileGenerator::new(gray16_raster(1000, 700, 128));

    for level in 0..generator.num_levels() {
        let (width, height) = generator.level_dimensions(level).unwrap();
        let (tiles_x, tiles_y) = generator.tiles_at_level(level).unwrap();

        let mut covered_width = 0;
        for col in 0..tiles_x {
            let tile = generator.generate_tile(TileLocator::new(col, 0, level)).unwrap();
            covered_width += tile.cols();
        }
        let mut covered_height = 0;
        for row in 0..tiles_y {
            let tile = generator.generate_tile(TileLocator::new(0, row, level)).unwrap();
            covered_height += tile.rows();
        }

        assert_eq!(covered_width, width, "level {level}");
        assert_eq!(covered_height, height, "level {level}");
    }
}

// =============================================================================
// Pixel Content
// =============================================================================

#[test]
fn test_finest_level_matches_direct_read() {
    let raster = gray16_raster(300, 200, 64);
    let generator = TileGenerator::new(raster.clone());
    let finest = generator.num_levels() - 1;

    let tile = generator.generate_tile(TileLocator::new(2, 1, finest)).unwrap();
    let image = tile.to_image::<PixelGray<u16>>().unwrap();

    let bbox = BoundingBox::new(128, 64, 64, 64);
    let mut direct = vec![0u8; 64 * 64 * 2];
    raster.read(&mut direct, bbox).unwrap();

    assert_eq!(tile.data().as_ref(), direct.as_slice());
    assert_eq!(image.get(0, 0), Some(PixelGray::new(128 + 64 * 300)));
}

#[test]
fn test_coarse_level_subsamples() {
    let generator = TileGenerator::new(gray16_raster(256, 256, 64));
    assert_eq!(generator.num_levels(), 3);

    // Level 0: factor 4 over the whole image
    let tile = generator.generate_tile(TileLocator::new(0, 0, 0)).unwrap();
    assert_eq!((tile.cols(), tile.rows()), (64, 64));

    let image = tile.to_image::<PixelGray<u16>>().unwrap();
    let source = gray16_ramp(256, 256);
    for (x, y) in [(0, 0), (5, 3), (63, 63)] {
        assert_eq!(image.get(x, y), source.get(x * 4, y * 4), "({x}, {y})");
    }
}

#[test]
fn test_output_dimensions_round_up() {
    // 1001 x 999 with 250 tiles: 4 levels, level 0 factor 8
    let generator = TileGenerator::new(gray16_raster(1001, 999, 250));
    assert_eq!(generator.num_levels(), 4);

    let tile = generator.generate_tile(TileLocator::new(0, 0, 0)).unwrap();
    assert_eq!((tile.cols(), tile.rows()), (126, 125));
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn test_out_of_bounds_tile_is_blank() {
    let img = ImageBuffer::from_fn(100, 100, |x, y| PixelRgb::<u16>::new(x as u16, y as u16, 1));
    let generator = TileGenerator::new(MemoryRaster::from_image(&img).with_block_size(64, 32));

    let tile = generator.generate_tile(TileLocator::new(9, 9, 1)).unwrap();
    assert_eq!((tile.cols(), tile.rows()), (64, 32));
    assert_eq!(tile.pixel_format(), PixelFormat::Gray);
    assert_eq!(tile.channel_type(), ChannelType::Uint8);
    assert!(tile.data().iter().all(|&b| b == 0));
}

#[test]
fn test_blank_tile_skips_source_reads() {
    let raster = TrackingRaster::new(gray16_raster(100, 100, 32));
    let generator = TileGenerator::new(raster.clone());

    generator.generate_tile(TileLocator::new(50, 0, 2)).unwrap();
    generator.generate_tile(TileLocator::new(0, 0, 40)).unwrap();
    assert_eq!(raster.request_count(), 0);

    generator.generate_tile(TileLocator::new(3, 3, 2)).unwrap();
    assert_eq!(raster.requests(), vec![BoundingBox::new(96, 96, 4, 4)]);
}

#[test]
fn test_partial_tile_is_cropped() {
    let generator = TileGenerator::new(gray16_raster(100, 70, 32));
    let finest = generator.num_levels() - 1;

    let tile = generator.generate_tile(TileLocator::new(3, 2, finest)).unwrap();
    assert_eq!((tile.cols(), tile.rows()), (4, 6));

    let image = tile.to_image::<PixelGray<u16>>().unwrap();
    assert_eq!(image.get(3, 5), Some(PixelGray::new(99 + 69 * 100)));
}

#[test]
fn test_unsupported_format_fails() {
    let raster = MemoryRaster::new(8, 8, 1, PixelFormat::Rgb, ChannelType::Int16, vec![0u8; 8 * 8 * 6])
        .unwrap();
    let generator = TileGenerator::new(raster);

    let result = generator.generate_tile(TileLocator::new(0, 0, 0));
    match result {
        Err(TileError::UnsupportedFormat {
            pixel_format,
            channel_type,
        }) => {
            assert_eq!(pixel_format, PixelFormat::Rgb);
            assert_eq!(channel_type, ChannelType::Int16);
        }
        other => panic!("Expected UnsupportedFormat, got {other:?}"),
    }

    // The generator keeps serving after a failed request
    let blank = generator.generate_tile(TileLocator::new(5, 5, 0)).unwrap();
    assert_eq!(blank.pixel_format(), PixelFormat::Gray);
}

#[test]
fn test_supported_layouts_generate() {
    let gray_alpha = ImageBuffer::from_fn(16, 16, |x, _| PixelGrayA::<f32>::new(x as f32, 1.0));
    let rgba = ImageBuffer::from_fn(16, 16, |_, y| PixelRgba::<u16>::new(y as u16, 0, 0, 9));

    let tile = TileGenerator::new(MemoryRaster::from_image(&gray_alpha).with_block_size(8, 8))
        .generate_tile(TileLocator::new(0, 0, 0))
        .unwrap();
    assert_eq!((tile.cols(), tile.rows()), (8, 8));
    assert_eq!(tile.pixel_format(), PixelFormat::GrayAlpha);
    assert_eq!(tile.channel_type(), ChannelType::Float32);

    let tile = TileGenerator::new(MemoryRaster::from_image(&rgba).with_block_size(8, 8))
        .generate_tile(TileLocator::new(0, 1, 1))
        .unwrap();
    let image = tile.to_image::<PixelRgba<u16>>().unwrap();
    assert_eq!(image.get(0, 0), Some(PixelRgba::new(8, 0, 0, 9)));
}

#[test]
fn test_placeholders_not_implemented() {
    let generator = TileGenerator::new(gray16_raster(10, 10, 8));
    assert!(matches!(generator.minmax(), Err(TileError::NotImplemented { .. })));
    assert!(matches!(
        generator.sample(0, 0, 0, 1),
        Err(TileError::NotImplemented { .. })
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_generation() {
    let raster = TrackingRaster::new(gray16_raster(512, 512, 64));
    let generator = Arc::new(TileGenerator::new(raster.clone()));
    let finest = generator.num_levels() - 1;

    let handles: Vec<_> = (0..8u32)
        .map(|col| {
            let generator = Arc::clone(&generator);
            thread::spawn(move || {
                (0..8u32)
                    .map(|row| generator.generate_tile(TileLocator::new(col, row, finest)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let source = gray16_ramp(512, 512);
    for (col, handle) in handles.into_iter().enumerate() {
        let tiles = handle.join().unwrap();
        for (row, tile) in tiles.iter().enumerate() {
            let image = tile.to_image::<PixelGray<u16>>().unwrap();
            assert_eq!(
                image.get(0, 0),
                source.get(col as u32 * 64, row as u32 * 64),
                "tile {col},{row}"
            );
        }
    }
    assert_eq!(raster.request_count(), 64);
}
