//! File format integration tests.
//!
//! Tests verify:
//! - PNG and TIFF files open as raster sources with the right layout
//! - Missing and corrupt files fail with I/O errors
//! - Tiles generated from files round-trip through the PNG encoder

use image::{ImageBuffer as ImgBuffer, Luma};

use raster_tiler::error::IoError;
use raster_tiler::pixel::{ChannelType, PixelFormat, PixelGray, PixelRgb};
use raster_tiler::raster::{FileRaster, RasterSource};
use raster_tiler::tile::{PngTileEncoder, TileGenerator, TileLocator};

use super::test_utils::write_rgb_png;

#[test]
fn test_open_rgb_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb_png(dir.path(), "scan.png", 300, 120);

    let raster = FileRaster::open(&path).unwrap();
    assert_eq!((raster.cols(), raster.rows(), raster.planes()), (300, 120, 1));
    assert_eq!(raster.pixel_format(), PixelFormat::Rgb);
    assert_eq!(raster.channel_type(), ChannelType::Uint8);
    assert_eq!(raster.path(), path.as_path());
}

#[test]
fn test_open_tiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb_png(dir.path(), "scan.tif", 64, 48);

    let generator = TileGenerator::open(&path, 32).unwrap();
    assert_eq!(generator.pixel_format(), PixelFormat::Rgb);
    assert_eq!(generator.num_levels(), 2);

    let tile = generator.generate_tile(TileLocator::new(1, 1, 1)).unwrap();
    assert_eq!((tile.cols(), tile.rows()), (32, 16));
    let image = tile.to_image::<PixelRgb<u8>>().unwrap();
    assert_eq!(image.get(0, 0), Some(PixelRgb::new(32, 32, 0)));
}

#[test]
fn test_open_gray16_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("depth.png");
    let img: ImgBuffer<Luma<u16>, Vec<u16>> =
        ImgBuffer::from_fn(20, 10, |x, y| Luma([(x * 1000 + y) as u16]));
    img.save(&path).unwrap();

    let generator = TileGenerator::open(&path, 16).unwrap();
    assert_eq!(generator.channel_type(), ChannelType::Uint16);

    let tile = generator.generate_tile(TileLocator::new(1, 0, 1)).unwrap();
    assert_eq!((tile.cols(), tile.rows()), (4, 10));
    let image = tile.to_image::<PixelGray<u16>>().unwrap();
    assert_eq!(image.get(3, 9), Some(PixelGray::new(19 * 1000 + 9)));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = FileRaster::open(dir.path().join("missing.png"));
    assert!(matches!(result, Err(IoError::NotFound(_))));
}

#[test]
fn test_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.png");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nnot really a png").unwrap();

    let result = TileGenerator::open(&path, 256);
    assert!(matches!(result, Err(IoError::Decode { .. })));
}

#[test]
fn test_tile_png_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_rgb_png(dir.path(), "scan.png", 200, 100);
    let generator = TileGenerator::open(&path, 64).unwrap();
    assert_eq!(generator.num_levels(), 3);

    let encoder = PngTileEncoder::new();
    let tile = generator.generate_tile(TileLocator::new(3, 1, 2)).unwrap();
    let encoded = encoder.encode(&tile).unwrap();
    assert_eq!(encoder.dimensions(&encoded).unwrap(), (8, 36));

    let decoded = image::load_from_memory(&encoded).unwrap().into_rgb8();
    let expected = tile.to_image::<PixelRgb<u8>>().unwrap();
    for (x, y) in [(0, 0), (7, 35), (4, 20)] {
        let px = decoded.get_pixel(x, y).0;
        assert_eq!(Some(PixelRgb::new(px[0], px[1], px[2])), expected.get(x, y));
    }

    // Coarsest level and blank tiles encode too
    let coarse = encoder
        .encode(&generator.generate_tile(TileLocator::new(0, 0, 0)).unwrap())
        .unwrap();
    assert_eq!(encoder.dimensions(&coarse).unwrap(), (50, 25));
    let blank = encoder
        .encode(&generator.generate_tile(TileLocator::new(9, 9, 0)).unwrap())
        .unwrap();
    assert_eq!(encoder.dimensions(&blank).unwrap(), (64, 64));
}
