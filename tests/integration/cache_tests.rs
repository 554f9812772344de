//! Disk cache integration tests.
//!
//! Tests verify:
//! - Materialized views reproduce the source pixels exactly
//! - Copies share storage without allocating new files
//! - Assigning a new expression detaches from the shared block
//! - Backing files are deleted exactly when the last view goes away
//! - Cached views can be tiled like any other raster

use std::thread;

use raster_tiler::cache::{DiskCacheImageView, CACHE_FILE_PREFIX};
use raster_tiler::error::CacheError;
use raster_tiler::image::{ImageBuffer, ImageExpr};
use raster_tiler::pixel::{Pixel, PixelGray, PixelRgb};
use raster_tiler::raster::RasterSource;
use raster_tiler::tile::{TileGenerator, TileLocator};

use super::test_utils::{count_files, gray16_ramp, rgb_2x2};

// =============================================================================
// Materialization
// =============================================================================

#[test]
fn test_rgb_view_reproduces_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let view = DiskCacheImageView::with_scratch_dir(&rgb_2x2(), dir.path()).unwrap();

    assert_eq!((view.cols(), view.rows(), view.planes()), (2, 2, 1));
    assert_eq!(view.get(0, 0).unwrap(), PixelRgb::new(128, 128, 128));
    assert_eq!(view.get(1, 0).unwrap(), PixelRgb::new(85, 0, 0));
    assert_eq!(view.get(0, 1).unwrap(), PixelRgb::new(0, 170, 0));
    assert_eq!(view.get(1, 1).unwrap(), PixelRgb::new(0, 0, 255));
}

#[test]
fn test_backing_file_lives_in_scratch_dir() {
    let dir = tempfile::tempdir().unwrap();
    let view = DiskCacheImageView::with_scratch_dir(&rgb_2x2(), dir.path()).unwrap();

    assert_eq!(view.path().parent(), Some(dir.path()));
    let name = view.path().file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(CACHE_FILE_PREFIX));
    assert_eq!(
        std::fs::metadata(view.path()).unwrap().len(),
        4 * PixelRgb::<u8>::SIZE as u64
    );
}

#[test]
fn test_lazy_expression_is_evaluated_once() {
    let dir = tempfile::tempdir().unwrap();
    let source = gray16_ramp(32, 32);
    let doubled = (&source).map(|p| p.saturating_add(p));

    let view = DiskCacheImageView::with_scratch_dir(doubled, dir.path()).unwrap();
    assert_eq!(view.get(3, 1).unwrap(), PixelGray::new(2 * (3 + 32)));
    assert_eq!(view.to_image().unwrap(), (&source).map(|p| p.saturating_add(p)).rasterize());
}

#[test]
fn test_out_of_bounds_pixel() {
    let dir = tempfile::tempdir().unwrap();
    let view = DiskCacheImageView::with_scratch_dir(&rgb_2x2(), dir.path()).unwrap();

    assert!(matches!(view.get(2, 0), Err(CacheError::PixelOutOfBounds { .. })));
    assert!(matches!(view.get(0, 2), Err(CacheError::PixelOutOfBounds { .. })));
    assert!(matches!(
        view.get_plane(0, 0, 1),
        Err(CacheError::PixelOutOfBounds { .. })
    ));
}

#[test]
fn test_unwritable_scratch_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let result = DiskCacheImageView::with_scratch_dir(&rgb_2x2(), &missing);
    assert!(matches!(result, Err(CacheError::Allocate { .. })));
    assert_eq!(count_files(dir.path()), 0);
}

// =============================================================================
// Sharing and Detachment
// =============================================================================

#[test]
fn test_copy_shares_storage() {
    let dir = tempfile::tempdir().unwrap();
    let view = DiskCacheImageView::with_scratch_dir(&rgb_2x2(), dir.path()).unwrap();
    assert_eq!(count_files(dir.path()), 1);

    let copy = view.clone();
    assert_eq!(count_files(dir.path()), 1);
    assert!(copy.shares_storage_with(&view));
    assert_eq!(view.ref_count(), 2);
    assert_eq!(copy.path(), view.path());

    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(copy.get(x, y).unwrap(), view.get(x, y).unwrap());
        }
    }
}

#[test]
fn test_assign_detaches() {
    let dir = tempfile::tempdir().unwrap();
    let source = rgb_2x2();
    let mut view = DiskCacheImageView::with_scratch_dir(&source, dir.path()).unwrap();
    let copy = view.clone();

    view.assign((&source).map(|p| PixelRgb::new(p.b(), p.g(), p.r()))).unwrap();

    assert!(!copy.shares_storage_with(&view));
    assert_eq!(copy.ref_count(), 1);
    assert_eq!(view.ref_count(), 1);
    assert_eq!(count_files(dir.path()), 2);

    assert_eq!(copy.get(1, 0).unwrap(), PixelRgb::new(85, 0, 0));
    assert_eq!(view.get(1, 0).unwrap(), PixelRgb::new(0, 0, 85));
    assert_eq!(copy.get(1, 1).unwrap(), PixelRgb::new(0, 0, 255));
    assert_eq!(view.get(1, 1).unwrap(), PixelRgb::new(255, 0, 0));
}

#[test]
fn test_assign_releases_unshared_block() {
    let dir = tempfile::tempdir().unwrap();
    let source = rgb_2x2();
    let mut view = DiskCacheImageView::with_scratch_dir(&source, dir.path()).unwrap();
    let old_path = view.path().to_path_buf();

    view.assign(&source).unwrap();

    assert!(!old_path.exists());
    assert!(view.path().exists());
    assert_eq!(count_files(dir.path()), 1);
}

#[test]
fn test_file_removed_after_last_drop() {
    let dir = tempfile::tempdir().unwrap();
    let view = DiskCacheImageView::with_scratch_dir(&rgb_2x2(), dir.path()).unwrap();
    let path = view.path().to_path_buf();
    let copies: Vec<_> = (0..4).map(|_| view.clone()).collect();

    drop(view);
    assert!(path.exists());

    for (i, copy) in copies.into_iter().enumerate() {
        assert_eq!(copy.ref_count(), 4 - i);
        drop(copy);
    }
    assert!(!path.exists());
    assert_eq!(count_files(dir.path()), 0);
}

#[test]
fn test_concurrent_clone_and_drop() {
    let dir = tempfile::tempdir().unwrap();
    let view = DiskCacheImageView::with_scratch_dir(&gray16_ramp(16, 16), dir.path()).unwrap();
    let path = view.path().to_path_buf();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let view = view.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let copy = view.clone();
                    assert_eq!(copy.get(i, 1).unwrap(), PixelGray::new(i as u16 + 16));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(view.ref_count(), 1);
    assert!(path.exists());
    drop(view);
    assert!(!path.exists());
}

// =============================================================================
// Tiling Cached Views
// =============================================================================

#[test]
fn test_tile_cached_view() {
    let dir = tempfile::tempdir().unwrap();
    let source = gray16_ramp(600, 300);
    let view = DiskCacheImageView::with_scratch_dir(&source, dir.path()).unwrap();
    assert_eq!(view.block_read_size(), (256, 256));

    let generator = TileGenerator::new(view.clone());
    assert_eq!(generator.num_levels(), 3);

    let tile = generator.generate_tile(TileLocator::new(2, 1, 2)).unwrap();
    assert_eq!((tile.cols(), tile.rows()), (88, 44));
    let image = tile.to_image::<PixelGray<u16>>().unwrap();
    assert_eq!(image.get(0, 0), source.get(512, 256));

    let coarse = generator.generate_tile(TileLocator::new(0, 0, 0)).unwrap();
    assert_eq!((coarse.cols(), coarse.rows()), (150, 75));

    // The generator holds its own reference to the block
    assert_eq!(view.ref_count(), 2);
}

#[test]
fn test_cached_view_read_region_matches_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = ImageBuffer::from_fn(40, 30, |x, y| PixelRgb::<u16>::new(x as u16, y as u16, 7));
    let view = DiskCacheImageView::with_scratch_dir(&source, dir.path()).unwrap();

    let region = view
        .read_region(raster_tiler::image::BoundingBox::new(10, 5, 3, 2))
        .unwrap();
    assert_eq!((region.cols(), region.rows()), (3, 2));
    assert_eq!(region.get(2, 1), Some(PixelRgb::new(12, 6, 7)));
}
