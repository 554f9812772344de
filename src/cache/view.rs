use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::CachedBlock;
use crate::error::{CacheError, RasterError};
use crate::image::{BoundingBox, ImageBuffer, ImageExpr};
use crate::pixel::{ChannelType, Pixel, PixelFormat};
use crate::raster::{check_region, region_len, RasterSource, DEFAULT_BLOCK_SIZE};

/// An image expression materialized once into temporary disk storage.
///
/// Construction evaluates the expression completely and writes the result to
/// a new [`CachedBlock`]; pixel reads go to that file and never re-evaluate
/// the expression.
///
/// # Sharing
///
/// - `clone()` shares the current block (one atomic increment, no I/O).
/// - [`assign`](Self::assign) materializes a new expression into a fresh
///   block and detaches from the old one. Other views still holding the old
///   block keep reading the old data.
/// - The backing file is removed when the last view sharing it is dropped.
///
/// Materialization is blocking; async callers should run it on a blocking
/// thread (e.g. `tokio::task::spawn_blocking`).
///
/// # Example
///
/// ```
/// use raster_tiler::cache::DiskCacheImageView;
/// use raster_tiler::image::{ImageBuffer, ImageExpr};
/// use raster_tiler::pixel::{Pixel, PixelRgb};
///
/// let source = ImageBuffer::from_fn(2, 2, |x, y| PixelRgb::<u8>::new(x as u8, y as u8, 0));
/// let mut view = DiskCacheImageView::new(&source).unwrap();
/// let copy = view.clone();
///
/// view.assign((&source).map(|p| p.saturating_add(PixelRgb::new(10, 10, 10)))).unwrap();
///
/// assert_eq!(copy.get(1, 1).unwrap(), PixelRgb::new(1, 1, 0));
/// assert_eq!(view.get(1, 1).unwrap(), PixelRgb::new(11, 11, 10));
/// ```
#[derive(Debug, Clone)]
pub struct DiskCacheImageView<P: Pixel> {
    block: CachedBlock,
    scratch_dir: PathBuf,
    _pixel: PhantomData<P>,
}

impl<P: Pixel> DiskCacheImageView<P> {
    /// Materialize `expr` into the system temporary directory.
    pub fn new<E>(expr: E) -> Result<Self, CacheError>
    where
        E: ImageExpr<Pixel = P>,
    {
        Self::with_scratch_dir(expr, std::env::temp_dir())
    }

    /// Materialize `expr` into `scratch_dir`.
    ///
    /// Later [`assign`](Self::assign) calls allocate in the same directory.
    pub fn with_scratch_dir<E>(expr: E, scratch_dir: impl Into<PathBuf>) -> Result<Self, CacheError>
    where
        E: ImageExpr<Pixel = P>,
    {
        let scratch_dir = scratch_dir.into();
        let block = CachedBlock::materialize(&expr, &scratch_dir)?;
        Ok(Self {
            block,
            scratch_dir,
            _pixel: PhantomData,
        })
    }

    /// Replace this view's contents with a newly materialized expression.
    ///
    /// On failure the view is left untouched.
    pub fn assign<E>(&mut self, expr: E) -> Result<(), CacheError>
    where
        E: ImageExpr<Pixel = P>,
    {
        let block = CachedBlock::materialize(&expr, &self.scratch_dir)?;
        self.block = block;
        Ok(())
    }

    pub fn cols(&self) -> u32 {
        self.block.cols()
    }

    pub fn rows(&self) -> u32 {
        self.block.rows()
    }

    pub fn planes(&self) -> u32 {
        self.block.planes()
    }

    /// Pixel `(x, y)` on the first plane.
    pub fn get(&self, x: u32, y: u32) -> Result<P, CacheError> {
        self.get_plane(x, y, 0)
    }

    /// Pixel `(x, y)` on `plane`.
    ///
    /// # Errors
    ///
    /// [`CacheError::PixelOutOfBounds`] outside `cols × rows × planes`.
    pub fn get_plane(&self, x: u32, y: u32, plane: u32) -> Result<P, CacheError> {
        if x >= self.cols() || y >= self.rows() || plane >= self.planes() {
            return Err(CacheError::PixelOutOfBounds {
                x,
                y,
                plane,
                cols: self.cols(),
                rows: self.rows(),
                planes: self.planes(),
            });
        }
        let mut raw = vec![0u8; P::SIZE];
        self.block.read_pixel(x, y, plane, &mut raw)?;
        Ok(P::read_ne(&raw))
    }

    /// Read every plane of `bbox` into memory.
    pub fn read_region(&self, bbox: BoundingBox) -> Result<ImageBuffer<P>, CacheError> {
        if !BoundingBox::from_dimensions(self.cols(), self.rows()).contains(&bbox) {
            return Err(CacheError::RegionOutOfBounds {
                bbox,
                cols: self.cols(),
                rows: self.rows(),
            });
        }
        let mut raw = vec![0u8; region_len(&bbox, self.planes(), P::SIZE)];
        self.block.read_region(&bbox, &mut raw)?;
        let image = ImageBuffer::from_ne_bytes(
            bbox.width as u32,
            bbox.height as u32,
            self.planes(),
            &raw,
        )?;
        Ok(image)
    }

    /// Read the whole cached image into memory.
    pub fn to_image(&self) -> Result<ImageBuffer<P>, CacheError> {
        self.read_region(BoundingBox::from_dimensions(self.cols(), self.rows()))
    }

    /// Number of views sharing the current backing block.
    pub fn ref_count(&self) -> usize {
        self.block.ref_count()
    }

    /// True if both views read from the same backing block.
    pub fn shares_storage_with(&self, other: &DiskCacheImageView<P>) -> bool {
        self.block.ptr_eq(&other.block)
    }

    /// Location of the current backing file.
    pub fn path(&self) -> &Path {
        self.block.path()
    }

    pub fn block(&self) -> &CachedBlock {
        &self.block
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }
}

impl<P: Pixel> RasterSource for DiskCacheImageView<P> {
    fn cols(&self) -> u32 {
        self.block.cols()
    }

    fn rows(&self) -> u32 {
        self.block.rows()
    }

    fn planes(&self) -> u32 {
        self.block.planes()
    }

    fn pixel_format(&self) -> PixelFormat {
        P::FORMAT
    }

    fn channel_type(&self) -> ChannelType {
        P::CHANNEL_TYPE
    }

    fn block_read_size(&self) -> (u32, u32) {
        (
            self.cols().clamp(1, DEFAULT_BLOCK_SIZE),
            self.rows().clamp(1, DEFAULT_BLOCK_SIZE),
        )
    }

    fn identifier(&self) -> &str {
        self.block.identifier()
    }

    fn read(&self, buffer: &mut [u8], bbox: BoundingBox) -> Result<(), RasterError> {
        check_region(
            &bbox,
            self.cols(),
            self.rows(),
            region_len(&bbox, self.planes(), P::SIZE),
            buffer.len(),
        )?;
        self.block.read_region(&bbox, buffer)?;
        Ok(())
    }
}
