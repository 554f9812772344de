use crate::pixel::Pixel;

use super::ImageBuffer;

/// A lazily evaluated image.
///
/// An expression knows its dimensions and can compute any pixel on demand.
/// Evaluation may be arbitrarily expensive; [`DiskCacheImageView`] exists to
/// pay that cost exactly once.
///
/// [`DiskCacheImageView`]: crate::cache::DiskCacheImageView
pub trait ImageExpr {
    type Pixel: Pixel;

    fn cols(&self) -> u32;

    fn rows(&self) -> u32;

    fn planes(&self) -> u32 {
        1
    }

    /// Compute the pixel at `(x, y)` on `plane`.
    ///
    /// Callers must stay inside `cols × rows × planes`.
    fn pixel(&self, x: u32, y: u32, plane: u32) -> Self::Pixel;

    /// Apply `f` to every pixel of this expression.
    fn map<F, Q>(self, f: F) -> MapExpr<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Pixel) -> Q,
        Q: Pixel,
    {
        MapExpr { inner: self, f }
    }

    /// Evaluate the whole expression into memory.
    fn rasterize(&self) -> ImageBuffer<Self::Pixel> {
        let mut out = ImageBuffer::with_planes(self.cols(), self.rows(), self.planes());
        for plane in 0..self.planes() {
            for y in 0..self.rows() {
                for x in 0..self.cols() {
                    out.set(x, y, plane, self.pixel(x, y, plane));
                }
            }
        }
        out
    }
}

impl<E: ImageExpr + ?Sized> ImageExpr for &E {
    type Pixel = E::Pixel;

    fn cols(&self) -> u32 {
        (**self).cols()
    }

    fn rows(&self) -> u32 {
        (**self).rows()
    }

    fn planes(&self) -> u32 {
        (**self).planes()
    }

    fn pixel(&self, x: u32, y: u32, plane: u32) -> Self::Pixel {
        (**self).pixel(x, y, plane)
    }
}

/// Per-pixel transform of another expression. See [`ImageExpr::map`].
#[derive(Debug, Clone)]
pub struct MapExpr<E, F> {
    inner: E,
    f: F,
}

impl<E, F, Q> ImageExpr for MapExpr<E, F>
where
    E: ImageExpr,
    F: Fn(E::Pixel) -> Q,
    Q: Pixel,
{
    type Pixel = Q;

    fn cols(&self) -> u32 {
        self.inner.cols()
    }

    fn rows(&self) -> u32 {
        self.inner.rows()
    }

    fn planes(&self) -> u32 {
        self.inner.planes()
    }

    fn pixel(&self, x: u32, y: u32, plane: u32) -> Q {
        (self.f)(self.inner.pixel(x, y, plane))
    }
}

/// Downsample by keeping every `factor`-th pixel on both axes.
///
/// The output is `ceil(cols / factor) × ceil(rows / factor)`; pixel `(i, j)`
/// is source pixel `(i * factor, j * factor)`. A factor of 0 or 1 returns a
/// copy of the input.
pub fn subsample<P: Pixel>(image: &ImageBuffer<P>, factor: u64) -> ImageBuffer<P> {
    if factor <= 1 {
        return image.clone();
    }
    let cols = image.cols() as u64;
    let rows = image.rows() as u64;
    let out_cols = cols.div_ceil(factor) as u32;
    let out_rows = rows.div_ceil(factor) as u32;

    let mut out = ImageBuffer::with_planes(out_cols, out_rows, image.planes());
    for plane in 0..image.planes() {
        for j in 0..out_rows {
            let y = (j as u64 * factor) as u32;
            for i in 0..out_cols {
                let x = (i as u64 * factor) as u32;
                out.set(i, j, plane, image.pixel(x, y, plane));
            }
        }
    }
    out
}
