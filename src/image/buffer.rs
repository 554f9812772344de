use crate::error::IoError;
use crate::pixel::Pixel;

use super::ImageExpr;

/// Owned, in-memory image of typed pixels.
///
/// Pixels are stored plane-major, then row-major: the pixel at
/// `(x, y, plane)` lives at index `(plane * rows + y) * cols + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer<P: Pixel> {
    cols: u32,
    rows: u32,
    planes: u32,
    data: Vec<P>,
}

impl<P: Pixel> ImageBuffer<P> {
    /// Create a single-plane image filled with the default (zero) pixel.
    pub fn new(cols: u32, rows: u32) -> Self {
        Self::with_planes(cols, rows, 1)
    }

    /// Create a zero-filled image with `planes` planes.
    pub fn with_planes(cols: u32, rows: u32, planes: u32) -> Self {
        let len = cols as usize * rows as usize * planes as usize;
        Self {
            cols,
            rows,
            planes,
            data: vec![P::default(); len],
        }
    }

    /// Create a single-plane image by evaluating `f` at every pixel.
    pub fn from_fn(cols: u32, rows: u32, mut f: impl FnMut(u32, u32) -> P) -> Self {
        let mut data = Vec::with_capacity(cols as usize * rows as usize);
        for y in 0..rows {
            for x in 0..cols {
                data.push(f(x, y));
            }
        }
        Self {
            cols,
            rows,
            planes: 1,
            data,
        }
    }

    /// Decode an image from native-endian bytes laid out plane-major.
    pub fn from_ne_bytes(
        cols: u32,
        rows: u32,
        planes: u32,
        bytes: &[u8],
    ) -> Result<Self, IoError> {
        let count = cols as usize * rows as usize * planes as usize;
        let expected = count * P::SIZE;
        if bytes.len() != expected {
            return Err(IoError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        let data = bytes.chunks_exact(P::SIZE).map(P::read_ne).collect();
        Ok(Self {
            cols,
            rows,
            planes,
            data,
        })
    }

    /// Encode the image as native-endian bytes laid out plane-major.
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.data.len() * P::SIZE];
        for (px, out) in self.data.iter().zip(bytes.chunks_exact_mut(P::SIZE)) {
            px.write_ne(out);
        }
        bytes
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn planes(&self) -> u32 {
        self.planes
    }

    #[inline]
    fn index(&self, x: u32, y: u32, plane: u32) -> usize {
        (plane as usize * self.rows as usize + y as usize) * self.cols as usize + x as usize
    }

    #[inline]
    fn in_bounds(&self, x: u32, y: u32, plane: u32) -> bool {
        x < self.cols && y < self.rows && plane < self.planes
    }

    /// Pixel on the first plane, or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<P> {
        self.get_plane(x, y, 0)
    }

    /// Pixel on `plane`, or `None` outside the image.
    pub fn get_plane(&self, x: u32, y: u32, plane: u32) -> Option<P> {
        if !self.in_bounds(x, y, plane) {
            return None;
        }
        Some(self.data[self.index(x, y, plane)])
    }

    /// Overwrite a pixel. Returns `false` if the coordinate is outside the image.
    pub fn set(&mut self, x: u32, y: u32, plane: u32, px: P) -> bool {
        if !self.in_bounds(x, y, plane) {
            return false;
        }
        let idx = self.index(x, y, plane);
        self.data[idx] = px;
        true
    }

    /// All pixels in storage order.
    pub fn as_slice(&self) -> &[P] {
        &self.data
    }
}

impl<P: Pixel> ImageExpr for ImageBuffer<P> {
    type Pixel = P;

    fn cols(&self) -> u32 {
        self.cols
    }

    fn rows(&self) -> u32 {
        self.rows
    }

    fn planes(&self) -> u32 {
        self.planes
    }

    fn pixel(&self, x: u32, y: u32, plane: u32) -> P {
        self.data[self.index(x, y, plane)]
    }
}
