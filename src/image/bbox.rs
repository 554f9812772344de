use std::fmt;

/// Axis-aligned integer rectangle in source pixel coordinates.
///
/// The box spans `[x, x + width) × [y, y + height)`. Coordinates are signed
/// and 64-bit so that pyramid arithmetic on coarse levels can produce boxes
/// far past the image without overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoundingBox {
    /// Left edge (inclusive)
    pub x: i64,
    /// Top edge (inclusive)
    pub y: i64,
    /// Width in pixels
    pub width: i64,
    /// Height in pixels
    pub height: i64,
}

impl BoundingBox {
    #[inline]
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box covering a whole `cols × rows` image.
    #[inline]
    pub fn from_dimensions(cols: u32, rows: u32) -> Self {
        Self::new(0, 0, cols as i64, rows as i64)
    }

    /// Right edge (exclusive), saturating at `i64::MAX`.
    #[inline]
    pub fn right(&self) -> i64 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive), saturating at `i64::MAX`.
    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered, zero for empty boxes.
    #[inline]
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width as u64 * self.height as u64
        }
    }

    /// True if the two boxes share at least one pixel.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        !other.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// The overlapping region, or `None` if the boxes are disjoint.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(BoundingBox::new(x, y, right - x, bottom - y))
    }

    /// Shrink this box in place to its intersection with `other`.
    ///
    /// A disjoint pair leaves this box empty.
    pub fn crop(&mut self, other: &BoundingBox) {
        *self = self
            .intersection(other)
            .unwrap_or_else(|| BoundingBox::new(self.x, self.y, 0, 0));
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}
