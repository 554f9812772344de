//! In-memory image primitives.
//!
//! - [`BoundingBox`]: integer rectangle used for regions and tile extents
//! - [`ImageBuffer`]: owned typed pixel storage
//! - [`ImageExpr`]: lazily evaluated image expression
//! - [`subsample`]: stride downsampling used to build coarse pyramid levels

mod bbox;
mod buffer;
mod expr;

pub use bbox::BoundingBox;
pub use buffer::ImageBuffer;
pub use expr::{subsample, ImageExpr, MapExpr};
