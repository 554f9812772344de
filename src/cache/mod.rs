//! Disk-backed materialization cache.
//!
//! Large computed images cannot stay in memory, and recomputing an expensive
//! expression on every pixel access is not an option. [`DiskCacheImageView`]
//! evaluates an [`ImageExpr`](crate::image::ImageExpr) once, writes the result
//! to a temporary file, and serves pixel reads from that file.
//!
//! # Storage lifetime
//!
//! ```text
//!  view A ──┐
//!           ├──► CachedBlock (Arc) ──► raster-cache-XXXX.raw
//!  view B ──┘        count = 2
//!
//!  A.assign(expr2):
//!
//!  view A ─────► CachedBlock (Arc) ──► raster-cache-YYYY.raw   (new)
//!  view B ─────► CachedBlock (Arc) ──► raster-cache-XXXX.raw   count = 1
//! ```
//!
//! A backing file exists exactly as long as at least one [`CachedBlock`]
//! handle references it. The count is atomic, so views may be cloned and
//! dropped from any thread.

mod block;
mod view;

pub use block::{CachedBlock, CACHE_FILE_PREFIX};
pub use view::DiskCacheImageView;
