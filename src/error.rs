use thiserror::Error;

use crate::image::BoundingBox;
use crate::pixel::{ChannelType, PixelFormat};

/// I/O errors raised while opening or reading raster data
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// The raster file does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// The file exists but could not be decoded as a raster
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    /// Error reported by the operating system
    #[error("I/O error: {0}")]
    Io(String),

    /// Caller-supplied buffer does not match the requested region
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Io(err.to_string())
    }
}

/// Errors raised by a [`RasterSource`](crate::raster::RasterSource) read
#[derive(Debug, Clone, Error)]
pub enum RasterError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Requested region is not contained in the raster
    #[error("Region {bbox} is outside raster bounds {cols}x{rows}")]
    RegionOutOfBounds {
        bbox: BoundingBox,
        cols: u32,
        rows: u32,
    },
}

/// Errors raised by the disk-backed image cache
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// Temporary storage could not be created or written
    #[error("Failed to allocate cache storage: {message}")]
    Allocate { message: String },

    /// Reading back the materialized data failed
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Pixel access outside the cached image
    #[error(
        "Pixel ({x}, {y}, plane {plane}) is outside cached image {cols}x{rows}x{planes}"
    )]
    PixelOutOfBounds {
        x: u32,
        y: u32,
        plane: u32,
        cols: u32,
        rows: u32,
        planes: u32,
    },

    /// Region read outside the cached image
    #[error("Region {bbox} is outside cached image {cols}x{rows}")]
    RegionOutOfBounds {
        bbox: BoundingBox,
        cols: u32,
        rows: u32,
    },
}

impl From<CacheError> for RasterError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Io(io) => RasterError::Io(io),
            CacheError::RegionOutOfBounds { bbox, cols, rows } => {
                RasterError::RegionOutOfBounds { bbox, cols, rows }
            }
            other => RasterError::Io(IoError::Io(other.to_string())),
        }
    }
}

/// Errors that can occur while generating or handling a tile
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// The raster's pixel layout has no tile builder
    #[error("Unsupported pixel format {pixel_format} with channel type {channel_type}")]
    UnsupportedFormat {
        pixel_format: PixelFormat,
        channel_type: ChannelType,
    },

    /// Reading from the raster source failed
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),

    /// Declared operation without an implementation
    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },

    /// Tile data reinterpreted as the wrong pixel type
    #[error("Tile type mismatch: expected {expected}, tile holds {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The tile could not be encoded
    #[error("Failed to encode tile: {message}")]
    Encode { message: String },

    /// A blocking tile worker failed to complete
    #[error("Tile task failed: {message}")]
    Task { message: String },
}

impl From<IoError> for TileError {
    fn from(err: IoError) -> Self {
        TileError::Raster(RasterError::Io(err))
    }
}
