//! Raster files decoded through the `image` crate.
//!
//! PNG and TIFF files are decoded fully on open. Decoded color types map onto
//! ([`PixelFormat`], [`ChannelType`]) as follows:
//!
//! | Color type | Format      | Channel   |
//! |------------|-------------|-----------|
//! | `L8`       | `Gray`      | `uint8`   |
//! | `La8`      | `GrayAlpha` | `uint8`   |
//! | `Rgb8`     | `Rgb`       | `uint8`   |
//! | `Rgba8`    | `RgbAlpha`  | `uint8`   |
//! | `L16`      | `Gray`      | `uint16`  |
//! | `La16`     | `GrayAlpha` | `uint16`  |
//! | `Rgb16`    | `Rgb`       | `uint16`  |
//! | `Rgba16`   | `RgbAlpha`  | `uint16`  |
//! | `Rgb32F`   | `Rgb`       | `float32` |
//! | `Rgba32F`  | `RgbAlpha`  | `float32` |

use std::path::{Path, PathBuf};

use image::{ColorType, ImageReader};
use tracing::debug;

use super::{MemoryRaster, RasterSource, DEFAULT_BLOCK_SIZE};
use crate::error::{IoError, RasterError};
use crate::image::BoundingBox;
use crate::pixel::{ChannelType, PixelFormat};

/// Raster image loaded from a file on disk.
#[derive(Debug, Clone)]
pub struct FileRaster {
    path: PathBuf,
    inner: MemoryRaster,
}

impl FileRaster {
    /// Open and decode a raster file with the default 256×256 block size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IoError> {
        Self::open_with_block_size(path, DEFAULT_BLOCK_SIZE)
    }

    /// Open and decode a raster file, reporting `block_size × block_size` as
    /// the preferred read granularity.
    ///
    /// # Errors
    ///
    /// - [`IoError::NotFound`] if the file does not exist
    /// - [`IoError::Decode`] if the file is corrupt, in an unknown format, or
    ///   uses a color type with no pixel mapping
    pub fn open_with_block_size(path: impl AsRef<Path>, block_size: u32) -> Result<Self, IoError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let reader = ImageReader::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IoError::NotFound(path_str.clone()),
            _ => IoError::from(e),
        })?;
        let reader = reader.with_guessed_format()?;
        let img = reader.decode().map_err(|e| IoError::Decode {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

        let (pixel_format, channel_type) =
            map_color_type(img.color()).ok_or_else(|| IoError::Decode {
                path: path_str.clone(),
                message: format!("unsupported color type {:?}", img.color()),
            })?;

        debug!(
            path = %path_str,
            cols = img.width(),
            rows = img.height(),
            %pixel_format,
            %channel_type,
            "Opened raster file"
        );

        let inner = MemoryRaster::new(
            img.width(),
            img.height(),
            1,
            pixel_format,
            channel_type,
            img.as_bytes().to_vec(),
        )?
        .with_block_size(block_size, block_size)
        .with_identifier(path_str);

        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn map_color_type(color: ColorType) -> Option<(PixelFormat, ChannelType)> {
    let mapped = match color {
        ColorType::L8 => (PixelFormat::Gray, ChannelType::Uint8),
        ColorType::La8 => (PixelFormat::GrayAlpha, ChannelType::Uint8),
        ColorType::Rgb8 => (PixelFormat::Rgb, ChannelType::Uint8),
        ColorType::Rgba8 => (PixelFormat::RgbAlpha, ChannelType::Uint8),
        ColorType::L16 => (PixelFormat::Gray, ChannelType::Uint16),
        ColorType::La16 => (PixelFormat::GrayAlpha, ChannelType::Uint16),
        ColorType::Rgb16 => (PixelFormat::Rgb, ChannelType::Uint16),
        ColorType::Rgba16 => (PixelFormat::RgbAlpha, ChannelType::Uint16),
        ColorType::Rgb32F => (PixelFormat::Rgb, ChannelType::Float32),
        ColorType::Rgba32F => (PixelFormat::RgbAlpha, ChannelType::Float32),
        _ => return None,
    };
    Some(mapped)
}

impl RasterSource for FileRaster {
    fn cols(&self) -> u32 {
        self.inner.cols()
    }

    fn rows(&self) -> u32 {
        self.inner.rows()
    }

    fn planes(&self) -> u32 {
        self.inner.planes()
    }

    fn pixel_format(&self) -> PixelFormat {
        self.inner.pixel_format()
    }

    fn channel_type(&self) -> ChannelType {
        self.inner.channel_type()
    }

    fn block_read_size(&self) -> (u32, u32) {
        self.inner.block_read_size()
    }

    fn identifier(&self) -> &str {
        self.inner.identifier()
    }

    fn read(&self, buffer: &mut [u8], bbox: BoundingBox) -> Result<(), RasterError> {
        self.inner.read(buffer, bbox)
    }
}
