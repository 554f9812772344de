//! PNG tile encoder.
//!
//! Tiles carry raw pixels of the source's layout. For writing them to disk or
//! handing them to a viewer they are encoded as PNG, which preserves 8- and
//! 16-bit unsigned data losslessly.
//!
//! # Supported layouts
//!
//! `{Gray, GrayAlpha, Rgb, RgbAlpha} × {uint8, uint16}`, single plane.
//! Signed and floating-point tiles have no PNG representation and are
//! rejected with [`TileError::Encode`].

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader};

use super::TileResource;
use crate::error::TileError;
use crate::pixel::{ChannelType, PixelFormat};

// =============================================================================
// PNG Encoder
// =============================================================================

/// Encodes tiles as PNG.
#[derive(Debug, Clone, Copy)]
pub struct PngTileEncoder {
    compression: CompressionType,
}

impl Default for PngTileEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PngTileEncoder {
    /// Encoder with the default compression level.
    pub fn new() -> Self {
        Self {
            compression: CompressionType::Default,
        }
    }

    /// Encoder that favors speed over size.
    pub fn fast() -> Self {
        Self {
            compression: CompressionType::Fast,
        }
    }

    /// Encode a tile as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::Encode`] if:
    /// - The tile's layout has no PNG color type
    /// - The tile has more than one plane
    /// - Encoding fails
    pub fn encode(&self, tile: &TileResource) -> Result<Bytes, TileError> {
        let color = color_type(tile.pixel_format(), tile.channel_type()).ok_or_else(|| {
            TileError::Encode {
                message: format!(
                    "no PNG color type for {}/{}",
                    tile.pixel_format(),
                    tile.channel_type()
                ),
            }
        })?;
        if tile.planes() != 1 {
            return Err(TileError::Encode {
                message: format!("cannot encode {} planes as PNG", tile.planes()),
            });
        }

        let mut output = Vec::new();
        let encoder = PngEncoder::new_with_quality(&mut output, self.compression, FilterType::Adaptive);
        encoder
            .write_image(tile.data(), tile.cols(), tile.rows(), color)
            .map_err(|e| TileError::Encode {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }

    /// Read the dimensions of an encoded PNG without decoding pixels.
    ///
    /// Returns `(width, height)` in pixels.
    pub fn dimensions(&self, encoded: &[u8]) -> Result<(u32, u32), TileError> {
        let reader = ImageReader::with_format(Cursor::new(encoded), ImageFormat::Png);
        reader.into_dimensions().map_err(|e| TileError::Encode {
            message: e.to_string(),
        })
    }
}

/// PNG color type for a pixel layout.
fn color_type(format: PixelFormat, channel: ChannelType) -> Option<ExtendedColorType> {
    let color = match (format, channel) {
        (PixelFormat::Gray, ChannelType::Uint8) => ExtendedColorType::L8,
        (PixelFormat::GrayAlpha, ChannelType::Uint8) => ExtendedColorType::La8,
        (PixelFormat::Rgb, ChannelType::Uint8) => ExtendedColorType::Rgb8,
        (PixelFormat::RgbAlpha, ChannelType::Uint8) => ExtendedColorType::Rgba8,
        (PixelFormat::Gray, ChannelType::Uint16) => ExtendedColorType::L16,
        (PixelFormat::GrayAlpha, ChannelType::Uint16) => ExtendedColorType::La16,
        (PixelFormat::Rgb, ChannelType::Uint16) => ExtendedColorType::Rgb16,
        (PixelFormat::RgbAlpha, ChannelType::Uint16) => ExtendedColorType::Rgba16,
        _ => return None,
    };
    Some(color)
}

// =============================================================================
// Tests
// =============================================================================
