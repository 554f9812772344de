//! Pixel representation.
//!
//! Rasters are described at runtime by a ([`PixelFormat`], [`ChannelType`])
//! pair. Inside the crate, pixels are statically typed: every concrete pixel
//! type implements [`Pixel`], which carries its runtime tag as associated
//! constants so typed and type-erased data can be converted safely.
//!
//! # Pixel types
//!
//! | Type              | Format      | Channels |
//! |-------------------|-------------|----------|
//! | [`PixelGray<T>`]  | `Gray`      | 1        |
//! | [`PixelGrayA<T>`] | `GrayAlpha` | 2        |
//! | [`PixelRgb<T>`]   | `Rgb`       | 3        |
//! | [`PixelRgba<T>`]  | `RgbAlpha`  | 4        |
//!
//! `T` is any [`Channel`]: `u8`, `i16`, `u16` or `f32`.

mod channel;
mod types;

use std::fmt;

use serde::Serialize;

pub use channel::Channel;
pub use types::{Pixel, PixelGray, PixelGrayA, PixelRgb, PixelRgba};

// =============================================================================
// Pixel Format
// =============================================================================

/// Channel layout of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Single unnamed channel
    Scalar,
    /// Luminance
    Gray,
    /// Luminance with alpha
    #[serde(rename = "graya")]
    GrayAlpha,
    /// Red, green, blue
    Rgb,
    /// Red, green, blue with alpha
    #[serde(rename = "rgba")]
    RgbAlpha,
    /// Hue, saturation, value
    Hsv,
    /// CIE XYZ
    Xyz,
}

impl PixelFormat {
    /// Number of channels in one pixel of this format.
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Scalar | PixelFormat::Gray => 1,
            PixelFormat::GrayAlpha => 2,
            PixelFormat::Rgb | PixelFormat::Hsv | PixelFormat::Xyz => 3,
            PixelFormat::RgbAlpha => 4,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Scalar => "scalar",
            PixelFormat::Gray => "gray",
            PixelFormat::GrayAlpha => "graya",
            PixelFormat::Rgb => "rgb",
            PixelFormat::RgbAlpha => "rgba",
            PixelFormat::Hsv => "hsv",
            PixelFormat::Xyz => "xyz",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Channel Type
// =============================================================================

/// Storage type of a single channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl ChannelType {
    /// Size of one channel value in bytes.
    pub fn size(self) -> usize {
        match self {
            ChannelType::Int8 | ChannelType::Uint8 => 1,
            ChannelType::Int16 | ChannelType::Uint16 => 2,
            ChannelType::Int32 | ChannelType::Uint32 | ChannelType::Float32 => 4,
            ChannelType::Float64 => 8,
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelType::Int8 => "int8",
            ChannelType::Uint8 => "uint8",
            ChannelType::Int16 => "int16",
            ChannelType::Uint16 => "uint16",
            ChannelType::Int32 => "int32",
            ChannelType::Uint32 => "uint32",
            ChannelType::Float32 => "float32",
            ChannelType::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// Bytes occupied by one pixel with the given layout.
#[inline]
pub fn bytes_per_pixel(format: PixelFormat, channel: ChannelType) -> usize {
    format.channels() * channel.size()
}
