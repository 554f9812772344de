//! Pixel layout dispatch.
//!
//! Maps a runtime ([`PixelFormat`], [`ChannelType`]) pair onto a statically
//! typed tile builder. The table below is the single source of truth for
//! which layouts can be tiled; a layout missing from it is rejected with
//! [`TileError::UnsupportedFormat`].

use crate::error::TileError;
use crate::image::{subsample, BoundingBox, ImageBuffer};
use crate::pixel::{ChannelType, Pixel, PixelFormat, PixelGray, PixelGrayA, PixelRgb, PixelRgba};
use crate::raster::{region_len, RasterSource};

use super::TileResource;

/// Reads a region from a source and downsamples it by an integer factor.
pub type TileBuildFn = fn(&dyn RasterSource, BoundingBox, u64) -> Result<TileResource, TileError>;

struct DispatchEntry {
    pixel_format: PixelFormat,
    channel_type: ChannelType,
    build: TileBuildFn,
}

macro_rules! entry {
    ($format:ident, $channel:ident, $pixel:ty) => {
        DispatchEntry {
            pixel_format: PixelFormat::$format,
            channel_type: ChannelType::$channel,
            build: build_tile::<$pixel>,
        }
    };
}

static DISPATCH_TABLE: &[DispatchEntry] = &[
    entry!(Gray, Uint8, PixelGray<u8>),
    entry!(Gray, Int16, PixelGray<i16>),
    entry!(Gray, Uint16, PixelGray<u16>),
    entry!(Gray, Float32, PixelGray<f32>),
    entry!(GrayAlpha, Uint8, PixelGrayA<u8>),
    entry!(GrayAlpha, Int16, PixelGrayA<i16>),
    entry!(GrayAlpha, Uint16, PixelGrayA<u16>),
    entry!(GrayAlpha, Float32, PixelGrayA<f32>),
    entry!(Rgb, Uint8, PixelRgb<u8>),
    entry!(Rgb, Uint16, PixelRgb<u16>),
    entry!(RgbAlpha, Uint8, PixelRgba<u8>),
    entry!(RgbAlpha, Uint16, PixelRgba<u16>),
];

/// Lookup facade over the dispatch table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelDispatch;

impl PixelDispatch {
    /// Tile builder for a layout, if supported.
    pub fn lookup(pixel_format: PixelFormat, channel_type: ChannelType) -> Option<TileBuildFn> {
        DISPATCH_TABLE
            .iter()
            .find(|e| e.pixel_format == pixel_format && e.channel_type == channel_type)
            .map(|e| e.build)
    }

    pub fn is_supported(pixel_format: PixelFormat, channel_type: ChannelType) -> bool {
        Self::lookup(pixel_format, channel_type).is_some()
    }

    /// Every supported layout, in table order.
    pub fn supported() -> impl Iterator<Item = (PixelFormat, ChannelType)> {
        DISPATCH_TABLE
            .iter()
            .map(|e| (e.pixel_format, e.channel_type))
    }

    /// Build a tile from `bbox` of `source` using the source's own layout.
    ///
    /// # Errors
    ///
    /// - [`TileError::UnsupportedFormat`] if the layout is not in the table
    /// - [`TileError::Raster`] if the read fails
    pub fn build(
        source: &dyn RasterSource,
        bbox: BoundingBox,
        factor: u64,
    ) -> Result<TileResource, TileError> {
        let pixel_format = source.pixel_format();
        let channel_type = source.channel_type();
        let build = Self::lookup(pixel_format, channel_type).ok_or(TileError::UnsupportedFormat {
            pixel_format,
            channel_type,
        })?;
        build(source, bbox, factor)
    }
}

fn build_tile<P: Pixel>(
    source: &dyn RasterSource,
    bbox: BoundingBox,
    factor: u64,
) -> Result<TileResource, TileError> {
    let planes = source.planes();
    let mut raw = vec![0u8; region_len(&bbox, planes, P::SIZE)];
    source.read(&mut raw, bbox)?;

    let tile = ImageBuffer::<P>::from_ne_bytes(bbox.width as u32, bbox.height as u32, planes, &raw)?;
    let reduced = subsample(&tile, factor);
    Ok(TileResource::from_image(&reduced))
}
