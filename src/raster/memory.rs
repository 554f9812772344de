use bytes::Bytes;

use super::{check_region, copy_region, region_len, RasterSource, DEFAULT_BLOCK_SIZE};
use crate::error::{IoError, RasterError};
use crate::image::{BoundingBox, ImageBuffer};
use crate::pixel::{bytes_per_pixel, ChannelType, Pixel, PixelFormat};

/// Raster held entirely in memory as native-endian bytes.
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    identifier: String,
    cols: u32,
    rows: u32,
    planes: u32,
    pixel_format: PixelFormat,
    channel_type: ChannelType,
    block_size: (u32, u32),
    data: Bytes,
}

impl MemoryRaster {
    /// Wrap raw pixel bytes.
    ///
    /// `data` must be plane-major, row-major with interleaved channels and
    /// exactly `cols * rows * planes * bytes_per_pixel` long.
    pub fn new(
        cols: u32,
        rows: u32,
        planes: u32,
        pixel_format: PixelFormat,
        channel_type: ChannelType,
        data: impl Into<Bytes>,
    ) -> Result<Self, IoError> {
        let data = data.into();
        let expected = cols as usize
            * rows as usize
            * planes as usize
            * bytes_per_pixel(pixel_format, channel_type);
        if data.len() != expected {
            return Err(IoError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            identifier: "memory".to_string(),
            cols,
            rows,
            planes,
            pixel_format,
            channel_type,
            block_size: (DEFAULT_BLOCK_SIZE, DEFAULT_BLOCK_SIZE),
            data,
        })
    }

    /// Build a raster from a typed image.
    pub fn from_image<P: Pixel>(image: &ImageBuffer<P>) -> Self {
        Self {
            identifier: "memory".to_string(),
            cols: image.cols(),
            rows: image.rows(),
            planes: image.planes(),
            pixel_format: P::FORMAT,
            channel_type: P::CHANNEL_TYPE,
            block_size: (DEFAULT_BLOCK_SIZE, DEFAULT_BLOCK_SIZE),
            data: Bytes::from(image.to_ne_bytes()),
        }
    }

    /// Override the preferred block size.
    pub fn with_block_size(mut self, width: u32, height: u32) -> Self {
        self.block_size = (width, height);
        self
    }

    /// Override the identifier used in log messages.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// The raw pixel bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl RasterSource for MemoryRaster {
    fn cols(&self) -> u32 {
        self.cols
    }

    fn rows(&self) -> u32 {
        self.rows
    }

    fn planes(&self) -> u32 {
        self.planes
    }

    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    fn block_read_size(&self) -> (u32, u32) {
        self.block_size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn read(&self, buffer: &mut [u8], bbox: BoundingBox) -> Result<(), RasterError> {
        let bpp = self.bytes_per_pixel();
        check_region(
            &bbox,
            self.cols,
            self.rows,
            region_len(&bbox, self.planes, bpp),
            buffer.len(),
        )?;
        copy_region(
            &self.data, self.cols, self.rows, self.planes, bpp, &bbox, buffer,
        );
        Ok(())
    }
}
