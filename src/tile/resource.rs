use bytes::Bytes;

use crate::error::TileError;
use crate::image::ImageBuffer;
use crate::pixel::{bytes_per_pixel, ChannelType, Pixel, PixelFormat, PixelGray};

/// Type-erased tile produced by the tile generator.
///
/// Holds native-endian pixel bytes (plane-major, row-major, interleaved
/// channels) together with the metadata needed to reinterpret them safely.
#[derive(Debug, Clone, PartialEq)]
pub struct TileResource {
    cols: u32,
    rows: u32,
    planes: u32,
    pixel_format: PixelFormat,
    channel_type: ChannelType,
    data: Bytes,
}

impl TileResource {
    /// Erase the pixel type of an image.
    pub fn from_image<P: Pixel>(image: &ImageBuffer<P>) -> Self {
        Self {
            cols: image.cols(),
            rows: image.rows(),
            planes: image.planes(),
            pixel_format: P::FORMAT,
            channel_type: P::CHANNEL_TYPE,
            data: Bytes::from(image.to_ne_bytes()),
        }
    }

    /// All-zero single-channel 8-bit gray tile.
    pub fn blank(cols: u32, rows: u32) -> Self {
        Self::from_image(&ImageBuffer::<PixelGray<u8>>::new(cols, rows))
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn planes(&self) -> u32 {
        self.planes
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    pub fn bytes_per_pixel(&self) -> usize {
        bytes_per_pixel(self.pixel_format, self.channel_type)
    }

    /// Raw pixel bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Size of the pixel data in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// True if the tile holds pixels of type `P`.
    pub fn is<P: Pixel>(&self) -> bool {
        self.pixel_format == P::FORMAT && self.channel_type == P::CHANNEL_TYPE
    }

    /// Reinterpret the tile as a typed image.
    ///
    /// # Errors
    ///
    /// [`TileError::TypeMismatch`] if the tile does not hold `P` pixels.
    pub fn to_image<P: Pixel>(&self) -> Result<ImageBuffer<P>, TileError> {
        if !self.is::<P>() {
            return Err(TileError::TypeMismatch {
                expected: P::type_name(),
                actual: format!("{}/{}", self.pixel_format, self.channel_type),
            });
        }
        let image = ImageBuffer::from_ne_bytes(self.cols, self.rows, self.planes, &self.data)?;
        Ok(image)
    }
}
