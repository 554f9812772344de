use std::fmt::Debug;

use super::{Channel, ChannelType, PixelFormat};

/// A statically typed pixel.
///
/// The associated constants tie the Rust type to the runtime
/// ([`PixelFormat`], [`ChannelType`]) pair used by raster sources and tiles.
pub trait Pixel: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Channel storage type.
    type Channel: Channel;

    /// Runtime pixel format.
    const FORMAT: PixelFormat;

    /// Number of channels per pixel.
    const CHANNELS: usize;

    /// Size of one pixel in bytes.
    const SIZE: usize = Self::CHANNELS * <Self::Channel as Channel>::SIZE;

    /// Runtime channel type.
    const CHANNEL_TYPE: ChannelType = <Self::Channel as Channel>::TYPE;

    /// Channel value at index `i` (`i < CHANNELS`).
    fn channel(&self, i: usize) -> Self::Channel;

    /// Build a pixel from per-channel values.
    fn from_fn(f: impl FnMut(usize) -> Self::Channel) -> Self;

    /// Decode a pixel from native-endian bytes.
    fn read_ne(bytes: &[u8]) -> Self {
        let size = <Self::Channel as Channel>::SIZE;
        Self::from_fn(|i| Self::Channel::read_ne(&bytes[i * size..]))
    }

    /// Encode a pixel as native-endian bytes.
    fn write_ne(&self, out: &mut [u8]) {
        let size = <Self::Channel as Channel>::SIZE;
        for i in 0..Self::CHANNELS {
            self.channel(i).write_ne(&mut out[i * size..]);
        }
    }

    /// Channel-wise saturating sum.
    fn saturating_add(&self, other: Self) -> Self {
        Self::from_fn(|i| self.channel(i).saturating_add(other.channel(i)))
    }

    /// Human-readable `format/channel` name, e.g. `rgb/uint8`.
    fn type_name() -> String {
        format!("{}/{}", Self::FORMAT, Self::CHANNEL_TYPE)
    }
}

macro_rules! define_pixel {
    ($(#[$meta:meta])* $name:ident, $format:expr, $n:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        pub struct $name<T>(pub [T; $n]);

        impl<T: Channel> Pixel for $name<T> {
            type Channel = T;
            const FORMAT: PixelFormat = $format;
            const CHANNELS: usize = $n;

            #[inline]
            fn channel(&self, i: usize) -> T {
                self.0[i]
            }

            #[inline]
            fn from_fn(mut f: impl FnMut(usize) -> T) -> Self {
                $name(std::array::from_fn(|i| f(i)))
            }
        }
    };
}

define_pixel!(
    /// Single-channel luminance pixel.
    PixelGray,
    PixelFormat::Gray,
    1
);
define_pixel!(
    /// Luminance pixel with alpha.
    PixelGrayA,
    PixelFormat::GrayAlpha,
    2
);
define_pixel!(
    /// Red/green/blue pixel.
    PixelRgb,
    PixelFormat::Rgb,
    3
);
define_pixel!(
    /// Red/green/blue pixel with alpha.
    PixelRgba,
    PixelFormat::RgbAlpha,
    4
);

impl<T: Channel> PixelGray<T> {
    pub fn new(v: T) -> Self {
        PixelGray([v])
    }

    pub fn v(&self) -> T {
        self.0[0]
    }
}

impl<T: Channel> PixelGrayA<T> {
    pub fn new(v: T, a: T) -> Self {
        PixelGrayA([v, a])
    }

    pub fn v(&self) -> T {
        self.0[0]
    }

    pub fn a(&self) -> T {
        self.0[1]
    }
}

impl<T: Channel> PixelRgb<T> {
    pub fn new(r: T, g: T, b: T) -> Self {
        PixelRgb([r, g, b])
    }

    pub fn r(&self) -> T {
        self.0[0]
    }

    pub fn g(&self) -> T {
        self.0[1]
    }

    pub fn b(&self) -> T {
        self.0[2]
    }
}

impl<T: Channel> PixelRgba<T> {
    pub fn new(r: T, g: T, b: T, a: T) -> Self {
        PixelRgba([r, g, b, a])
    }

    pub fn r(&self) -> T {
        self.0[0]
    }

    pub fn g(&self) -> T {
        self.0[1]
    }

    pub fn b(&self) -> T {
        self.0[2]
    }

    pub fn a(&self) -> T {
        self.0[3]
    }
}
