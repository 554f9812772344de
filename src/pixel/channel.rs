use std::fmt::Debug;

use super::ChannelType;

/// A scalar channel value with a fixed runtime [`ChannelType`].
///
/// Values are exchanged with byte buffers in native endianness, which is the
/// layout every [`RasterSource`](crate::raster::RasterSource) produces.
pub trait Channel: Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static {
    /// Runtime tag for this channel type.
    const TYPE: ChannelType;

    /// Size in bytes.
    const SIZE: usize;

    /// Decode a value from the first `SIZE` bytes of `bytes`.
    fn read_ne(bytes: &[u8]) -> Self;

    /// Encode the value into the first `SIZE` bytes of `out`.
    fn write_ne(self, out: &mut [u8]);

    /// Addition that clamps at the type's range instead of wrapping.
    fn saturating_add(self, other: Self) -> Self;
}

macro_rules! impl_int_channel {
    ($ty:ty, $tag:expr) => {
        impl Channel for $ty {
            const TYPE: ChannelType = $tag;
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn read_ne(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::SIZE]);
                <$ty>::from_ne_bytes(raw)
            }

            #[inline]
            fn write_ne(self, out: &mut [u8]) {
                out[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
            }

            #[inline]
            fn saturating_add(self, other: Self) -> Self {
                <$ty>::saturating_add(self, other)
            }
        }
    };
}

impl_int_channel!(u8, ChannelType::Uint8);
impl_int_channel!(i16, ChannelType::Int16);
impl_int_channel!(u16, ChannelType::Uint16);

impl Channel for f32 {
    const TYPE: ChannelType = ChannelType::Float32;
    const SIZE: usize = 4;

    #[inline]
    fn read_ne(bytes: &[u8]) -> Self {
        f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline]
    fn write_ne(self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_ne_bytes());
    }

    #[inline]
    fn saturating_add(self, other: Self) -> Self {
        self + other
    }
}
