//! Image header structure.

use zerocopy::byteorder::little_endian::{I32, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{Error, Result};

/// Encoding of the pixel data, from the header's type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Uncompressed, optionally palettized, bottom-up rows.
    Bitmap,
    /// Block compressed, DXT1 to DXT5.
    Dxt(u8),
}

impl ImageKind {
    /// `"DXT0"` read as a little-endian u32 minus the digit.
    const DXT_BASE: u32 = 0x44585430;

    const BITMAP: u32 = 0x0000000A;

    pub fn from_raw(raw: u32) -> Result<Self> {
        match raw.wrapping_sub(Self::DXT_BASE) {
            n @ 1..=5 => Ok(Self::Dxt(n as u8)),
            _ if raw == Self::BITMAP => Ok(Self::Bitmap),
            _ => Err(Error::UnknownImageType(raw)),
        }
    }
}

/// Bitmap-style header stored at [`ImageHeader::OFFSET`].
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct ImageHeader {
    pub struct_len: U32,
    pub width: I32,
    pub height: I32,
    pub planes: U16,
    pub bit_count: U16,
    pub compression: U32,
    pub image_size: U32,
    pub horizontal_resolution: U32,
    pub vertical_resolution: U32,
    pub used_colors: U32,
    pub important_colors: U32,
    /// Encoding tag, see [`ImageKind`].
    pub image_type: U32,
}

impl ImageHeader {
    /// Header size in bytes.
    pub const SIZE: usize = 44;

    /// Offset of the header within an image file.
    pub const OFFSET: usize = 0x41;

    /// Offset of the format flag byte.
    pub const FLAG_OFFSET: usize = 0x30;

    /// Bytes between the header and the pixel data.
    pub const PADDING: usize = 8;

    /// Offset of the pixel data.
    pub const DATA_OFFSET: usize = Self::OFFSET + Self::SIZE + Self::PADDING;

    pub fn kind(&self) -> Result<ImageKind> {
        ImageKind::from_raw(self.image_type.get())
    }

    /// Width and height, rejecting empty or negative dimensions.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let (width, height) = (self.width.get(), self.height.get());
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
            _ => Err(Error::InvalidHeader(format!("bad dimensions {width}x{height}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(std::mem::size_of::<ImageHeader>(), ImageHeader::SIZE);
        assert_eq!(ImageHeader::DATA_OFFSET, 0x79);
    }

    #[test]
    fn test_image_kind() {
        assert_eq!(ImageKind::from_raw(u32::from_le_bytes(*b"1TXD")).unwrap(), ImageKind::Dxt(1));
        assert_eq!(ImageKind::from_raw(0x44585435).unwrap(), ImageKind::Dxt(5));
        assert_eq!(ImageKind::from_raw(0x0A).unwrap(), ImageKind::Bitmap);
        assert!(matches!(ImageKind::from_raw(0x44585436), Err(Error::UnknownImageType(0x44585436))));
        assert!(matches!(ImageKind::from_raw(0x44585430), Err(Error::UnknownImageType(_))));
    }
}
