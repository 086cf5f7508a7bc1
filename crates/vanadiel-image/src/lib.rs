//! Image decoding for Vanadiel.
//!
//! Game images carry a bitmap-style [`ImageHeader`] at a fixed offset,
//! followed by either uncompressed pixel rows or DXT compressed blocks.
//! Both decode to top-down RGBA8.
//!
//! # Example
//!
//! ```no_run
//! use vanadiel_image::parse_image;
//!
//! let data = std::fs::read("ROM/17/21.DAT")?;
//! let image = parse_image(&data, true)?;
//! println!("{}x{}", image.width, image.height);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod header;

pub mod bitmap;
pub mod dxt;

pub use error::{Error, Result};
pub use header::{ImageHeader, ImageKind};

use vanadiel_common::BinaryReader;

/// A decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// RGBA8, top-down, `width * 4` bytes per row.
    pub pixels: Vec<u8>,
}

/// Allocate an RGBA8 buffer for `width` x `height` pixels whose encoded form
/// takes `needed` bytes, after checking `available` holds them.
///
/// `needed` is `None` when computing it overflowed.
pub(crate) fn pixel_buffer(width: usize, height: usize, needed: Option<usize>, available: usize) -> Result<Vec<u8>> {
    let len = width.checked_mul(height).and_then(|n| n.checked_mul(4));
    match (len, needed) {
        (Some(len), Some(needed)) if needed <= available => Ok(vec![0u8; len]),
        (_, needed) => Err(Error::InvalidHeader(format!(
            "{width}x{height} image needs {} bytes of pixel data, {available} available",
            needed.map_or_else(|| "too many".to_string(), |n| n.to_string())
        ))),
    }
}

/// Decode an image file.
///
/// With `ignore_alpha` every pixel is made fully opaque.
pub fn parse_image(data: &[u8], ignore_alpha: bool) -> Result<Image> {
    let reader = BinaryReader::new(data);
    let flag = reader.bytes_at(ImageHeader::FLAG_OFFSET, 1)?[0];
    let header: ImageHeader = BinaryReader::new_at(data, ImageHeader::OFFSET).read_struct()?;

    let kind = header.kind()?;
    let (width, height) = header.dimensions()?;
    let payload = reader.bytes_at(
        ImageHeader::DATA_OFFSET,
        data.len().saturating_sub(ImageHeader::DATA_OFFSET),
    )?;

    tracing::trace!(flag, ?kind, width, height, "decoding image");

    let mut pixels = match kind {
        ImageKind::Bitmap => bitmap::decode(width, height, header.bit_count.get(), payload)?,
        ImageKind::Dxt(variant) => dxt::decode(variant, width, height, payload)?,
    };

    if ignore_alpha {
        for pixel in pixels.chunks_exact_mut(4) {
            pixel[3] = 0xFF;
        }
    }

    Ok(Image {
        width,
        height,
        pixels,
    })
}
