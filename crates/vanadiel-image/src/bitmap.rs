//! Uncompressed bitmap decoding.

use vanadiel_common::BinaryReader;

use crate::{Error, Result};

const PALETTE_SIZE: usize = 256;

/// Expand an RGB565 value to 8 bits per channel.
pub fn rgb565(value: u16) -> [u8; 3] {
    let expand = |v: u16, max: u16| ((u32::from(v) * 255) / u32::from(max)) as u8;
    [
        expand((value >> 11) & 0x1F, 0x1F),
        expand((value >> 5) & 0x3F, 0x3F),
        expand(value & 0x1F, 0x1F),
    ]
}

/// Alpha of a 32-bit pixel: the stored value covers half the range.
pub fn semi_alpha(value: u8) -> u8 {
    if value < 0x80 {
        value * 2
    } else {
        0xFF
    }
}

fn read_color(reader: &mut BinaryReader<'_>, bit_count: u16) -> Result<[u8; 4]> {
    match bit_count {
        16 => {
            let [r, g, b] = rgb565(reader.read_u16()?);
            Ok([r, g, b, 0xFF])
        }
        24 | 32 => {
            let b = reader.read_u8()?;
            let g = reader.read_u8()?;
            let r = reader.read_u8()?;
            let a = if bit_count == 32 {
                semi_alpha(reader.read_u8()?)
            } else {
                0xFF
            };
            Ok([r, g, b, a])
        }
        other => Err(Error::UnsupportedBitCount(other)),
    }
}

/// Decode bottom-up bitmap rows into top-down RGBA8.
pub fn decode(width: u32, height: u32, bit_count: u16, data: &[u8]) -> Result<Vec<u8>> {
    let (width, height) = (width as usize, height as usize);
    let pixel_count = width.checked_mul(height);
    let needed = match bit_count {
        8 => pixel_count.and_then(|n| n.checked_add(PALETTE_SIZE * 4)),
        16 | 24 | 32 => pixel_count.and_then(|n| n.checked_mul(usize::from(bit_count / 8))),
        other => return Err(Error::UnsupportedBitCount(other)),
    };
    let mut pixels = crate::pixel_buffer(width, height, needed, data.len())?;
    let pixel_count = width * height;
    let mut reader = BinaryReader::new(data);

    let mut put = |i: usize, color: [u8; 4]| {
        let x = i % width;
        let y = height - 1 - i / width;
        let offset = (y * width + x) * 4;
        pixels[offset..offset + 4].copy_from_slice(&color);
    };

    if bit_count == 8 {
        let mut palette = [[0u8; 4]; PALETTE_SIZE];
        for color in &mut palette {
            *color = read_color(&mut reader, 32)?;
        }
        let indices = reader.read_bytes(pixel_count)?;
        for (i, &index) in indices.iter().enumerate() {
            put(i, palette[usize::from(index)]);
        }
    } else {
        for i in 0..pixel_count {
            put(i, read_color(&mut reader, bit_count)?);
        }
    }

    Ok(pixels)
}
