//! Block-compressed (DXT1 to DXT5) decoding.
//!
//! Pixels are stored as 4x4 texel blocks. Each block holds two RGB565
//! endpoints and 2-bit indices into a four-entry palette; DXT2 to DXT5 add
//! an 8-byte alpha block in front.

use byteorder::{ByteOrder, LittleEndian};
use vanadiel_common::BinaryReader;

use crate::Result;

/// Decoded RGBA8 texels of one block, row-major.
pub type Texels = [[u8; 4]; 16];

/// Bytes per block for a DXT variant.
pub fn block_size(variant: u8) -> usize {
    if variant == 1 {
        8
    } else {
        16
    }
}

/// Endpoint color: the 5/6-bit channels shifted into the high bits.
fn endpoint(c: u16) -> [u16; 3] {
    [(c & 0xF800) >> 8, (c & 0x07E0) >> 3, (c & 0x001F) << 3]
}

fn color_palette(c0: u16, c1: u16, four_color: bool) -> [[u8; 4]; 4] {
    let [r0, g0, b0] = endpoint(c0);
    let [r1, g1, b1] = endpoint(c1);
    let third = |a: u16, b: u16| ((2 * a + b + 1) / 3) as u8;
    let half = |a: u16, b: u16| ((a + b) / 2) as u8;

    let first = [r0 as u8, g0 as u8, b0 as u8, 0xFF];
    let second = [r1 as u8, g1 as u8, b1 as u8, 0xFF];

    if four_color {
        [
            first,
            second,
            [third(r0, r1), third(g0, g1), third(b0, b1), 0xFF],
            [third(r1, r0), third(g1, g0), third(b1, b0), 0xFF],
        ]
    } else {
        [
            first,
            second,
            [half(r0, r1), half(g0, g1), half(b0, b1), 0xFF],
            [0xFF, 0xFF, 0xFF, 0],
        ]
    }
}

/// Interpolated alpha ramp used by DXT4 and DXT5.
fn alpha_ramp(a0: u8, a1: u8) -> [u8; 8] {
    let (a0, a1) = (u32::from(a0), u32::from(a1));
    let mut ramp = [0u8; 8];
    ramp[0] = a0 as u8;
    ramp[1] = a1 as u8;

    if a0 > a1 {
        for i in 1..7 {
            ramp[i + 1] = ((a0 * (7 - i as u32) + a1 * i as u32 + 3) / 7) as u8;
        }
    } else {
        for i in 1..5 {
            ramp[i + 1] = ((a0 * (5 - i as u32) + a1 * i as u32 + 2) / 5) as u8;
        }
        ramp[6] = 0;
        ramp[7] = 0xFF;
    }
    ramp
}

/// Decode one block. `block` holds [`block_size`] bytes.
pub fn decode_block(variant: u8, block: &[u8]) -> Texels {
    let (alpha, color) = if variant == 1 {
        (0u64, block)
    } else {
        (LittleEndian::read_u64(block), &block[8..])
    };

    let c0 = LittleEndian::read_u16(color);
    let c1 = LittleEndian::read_u16(&color[2..]);
    let palette = color_palette(c0, c1, c0 > c1 || variant != 1);
    let indices = LittleEndian::read_u32(&color[4..]);

    let ramp = alpha_ramp(alpha as u8, (alpha >> 8) as u8);
    let alpha_indices = alpha >> 16;

    let mut texels = [[0u8; 4]; 16];
    for (i, texel) in texels.iter_mut().enumerate() {
        let mut rgba = palette[((indices >> (2 * i)) & 0x3) as usize];
        rgba[3] = match variant {
            2 | 3 => match ((alpha >> (4 * i)) & 0xF) as u8 {
                a if a >= 8 => 0xFF,
                a => a << 5,
            },
            4 | 5 => ramp[((alpha_indices >> (3 * i)) & 0x7) as usize],
            _ => rgba[3],
        };
        *texel = rgba;
    }
    texels
}

/// Decode a DXT image into RGBA8. Blocks crossing the right or bottom edge are clipped.
pub fn decode(variant: u8, width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let (width, height) = (width as usize, height as usize);
    let blocks_x = width.div_ceil(4);
    let blocks_y = height.div_ceil(4);
    let size = block_size(variant);
    let needed = blocks_x.checked_mul(blocks_y).and_then(|n| n.checked_mul(size));

    let mut reader = BinaryReader::new(data);
    let mut pixels = crate::pixel_buffer(width, height, needed, data.len())?;
    let stride = width * 4;

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let texels = decode_block(variant, reader.read_bytes(size)?);
            for (i, texel) in texels.iter().enumerate() {
                let x = bx * 4 + i % 4;
                let y = by * 4 + i / 4;
                if x < width && y < height {
                    let offset = y * stride + x * 4;
                    pixels[offset..offset + 4].copy_from_slice(texel);
                }
            }
        }
    }

    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dxt1(c0: u16, c1: u16, indices: u32) -> Vec<u8> {
        let mut block = Vec::new();
        block.extend(c0.to_le_bytes());
        block.extend(c1.to_le_bytes());
        block.extend(indices.to_le_bytes());
        block
    }

    #[test]
    fn test_decode_block_pure() {
        let block = dxt1(0xF800, 0x001F, 0x7878_7878);
        assert_eq!(decode_block(1, &block), decode_block(1, &block));

        let texels = decode_block(1, &block);
        assert_eq!(texels[0], [248, 0, 0, 255]);
        assert_eq!(texels[1], [165, 0, 83, 255]);
        assert_eq!(texels[2], [83, 0, 165, 255]);
        assert_eq!(texels[3], [0, 0, 248, 255]);
    }

    #[test]
    fn test_three_color_mode() {
        let texels = decode_block(1, &dxt1(0x001F, 0xF800, 0xFFFF_FFFE));
        assert_eq!(texels[0], [124, 0, 124, 255]);
        assert_eq!(texels[1], [255, 255, 255, 0]);
    }

    #[test]
    fn test_explicit_alpha() {
        let mut block = 0x0000_0000_0000_0F87u64.to_le_bytes().to_vec();
        block.extend(dxt1(0xFFFF, 0x0000, 0));
        let texels = decode_block(3, &block);
        assert_eq!(texels[0][3], 224);
        assert_eq!(texels[1][3], 255);
        assert_eq!(texels[2][3], 255);
        assert_eq!(texels[3][3], 0);
        assert_eq!(texels[0][..3], [248, 252, 248]);
    }

    #[test]
    fn test_interpolated_alpha() {
        assert_eq!(alpha_ramp(255, 0), [255, 0, 219, 182, 146, 109, 73, 36]);
        assert_eq!(alpha_ramp(0, 255), [0, 255, 51, 102, 153, 204, 0, 255]);

        let mut block = vec![255, 0];
        // Texel 0 uses ramp entry 1, texel 1 entry 7.
        let bits: u64 = 1 | (7 << 3);
        block.extend(&bits.to_le_bytes()[..6]);
        block.extend(dxt1(0xFFFF, 0x0000, 0));
        let texels = decode_block(5, &block);
        assert_eq!(texels[0][3], 0);
        assert_eq!(texels[1][3], 36);
        assert_eq!(texels[2][3], 255);
    }

    #[test]
    fn test_clipped_image() {
        let data = dxt1(0xF800, 0xF800, 0);
        let pixels = decode(1, 2, 3, &data).unwrap();
        assert_eq!(pixels.len(), 2 * 3 * 4);
        assert!(pixels.chunks(4).all(|p| p == [248, 0, 0, 255]));

        assert!(decode(1, 8, 4, &data).unwrap_err().is_format());
    }

    #[test]
    fn test_dimensions_exceed_payload() {
        assert!(matches!(
            decode(1, 0x7FFF_FFFF, 0x7FFF_FFFF, &[0; 8]),
            Err(crate::Error::InvalidHeader(_))
        ));
        assert!(matches!(decode(5, 8, 8, &[0; 48]), Err(crate::Error::InvalidHeader(_))));
    }
}
