//! Decoder for the game's text encoding.
//!
//! Game strings are Shift-JIS with a handful of private double-byte codes
//! for element glyphs and the auto-translate brackets. Those are mapped
//! here; everything else goes through [`encoding_rs::SHIFT_JIS`].

use encoding_rs::SHIFT_JIS;

use crate::{Error, Result};

/// Lead byte of the private glyph range.
const GLYPH_LEAD: u8 = 0xEF;

/// Element glyphs for trail bytes `0x1F..=0x26`.
const ELEMENT_GLYPHS: [char; 8] = ['火', '氷', '風', '土', '雷', '水', '光', '闇'];

/// In-text line break.
const LINE_BREAK: u8 = 0x07;

#[inline]
fn is_lead_byte(b: u8) -> bool {
    matches!(b, 0x81..=0x9F | 0xE0..=0xFC)
}

fn private_glyph(trail: u8) -> Option<char> {
    match trail {
        0x1F..=0x26 => Some(ELEMENT_GLYPHS[(trail - 0x1F) as usize]),
        0x27 => Some('{'),
        0x28 => Some('}'),
        _ => None,
    }
}

fn flush(pending: &mut Vec<u8>, out: &mut String) {
    if !pending.is_empty() {
        let (text, _) = SHIFT_JIS.decode_without_bom_handling(pending);
        out.push_str(&text);
        pending.clear();
    }
}

/// Decode a complete byte slice.
///
/// Unmappable sequences become U+FFFD; decoding itself never fails.
pub fn decode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut pending = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];

        if b == GLYPH_LEAD {
            if let Some(glyph) = bytes.get(i + 1).copied().and_then(private_glyph) {
                flush(&mut pending, &mut out);
                out.push(glyph);
                i += 2;
                continue;
            }
        }

        if b == LINE_BREAK {
            flush(&mut pending, &mut out);
            out.push('\n');
            i += 1;
            continue;
        }

        if is_lead_byte(b) && i + 1 < bytes.len() {
            pending.extend_from_slice(&bytes[i..i + 2]);
            i += 2;
        } else {
            pending.push(b);
            i += 1;
        }
    }

    flush(&mut pending, &mut out);
    out
}

/// Decode up to the first null byte.
pub fn decode_cstr(bytes: &[u8]) -> String {
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    decode(&bytes[..end])
}

/// Decode `length` bytes starting at `offset`.
pub fn decode_at(bytes: &[u8], offset: usize, length: usize) -> Result<String> {
    offset
        .checked_add(length)
        .filter(|&end| end <= bytes.len())
        .map(|end| decode(&bytes[offset..end]))
        .ok_or(Error::OutOfBounds {
            offset,
            length,
            size: bytes.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        assert_eq!(decode(b"Cure IV"), "Cure IV");
    }

    #[test]
    fn test_japanese() {
        // "ケアル" in Shift-JIS
        let bytes = [0x83, 0x50, 0x83, 0x41, 0x83, 0x8B];
        assert_eq!(decode(&bytes), "ケアル");
    }

    #[test]
    fn test_element_glyphs() {
        let bytes = [b'A', 0xEF, 0x1F, 0xEF, 0x26, b'B'];
        assert_eq!(decode(&bytes), "A火闇B");
    }

    #[test]
    fn test_auto_translate_brackets() {
        let bytes = [0xEF, 0x27, b'H', b'i', 0xEF, 0x28];
        assert_eq!(decode(&bytes), "{Hi}");
    }

    #[test]
    fn test_line_break() {
        assert_eq!(decode(b"one\x07two"), "one\ntwo");
    }

    #[test]
    fn test_trail_byte_is_not_glyph_lead() {
        // 0x83 0xEF is not a valid pair but 0xEF must not be read as a glyph lead.
        let bytes = [0x83, 0xEF, 0x1F];
        let text = decode(&bytes);
        assert!(!text.contains('火'));
    }

    #[test]
    fn test_decode_cstr() {
        assert_eq!(decode_cstr(b"Fire\0garbage"), "Fire");
        assert_eq!(decode_cstr(b"Fire"), "Fire");
    }

    #[test]
    fn test_decode_at_bounds() {
        assert_eq!(decode_at(b"xxStonexx", 2, 5).unwrap(), "Stone");
        assert!(decode_at(b"short", 3, 5).is_err());
    }
}
