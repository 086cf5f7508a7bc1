//! Reversible byte transforms applied to DAT data before parsing.
//!
//! None of these are cryptographic. Ability and spell records are rotated by a
//! key derived from three of their own bytes, item blocks are rotated by a
//! fixed amount, DMsg tables are bit-complemented and dialog tables are XORed
//! with `0x80`.

/// Minimum record length for [`decode`] to derive a key.
pub const MIN_DECODE_LEN: usize = 13;

/// Offsets of the bytes that select the rotation key.
pub const KEY_OFFSETS: [usize; 3] = [2, 11, 12];

/// Rotate every byte of `data` right by `bits` (taken mod 8).
#[inline]
pub fn rotate_right(data: &mut [u8], bits: u32) {
    let bits = bits % 8;
    if bits == 0 {
        return;
    }
    for b in data.iter_mut() {
        *b = b.rotate_right(bits);
    }
}

/// Derive the rotation key from bytes 2, 11 and 12.
///
/// Returns `None` when the buffer is too short to hold them.
pub fn key(data: &[u8]) -> Option<u32> {
    if data.len() < MIN_DECODE_LEN {
        return None;
    }

    let count = |offset: usize| data[offset].count_ones() as i32;
    let selector = (count(2) - count(11) + count(12)).abs() % 5;

    Some(match selector {
        0 => 7,
        1 => 1,
        2 => 6,
        3 => 2,
        4 => 5,
        _ => 0,
    })
}

/// Rotate the whole record by its derived key. No-op below [`MIN_DECODE_LEN`] bytes.
pub fn decode(data: &mut [u8]) {
    if let Some(bits) = key(data) {
        rotate_right(data, bits);
    }
}

/// [`decode`] a record while keeping the key bytes at their stored values.
///
/// The type and flag fields at offsets 2, 11 and 12 are stored in the clear,
/// so they are put back after the rotation.
pub fn decode_record(data: &mut [u8]) {
    if data.len() < MIN_DECODE_LEN {
        return;
    }

    let saved = KEY_OFFSETS.map(|offset| data[offset]);
    decode(data);
    for (offset, value) in KEY_OFFSETS.into_iter().zip(saved) {
        data[offset] = value;
    }
}

/// Flip every bit of every byte.
#[inline]
pub fn complement(data: &mut [u8]) {
    for b in data.iter_mut() {
        *b = !*b;
    }
}

/// XOR every byte with `0x80`.
#[inline]
pub fn xor_80(data: &mut [u8]) {
    for b in data.iter_mut() {
        *b ^= 0x80;
    }
}
