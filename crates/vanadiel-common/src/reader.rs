//! Bounds-checked little-endian cursor over a byte slice.
//!
//! Offsets in DAT files come from the files themselves, so every read
//! returns an error instead of panicking when it would leave the buffer.

use byteorder::{ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// # Example
///
/// ```
/// use vanadiel_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a reader whose cursor starts at `position`.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Bytes left after the cursor.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Borrow `length` bytes at an absolute offset without touching the cursor.
    ///
    /// Offsets read from the data itself go through here, so overflowing or
    /// out-of-range spans become [`Error::OutOfBounds`].
    pub fn bytes_at(&self, offset: usize, length: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(length)
            .filter(|&end| end <= self.data.len())
            .map(|end| &self.data[offset..end])
            .ok_or(Error::OutOfBounds {
                offset,
                length,
                size: self.data.len(),
            })
    }

    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if available < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available,
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a header struct and advance past it.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }

    #[inline]
    pub fn peek_u32(&self) -> Result<u32> {
        self.peek_bytes(4).map(LittleEndian::read_u32)
    }

    /// Peek at the leading u64, used to sniff format tags.
    #[inline]
    pub fn peek_u64(&self) -> Result<u64> {
        self.peek_bytes(8).map(LittleEndian::read_u64)
    }
}
