//! Fixed headers of the DAT container and string table formats.

use zerocopy::byteorder::little_endian::{I32, U16, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Kind of a container block, from the low 7 bits of the packed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    ContainerEnd,
    ContainerBegin,
    SpellData,
    AbilityData,
    Unknown(u8),
}

impl BlockType {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::ContainerEnd,
            0x01 => Self::ContainerBegin,
            0x49 => Self::SpellData,
            0x53 => Self::AbilityData,
            other => Self::Unknown(other),
        }
    }
}

/// Header preceding every block of a container file.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct BlockHeader {
    /// Block identifier.
    pub id: I32,
    /// Size in the high bits, type in the low 7.
    pub packed: U32,
    pub padding: [u8; 8],
}

impl BlockHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 16;

    /// Payload length after the header. May be negative for end markers.
    pub fn size(&self) -> i64 {
        i64::from((self.packed.get() >> 3) & !0xF) - Self::SIZE as i64
    }

    pub fn block_type(&self) -> BlockType {
        BlockType::from_raw((self.packed.get() & 0x7F) as u8)
    }
}

/// Header of an indexed string table (`d_msg`).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct DMsgHeader {
    /// `"d_msg"` padded with NULs.
    pub format: U64,
    pub unknown: U16,
    /// Nonzero when table and data are bit-complemented.
    pub encrypted: u8,
    pub padding: u8,
    pub version: U64,
    pub file_size: U32,
    pub header_size: U32,
    pub table_size: U32,
    pub entry_size: U32,
    pub data_size: U32,
    pub count: U32,
    pub reserved: [u8; 20],
}

impl DMsgHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 64;

    /// Format tag: `"d_msg"` read as a little-endian u64.
    pub const FORMAT: u64 = 0x67736D5F64;

    /// The only supported version.
    pub const VERSION: u64 = 0x0000000300000003;

    pub fn is_encrypted(&self) -> bool {
        self.encrypted != 0
    }
}
