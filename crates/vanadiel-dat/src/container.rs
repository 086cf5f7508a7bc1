//! Walker for block-structured container files.
//!
//! A container is a `ContainerBegin` block followed by child blocks and a
//! closing `ContainerEnd`. Children may themselves be containers.

use vanadiel_common::{BinaryReader, FromBytes};
use vanadiel_model::Record;

use crate::ability::parse_abilities;
use crate::header::{BlockHeader, BlockType};
use crate::spell::parse_spells;
use crate::{Error, Result};

/// Nesting deeper than this is treated as corrupt data.
const MAX_DEPTH: usize = 64;

/// Records decoded from one leaf block.
#[derive(Debug, Clone, PartialEq)]
pub enum DataBlock {
    Abilities(Vec<Record>),
    Spells(Vec<Record>),
}

/// Result of walking a container file.
#[derive(Debug, Clone, Default)]
pub struct Walk {
    /// Leaf blocks in file order.
    pub blocks: Vec<DataBlock>,
    /// Position just past the top-level `ContainerEnd`.
    pub end: usize,
}

impl Walk {
    /// All ability records, in file order.
    pub fn abilities(&self) -> impl Iterator<Item = &Record> {
        self.blocks.iter().flat_map(|b| match b {
            DataBlock::Abilities(records) => records.as_slice(),
            DataBlock::Spells(_) => &[],
        })
    }

    /// All spell records, in file order.
    pub fn spells(&self) -> impl Iterator<Item = &Record> {
        self.blocks.iter().flat_map(|b| match b {
            DataBlock::Spells(records) => records.as_slice(),
            DataBlock::Abilities(_) => &[],
        })
    }
}

fn read_header(data: &[u8], position: usize) -> Result<BlockHeader> {
    let reader = BinaryReader::new(data);
    let bytes = reader.bytes_at(position, BlockHeader::SIZE)?;
    BlockHeader::read_from_bytes(bytes)
        .map_err(|_| Error::Format(format!("truncated block header at {position:#x}")))
}

/// Payload length as an offset, rejecting negative sizes.
fn payload_len(header: &BlockHeader, block_start: usize) -> Result<usize> {
    usize::try_from(header.size()).map_err(|_| {
        Error::Format(format!(
            "negative block size {} at {:#x}",
            header.size(),
            block_start - BlockHeader::SIZE
        ))
    })
}

/// Walk a container file and decode every leaf block it holds.
pub fn walk(data: &[u8]) -> Result<Walk> {
    let mut blocks = Vec::new();
    let end = walk_container(data, 0, 0, &mut blocks)?;
    tracing::debug!(blocks = blocks.len(), end, "walked container");
    Ok(Walk { blocks, end })
}

fn walk_container(data: &[u8], start: usize, depth: usize, out: &mut Vec<DataBlock>) -> Result<usize> {
    if depth > MAX_DEPTH {
        return Err(Error::Format(format!("containers nested deeper than {MAX_DEPTH}")));
    }

    let header = read_header(data, start)?;
    if header.block_type() != BlockType::ContainerBegin {
        return Err(Error::Format(format!(
            "expected container begin at {start:#x}, found {:?}",
            header.block_type()
        )));
    }
    let mut position = start + BlockHeader::SIZE + payload_len(&header, start + BlockHeader::SIZE)?;

    loop {
        let header = read_header(data, position)?;
        let block_start = position + BlockHeader::SIZE;

        match header.block_type() {
            BlockType::ContainerEnd => {
                return Ok(block_start + payload_len(&header, block_start).unwrap_or(0));
            }
            BlockType::ContainerBegin => {
                let size = payload_len(&header, block_start)?;
                let nested_end = walk_container(data, position, depth + 1, out)?;
                position = nested_end.max(block_start + size);
            }
            kind @ (BlockType::AbilityData | BlockType::SpellData) => {
                let size = payload_len(&header, block_start)?;
                if size == 0 {
                    return Err(Error::Format(format!("empty {kind:?} block at {position:#x}")));
                }
                let payload = BinaryReader::new(data).bytes_at(block_start, size)?;
                out.push(match kind {
                    BlockType::AbilityData => DataBlock::Abilities(parse_abilities(payload)),
                    _ => DataBlock::Spells(parse_spells(payload)),
                });
                position = block_start + size;
            }
            BlockType::Unknown(raw) => {
                let size = payload_len(&header, block_start)?;
                tracing::warn!(block_type = raw, offset = position, size, "skipping unknown block");
                position = block_start + size;
            }
        }
    }
}
