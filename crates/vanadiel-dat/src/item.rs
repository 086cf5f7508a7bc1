//! Item records.
//!
//! Item files are arrays of `0xC00`-byte slots. Only the first `0x200` bytes
//! of a slot carry data; they are rotated right by 5 bits. The layout of the
//! fields after the common header depends on the item id range, and a string
//! section with the localized names follows the layout-specific fields.

use byteorder::{ByteOrder, LittleEndian};
use vanadiel_common::{obfuscation, text, BinaryReader};
use vanadiel_model::{Record, Value};

use crate::Result;

/// Size of one item slot in the file.
pub const BLOCK_SIZE: usize = 0xC00;

/// Bytes of each slot that are decoded.
pub const RECORD_SIZE: usize = 0x200;

const ROTATION: u32 = 5;

/// Offset of string data relative to its entry offset.
const STRING_DATA_OFFSET: usize = 0x1C;

/// Field layout of an item, selected by its id range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLayout {
    General,
    Usable,
    Automaton,
    Armor,
    Weapon,
    Maze,
    Monstrosity,
    Currency,
}

impl ItemLayout {
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            0x0001..=0x0FFF | 0x2200..=0x27FF => Some(Self::General),
            0x1000..=0x1FFF => Some(Self::Usable),
            0x2000..=0x21FF => Some(Self::Automaton),
            0x2800..=0x3FFF | 0x6400..=0x6FFF => Some(Self::Armor),
            0x4000..=0x53FF => Some(Self::Weapon),
            0x7000..=0x73FF => Some(Self::Maze),
            0xF000..=0xF1FF => Some(Self::Monstrosity),
            0xFFFF => Some(Self::Currency),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Usable => "Usable",
            Self::Automaton => "Automaton",
            Self::Armor => "Armor",
            Self::Weapon => "Weapon",
            Self::Maze => "Maze",
            Self::Monstrosity => "Monstrosity",
            Self::Currency => "Currency",
        }
    }

    /// Offset of the string section.
    pub fn strings_offset(self) -> usize {
        match self {
            Self::General | Self::Usable | Self::Automaton => 0x18,
            Self::Armor => 0x28,
            Self::Weapon => 0x34,
            Self::Maze => 0x54,
            Self::Monstrosity => 0x70,
            Self::Currency => 0x10,
        }
    }
}

/// Language of a string section, identified by its entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Language {
    Japanese,
    English,
    French,
    German,
}

impl Language {
    fn from_count(count: u32) -> Option<Self> {
        match count {
            2 => Some(Self::Japanese),
            5 => Some(Self::English),
            6 => Some(Self::French),
            9 => Some(Self::German),
            _ => None,
        }
    }

    /// Name key, log name key and the entry index of the log name.
    fn keys(self) -> (&'static str, &'static str, usize) {
        match self {
            Self::Japanese => ("ja", "jal", 0),
            Self::English => ("en", "enl", 2),
            Self::French => ("fr", "frl", 3),
            Self::German => ("de", "del", 4),
        }
    }
}

fn u16_at(data: &[u8; RECORD_SIZE], offset: usize) -> u16 {
    LittleEndian::read_u16(&data[offset..])
}

fn u32_at(data: &[u8; RECORD_SIZE], offset: usize) -> u32 {
    LittleEndian::read_u32(&data[offset..])
}

/// Read entry `index` of the string section at `section`.
///
/// Entries of an unknown type yield `None`.
fn string_entry(data: &[u8], section: usize, index: usize) -> Result<Option<Value>> {
    let mut reader = BinaryReader::new_at(data, section + 4 + index * 8);
    let offset = reader.read_u32()? as usize;
    let kind = reader.read_u32()?;

    match kind {
        0 => {
            let start = section + offset + STRING_DATA_OFFSET;
            let tail = BinaryReader::new(data).bytes_at(start, data.len().saturating_sub(start))?;
            Ok(Some(Value::String(text::decode_cstr(tail))))
        }
        1 => {
            let mut reader = BinaryReader::new_at(data, section + offset);
            Ok(Some(Value::Int(i64::from(reader.read_i32()?))))
        }
        other => {
            tracing::warn!(kind = other, index, section, "skipping item string of unknown type");
            Ok(None)
        }
    }
}

/// Add the name and log name found in the string section to `record`.
fn parse_strings(data: &[u8], section: usize, record: &mut Record) -> Result<()> {
    let count = BinaryReader::new_at(data, section).read_u32()?;
    let Some(language) = Language::from_count(count) else {
        tracing::trace!(count, section, "unrecognized item string section");
        return Ok(());
    };

    let (name_key, log_key, log_index) = language.keys();
    let name = string_entry(data, section, 0)?;
    let log = if log_index == 0 {
        name.clone()
    } else {
        string_entry(data, section, log_index)?
    };

    if let Some(name) = name {
        record.set(name_key, name);
    }
    if let Some(log) = log {
        record.set(log_key, log);
    }
    Ok(())
}

fn parse_layout_fields(data: &[u8; RECORD_SIZE], layout: ItemLayout, record: &mut Record) {
    match layout {
        ItemLayout::Usable => {
            record.set_nonzero("cast_time", u16_at(data, 0x0E));
        }
        ItemLayout::Armor | ItemLayout::Weapon => {
            record.set_nonzero("level", u16_at(data, 0x0E));
            record.set_nonzero("slots", u16_at(data, 0x10));
            record.set_nonzero("races", u16_at(data, 0x12));
            record.set_nonzero("jobs", u32_at(data, 0x14));

            if layout == ItemLayout::Armor {
                record.set_nonzero("max_charges", data[0x1A]);
                record.set_nonzero("cast_time", data[0x1B]);
                record.set_nonzero("cast_delay", u16_at(data, 0x1C));
                record.set_nonzero("recast_delay", u32_at(data, 0x20));
                record.set_nonzero("item_level", u16_at(data, 0x24));
            } else {
                record.set_nonzero("superior_level", u16_at(data, 0x18));
                record.set_nonzero("damage", u16_at(data, 0x1A));
                record.set_nonzero("delay", LittleEndian::read_i16(&data[0x1C..]));
                record.set_nonzero("dps", u16_at(data, 0x1E));
                record.set_nonzero("skill", data[0x20]);
                record.set_nonzero("jug_size", data[0x21]);
                record.set_nonzero("max_charges", data[0x24]);
                record.set_nonzero("cast_time", data[0x25]);
                record.set_nonzero("cast_delay", u16_at(data, 0x26));
                record.set_nonzero("recast_delay", u32_at(data, 0x28));
                record.set_nonzero("item_level", u16_at(data, 0x2C));
            }
        }
        ItemLayout::Monstrosity => {
            let mut moves = Record::new();
            for entry in data[0x30..0x70].chunks_exact(4) {
                let move_id = LittleEndian::read_u16(entry);
                let level = entry[2];
                if level != 0 && level != 0xFF {
                    moves.set(move_id.to_string(), level);
                }
            }
            if !moves.is_empty() {
                record.set("tp_moves", moves);
            }
        }
        ItemLayout::General | ItemLayout::Automaton | ItemLayout::Maze | ItemLayout::Currency => {}
    }
}

/// Decode one deobfuscated item record.
///
/// Returns `None` for empty slots and ids outside every known range.
pub fn parse_item(data: &[u8; RECORD_SIZE]) -> Result<Option<Record>> {
    let id = u16_at(data, 0);
    if id == 0 {
        return Ok(None);
    }
    let Some(layout) = ItemLayout::from_id(id) else {
        tracing::trace!(id, "item id outside known ranges");
        return Ok(None);
    };

    let record_id = match layout {
        ItemLayout::Monstrosity => i64::from(id) - 0xF000,
        _ => i64::from(id),
    };

    let mut record = Record::with_id(record_id);
    record.set("category", layout.name());
    record.set("flags", u16_at(data, 4));
    record.set("stack", u16_at(data, 6));
    record.set("type", u16_at(data, 8));
    if layout != ItemLayout::Currency {
        record.set("targets", u16_at(data, 0x0C));
    }

    parse_layout_fields(data, layout, &mut record);
    parse_strings(data, layout.strings_offset(), &mut record)?;
    Ok(Some(record))
}

/// Copy and deobfuscate the record of slot `index`.
fn slot(buffer: &[u8], index: usize) -> Result<[u8; RECORD_SIZE]> {
    let bytes = BinaryReader::new(buffer).bytes_at(index * BLOCK_SIZE, RECORD_SIZE)?;
    let mut data = [0u8; RECORD_SIZE];
    data.copy_from_slice(bytes);
    obfuscation::rotate_right(&mut data, ROTATION);
    Ok(data)
}

/// Decode aligned item files, one per language.
///
/// The first buffer provides the full records. The others contribute only
/// their names, matched to the first by slot and id.
pub fn parse_items(buffers: &[&[u8]]) -> Result<Vec<Record>> {
    let Some((primary, others)) = buffers.split_first() else {
        return Ok(Vec::new());
    };

    let slots = primary.len() / BLOCK_SIZE;
    let mut records = Vec::with_capacity(slots);

    for index in 0..slots {
        let data = slot(primary, index)?;
        let Some(mut record) = parse_item(&data)? else {
            continue;
        };
        let id = u16_at(&data, 0);

        for other in others {
            let data = slot(other, index)?;
            if u16_at(&data, 0) != id {
                tracing::debug!(index, id, "item slot id differs between languages");
                continue;
            }
            if let Some(layout) = ItemLayout::from_id(id) {
                parse_strings(&data, layout.strings_offset(), &mut record)?;
            }
        }

        records.push(record);
    }

    tracing::debug!(slots, count = records.len(), languages = buffers.len(), "parsed item file");
    Ok(records)
}
