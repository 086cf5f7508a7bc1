//! Spell records (`0x64` bytes each).

use byteorder::{ByteOrder, LittleEndian};
use vanadiel_common::obfuscation;
use vanadiel_model::{Record, Value};

use crate::types::{MagicType, JOB_COUNT};

/// Size of one spell record.
pub const RECORD_SIZE: usize = 0x64;

const LEVELS_OFFSET: usize = 0x0E;

/// Recast in seconds from the raw recast byte.
///
/// Values of `0xB0` and above that are multiples of 16 encode whole minutes
/// counting down from five; everything else is in quarter seconds.
pub fn recast_seconds(raw: u8) -> f64 {
    if raw >= 0xB0 && raw % 16 == 0 {
        f64::from(300 - (i32::from(raw / 16) - 11) * 60)
    } else {
        f64::from(raw) / 4.0
    }
}

/// Level table keyed by job id. Unlearnable jobs (-1) and the last slot are omitted.
fn levels(data: &[u8; RECORD_SIZE]) -> Record {
    let mut levels = Record::new();
    for job in 0..JOB_COUNT - 1 {
        let level = LittleEndian::read_i16(&data[LEVELS_OFFSET + job * 2..]);
        if level != -1 {
            levels.set(job.to_string(), level);
        }
    }
    levels
}

/// Decode a deobfuscated spell record. Returns `None` for empty slots.
pub fn parse_spell(data: &[u8; RECORD_SIZE]) -> Option<Record> {
    let id = LittleEndian::read_u16(&data[0..]);
    if id == 0 {
        return None;
    }

    let kind = MagicType::from_raw(LittleEndian::read_u16(&data[2..]));
    let range = match data[0x45] {
        15 => 0,
        r => r,
    };

    let mut record = Record::with_id(i64::from(id));
    record.set("type", kind.name());
    record.set("prefix", kind.prefix());
    record.set("element", data[4] as i8);
    record.set("targets", LittleEndian::read_u16(&data[6..]));
    record.set("skill", LittleEndian::read_u16(&data[8..]));
    record.set("mp_cost", LittleEndian::read_u16(&data[10..]));
    record.set("cast_time", f64::from(data[12]) / 4.0);
    record.set("recast", recast_seconds(data[13]));
    record.set("levels", Value::Map(levels(data)));
    record.set("recast_id", LittleEndian::read_u16(&data[0x3E..]));
    record.set("icon_id", LittleEndian::read_u16(&data[0x40..]));
    record.set("icon_id_nq", LittleEndian::read_u16(&data[0x42..]));
    record.set("requirements", data[0x44]);
    record.set("range", range);
    record.set("_aoe_range", data[0x46]);
    record.set("_aoe_shape", data[0x47]);
    record.set("_aoe_target", data[0x48]);
    record.set("_cursor", data[0x49]);
    Some(record)
}

/// Decode every record of a spell data block.
///
/// A trailing partial record is ignored.
pub fn parse_spells(payload: &[u8]) -> Vec<Record> {
    let mut records = Vec::with_capacity(payload.len() / RECORD_SIZE);
    let mut buffer = [0u8; RECORD_SIZE];

    for chunk in payload.chunks_exact(RECORD_SIZE) {
        buffer.copy_from_slice(chunk);
        obfuscation::decode_record(&mut buffer);
        if let Some(record) = parse_spell(&buffer) {
            records.push(record);
        }
    }

    tracing::trace!(count = records.len(), "parsed spell block");
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recast_rule() {
        assert_eq!(recast_seconds(0xC0), 240.0);
        assert_eq!(recast_seconds(0xB0), 300.0);
        assert_eq!(recast_seconds(0x28), 10.0);
        assert_eq!(recast_seconds(0xB1), 44.25);
    }

    #[test]
    fn test_parse_spell_fields() {
        let mut data = [0u8; RECORD_SIZE];
        data[0..2].copy_from_slice(&1u16.to_le_bytes());
        data[2..4].copy_from_slice(&1u16.to_le_bytes());
        data[4] = 6;
        data[10..12].copy_from_slice(&8u16.to_le_bytes());
        data[12] = 10;
        data[13] = 0x14;
        for job in 0..JOB_COUNT {
            let offset = LEVELS_OFFSET + job * 2;
            data[offset..offset + 2].copy_from_slice(&(-1i16).to_le_bytes());
        }
        data[LEVELS_OFFSET + 3 * 2] = 1;
        data[LEVELS_OFFSET + 3 * 2 + 1] = 0;
        data[LEVELS_OFFSET + 23 * 2] = 99;
        data[LEVELS_OFFSET + 23 * 2 + 1] = 0;
        data[0x3E] = 1;
        data[0x45] = 15;

        let record = parse_spell(&data).unwrap();
        assert_eq!(record.get_str("type"), Some("WhiteMagic"));
        assert_eq!(record.get_str("prefix"), Some("/magic"));
        assert_eq!(record.get_int("mp_cost"), Some(8));
        assert_eq!(record.get_float("cast_time"), Some(2.5));
        assert_eq!(record.get_float("recast"), Some(5.0));
        assert_eq!(record.get_int("recast_id"), Some(1));
        assert_eq!(record.get_int("range"), Some(0));

        let levels = record.get("levels").and_then(Value::as_map).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels.get_int("3"), Some(1));
    }

    #[test]
    fn test_empty_slots_skipped() {
        let payload = vec![0u8; RECORD_SIZE * 3];
        assert!(parse_spells(&payload).is_empty());
    }
}
