//! Ability records (`0x30` bytes each).

use byteorder::{ByteOrder, LittleEndian};
use vanadiel_common::obfuscation;
use vanadiel_model::Record;

use crate::types::AbilityType;

/// Size of one ability record.
pub const RECORD_SIZE: usize = 0x30;

/// Decode a deobfuscated ability record. Returns `None` for empty slots.
pub fn parse_ability(data: &[u8; RECORD_SIZE]) -> Option<Record> {
    let id = LittleEndian::read_u16(&data[0..]);
    if id == 0 {
        return None;
    }

    let kind = AbilityType::from_raw(data[2]);
    let tp_cost = match LittleEndian::read_i16(&data[12..]) {
        -1 => 0,
        cost => cost,
    };

    let mut record = Record::with_id(i64::from(id));
    record.set("type", kind.name());
    record.set("prefix", kind.prefix());
    record.set("element", data[3] & 7);
    record.set("icon_id", LittleEndian::read_u16(&data[4..]));
    record.set("mp_cost", LittleEndian::read_u16(&data[6..]));
    record.set("recast_id", LittleEndian::read_u16(&data[8..]));
    record.set("targets", LittleEndian::read_u16(&data[10..]));
    record.set("tp_cost", tp_cost);
    record.set("_unknown1", data[14]);
    record.set("monster_level", data[15] as i8);
    record.set("range", data[16] % 15);
    Some(record)
}

/// Decode every record of an ability data block.
///
/// A trailing partial record is ignored.
pub fn parse_abilities(payload: &[u8]) -> Vec<Record> {
    let mut records = Vec::with_capacity(payload.len() / RECORD_SIZE);
    let mut buffer = [0u8; RECORD_SIZE];

    for chunk in payload.chunks_exact(RECORD_SIZE) {
        buffer.copy_from_slice(chunk);
        obfuscation::decode_record(&mut buffer);
        if let Some(record) = parse_ability(&buffer) {
            records.push(record);
        }
    }

    tracing::trace!(count = records.len(), "parsed ability block");
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_ability(id: u16) -> [u8; RECORD_SIZE] {
        let mut data = [0u8; RECORD_SIZE];
        data[0..2].copy_from_slice(&id.to_le_bytes());
        data[2] = 1;
        data[3] = 0x0B;
        data[4..6].copy_from_slice(&42u16.to_le_bytes());
        data[8..10].copy_from_slice(&5u16.to_le_bytes());
        data[10..12].copy_from_slice(&1u16.to_le_bytes());
        data[12..14].copy_from_slice(&(-1i16).to_le_bytes());
        data[15] = 0xFF;
        data[16] = 16;
        data
    }

    #[test]
    fn test_parse_ability_fields() {
        let record = parse_ability(&plain_ability(0x210)).unwrap();
        assert_eq!(record.id(), Some(0x210));
        assert_eq!(record.get_str("type"), Some("JobAbility"));
        assert_eq!(record.get_str("prefix"), Some("/jobability"));
        assert_eq!(record.get_int("element"), Some(3));
        assert_eq!(record.get_int("icon_id"), Some(42));
        assert_eq!(record.get_int("recast_id"), Some(5));
        assert_eq!(record.get_int("tp_cost"), Some(0));
        assert_eq!(record.get_int("monster_level"), Some(-1));
        assert_eq!(record.get_int("range"), Some(1));
    }

    #[test]
    fn test_empty_slot_skipped() {
        assert!(parse_ability(&[0u8; RECORD_SIZE]).is_none());
    }

    #[test]
    fn test_parse_block_decodes_records() {
        // Key bytes 2, 11, 12 have popcounts 0, 0, 0 => rotate by 7.
        let mut raw = [0u8; RECORD_SIZE];
        raw[0] = 0x02u8.rotate_left(7);
        raw[4] = 0x09u8.rotate_left(7);

        let mut payload = raw.to_vec();
        payload.extend_from_slice(&[0u8; RECORD_SIZE + 7]);

        let records = parse_abilities(&payload);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), Some(2));
        assert_eq!(records[0].get_int("icon_id"), Some(9));
        assert_eq!(records[0].get_str("type"), Some("Misc"));
    }
}
