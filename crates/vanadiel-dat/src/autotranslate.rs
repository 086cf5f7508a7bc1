//! Auto-translate phrase dictionaries.

use vanadiel_common::{text, BinaryReader};
use vanadiel_model::Record;

use crate::Result;

const CATEGORY_NAME_SIZE: usize = 0x20;

/// Decode an auto-translate file into records `{id, <key>: name}`.
///
/// Ids with a zero low byte are categories; the rest are phrases within
/// the category named by the high byte.
pub fn parse_auto_translate(data: &[u8], key: &str) -> Result<Vec<Record>> {
    let mut reader = BinaryReader::new(data);
    let mut records = Vec::new();

    while !reader.is_empty() {
        reader.read_u8()?;
        let language = reader.read_u8()?;
        let id = 0x100 * u32::from(reader.read_u8()?) | u32::from(reader.read_u8()?);

        let name = if id & 0xFF == 0 {
            let _bracket = reader.read_bytes(CATEGORY_NAME_SIZE)?;
            let name = text::decode_cstr(reader.read_bytes(CATEGORY_NAME_SIZE)?);
            let _phrases = reader.read_i32()?;
            let _block_size = reader.read_i32()?;
            name
        } else {
            let length = reader.read_u8()? as usize;
            let bytes = reader.read_bytes(length)?;
            let name = text::decode(&bytes[..length.saturating_sub(1)]);
            if language == 1 {
                let extra = reader.read_u8()? as usize;
                reader.read_bytes(extra)?;
            }
            name
        };

        let mut record = Record::with_id(i64::from(id));
        record.set(key, name);
        records.push(record);
    }

    tracing::debug!(count = records.len(), "parsed auto-translate file");
    Ok(records)
}
