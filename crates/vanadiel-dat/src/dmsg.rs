//! Indexed string tables (`d_msg`).
//!
//! A 64-byte header is followed by an optional offset table and the entry
//! data. Each entry holds a field count and a list of `(offset, type)` pairs
//! pointing at strings or integers within the entry.

use vanadiel_common::{obfuscation, text, BinaryReader};
use vanadiel_model::{Record, Value};

use crate::header::DMsgHeader;
use crate::{field_name, Error, Result};

/// Offset of string data relative to its field offset.
const STRING_DATA_OFFSET: usize = 0x1C;

/// Location of one entry within the data section.
#[derive(Debug, Clone, Copy)]
struct EntrySpan {
    offset: usize,
    length: usize,
}

fn read_header(data: &[u8]) -> Result<DMsgHeader> {
    let header: DMsgHeader = BinaryReader::new(data).read_struct()?;

    if header.format.get() != DMsgHeader::FORMAT {
        return Err(Error::Format(format!(
            "bad d_msg format tag {:#x}",
            header.format.get()
        )));
    }
    if header.version.get() != DMsgHeader::VERSION {
        return Err(Error::UnsupportedVersion(header.version.get()));
    }

    let count = header.count.get() as usize;
    let table_size = header.table_size.get() as usize;
    let entry_size = header.entry_size.get() as usize;
    let data_size = header.data_size.get() as usize;

    if table_size != 0 {
        if table_size != count * 8 || entry_size != 0 {
            return Err(Error::Format(format!(
                "d_msg table of {table_size} bytes does not fit {count} entries (entry size {entry_size})"
            )));
        }
    } else if data_size != count * entry_size {
        return Err(Error::Format(format!(
            "d_msg data of {data_size} bytes does not fit {count} entries of {entry_size} bytes"
        )));
    }

    Ok(header)
}

fn entry_spans(header: &DMsgHeader, table: &[u8]) -> Result<Vec<EntrySpan>> {
    let count = header.count.get() as usize;

    if table.is_empty() {
        let length = header.entry_size.get() as usize;
        return Ok((0..count)
            .map(|i| EntrySpan {
                offset: i * length,
                length,
            })
            .collect());
    }

    let mut reader = BinaryReader::new(table);
    let mut spans = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = reader.read_u32()? as usize;
        let length = reader.read_u32()? as usize;
        spans.push(EntrySpan { offset, length });
    }
    Ok(spans)
}

fn read_i32_at(data: &[u8], offset: usize) -> Result<i32> {
    Ok(BinaryReader::new_at(data, offset).read_i32()?)
}

fn field_value(body: &[u8], span: EntrySpan, field: usize) -> Result<Value> {
    let base = span.offset + field * 8;
    let relative = read_i32_at(body, base + 4)?;
    let kind = read_i32_at(body, base + 8)?;

    let offset = usize::try_from(relative)
        .ok()
        .and_then(|r| r.checked_add(span.offset))
        .ok_or_else(|| Error::Format(format!("negative field offset {relative} in entry at {:#x}", span.offset)))?;

    match kind {
        0 => {
            let start = offset + STRING_DATA_OFFSET;
            let available = body.len().checked_sub(start).ok_or(vanadiel_common::Error::OutOfBounds {
                offset: start,
                length: span.length,
                size: body.len(),
            })?;
            let bytes = BinaryReader::new(body).bytes_at(start, span.length.min(available))?;
            Ok(Value::String(text::decode_cstr(bytes)))
        }
        1 => Ok(Value::Int(i64::from(read_i32_at(body, offset)?))),
        other => Err(Error::Format(format!(
            "unknown d_msg field type {other} in entry at {:#x}",
            span.offset
        ))),
    }
}

fn parse_entry(body: &[u8], span: EntrySpan, index: usize, fields: &[(usize, &str)]) -> Result<Record> {
    let count = read_i32_at(body, span.offset)?;
    let count = usize::try_from(count)
        .map_err(|_| Error::Format(format!("negative field count {count} in entry {index}")))?;

    let mut record = Record::with_id(index as i64);
    for field in 0..count {
        let Some(key) = field_name(fields, field) else {
            continue;
        };
        record.set(key, field_value(body, span, field)?);
    }
    Ok(record)
}

/// Decode a `d_msg` string table.
///
/// `fields` maps field indices to record keys; unmapped fields are skipped.
/// Each record's id is its entry index unless a field is mapped to `id`.
pub fn parse_dmsg(data: &[u8], fields: &[(usize, &str)]) -> Result<Vec<Record>> {
    let header = read_header(data)?;
    let reader = BinaryReader::new(data);

    let header_size = header.header_size.get() as usize;
    let table_size = header.table_size.get() as usize;
    let data_size = header.data_size.get() as usize;

    let mut table = reader.bytes_at(header_size, table_size)?.to_vec();
    let mut body = reader.bytes_at(header_size + table_size, data_size)?.to_vec();
    if header.is_encrypted() {
        obfuscation::complement(&mut table);
        obfuscation::complement(&mut body);
    }

    let spans = entry_spans(&header, &table)?;
    let mut records = Vec::with_capacity(spans.len());
    for (index, span) in spans.into_iter().enumerate() {
        records.push(parse_entry(&body, span, index, fields)?);
    }

    tracing::debug!(
        count = records.len(),
        encrypted = header.is_encrypted(),
        "parsed d_msg table"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode one entry holding a string field and an integer field.
    fn entry(name: &str, number: i32) -> Vec<u8> {
        let mut entry = Vec::new();
        entry.extend(2i32.to_le_bytes());
        let string_at = 4 + 2 * 8;
        let number_at = string_at + STRING_DATA_OFFSET + name.len() + 1;
        entry.extend((string_at as i32).to_le_bytes());
        entry.extend(0i32.to_le_bytes());
        entry.extend((number_at as i32).to_le_bytes());
        entry.extend(1i32.to_le_bytes());
        entry.extend([0u8; STRING_DATA_OFFSET]);
        entry.extend(name.as_bytes());
        entry.push(0);
        entry.extend(number.to_le_bytes());
        entry
    }

    fn table(entries: &[Vec<u8>], encrypted: bool) -> Vec<u8> {
        let mut offsets = Vec::new();
        let mut body = Vec::new();
        for e in entries {
            offsets.extend((body.len() as u32).to_le_bytes());
            offsets.extend((e.len() as u32).to_le_bytes());
            body.extend(e);
        }
        if encrypted {
            obfuscation::complement(&mut offsets);
            obfuscation::complement(&mut body);
        }

        let mut data = vec![0u8; DMsgHeader::SIZE];
        data[..5].copy_from_slice(b"d_msg");
        data[10] = u8::from(encrypted);
        data[12..20].copy_from_slice(&DMsgHeader::VERSION.to_le_bytes());
        data[24..28].copy_from_slice(&(DMsgHeader::SIZE as u32).to_le_bytes());
        data[28..32].copy_from_slice(&(offsets.len() as u32).to_le_bytes());
        data[36..40].copy_from_slice(&(body.len() as u32).to_le_bytes());
        data[40..44].copy_from_slice(&(entries.len() as u32).to_le_bytes());
        data.extend(offsets);
        data.extend(body);
        data
    }

    #[test]
    fn test_parse_encrypted_table() {
        let data = table(&[entry("Poison", 3), entry("Sleep", 2)], true);
        let records = parse_dmsg(&data, &[(0, "en"), (1, "_icon")]).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), Some(0));
        assert_eq!(records[0].get_str("en"), Some("Poison"));
        assert_eq!(records[1].get_str("en"), Some("Sleep"));
        assert_eq!(records[1].get_int("_icon"), Some(2));
    }

    #[test]
    fn test_unmapped_fields_and_id_override() {
        let data = table(&[entry("Ronfaure", 100)], false);
        let records = parse_dmsg(&data, &[(1, "id")]).unwrap();
        assert_eq!(records[0].id(), Some(100));
        assert!(!records[0].contains("en"));
    }

    #[test]
    fn test_header_checks() {
        let mut data = table(&[entry("a", 1)], false);
        data[12] = 4;
        assert!(matches!(parse_dmsg(&data, &[]), Err(Error::UnsupportedVersion(_))));

        let mut data = table(&[entry("a", 1)], false);
        data[40] = 2;
        assert!(matches!(parse_dmsg(&data, &[]), Err(Error::Format(_))));

        let mut data = table(&[entry("a", 1)], false);
        data[0] = b'x';
        assert!(matches!(parse_dmsg(&data, &[]), Err(Error::Format(_))));

        assert!(parse_dmsg(&data[..10], &[]).unwrap_err().is_format());
    }
}
