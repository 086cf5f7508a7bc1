//! Dialog string tables.
//!
//! The first u32 is `0x10000000` plus the length of the rest of the file.
//! The rest is XORed with `0x80` and starts with a table of u32 offsets, the
//! first of which is also the table size.

use vanadiel_common::{obfuscation, text, BinaryReader};
use vanadiel_model::Record;

use crate::{Error, Result};

/// Flag set in the leading size word.
pub const SIZE_FLAG: u32 = 0x10000000;

/// Whether `data` starts with a dialog size word matching its length.
pub fn is_dialog(data: &[u8]) -> bool {
    match BinaryReader::new(data).peek_u32() {
        Ok(raw) => raw & SIZE_FLAG != 0 && (raw % SIZE_FLAG) as usize == data.len() - 4,
        Err(_) => false,
    }
}

/// Decode a dialog table into records `{id: index, <key>: string}`.
pub fn parse_dialog(data: &[u8], key: &str) -> Result<Vec<Record>> {
    if !is_dialog(data) {
        return Err(Error::Format("dialog size word does not match file length".to_string()));
    }

    let mut body = data[4..].to_vec();
    obfuscation::xor_80(&mut body);

    let mut reader = BinaryReader::new(&body);
    let count = reader.peek_u32()? as usize / 4;
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(reader.read_u32()? as usize);
    }

    let mut records = Vec::with_capacity(count);
    for (index, &start) in offsets.iter().enumerate() {
        let end = offsets.get(index + 1).copied().unwrap_or(body.len());
        if start > end || end > body.len() {
            return Err(Error::Format(format!(
                "dialog string {index} spans {start:#x}..{end:#x} outside {} bytes",
                body.len()
            )));
        }

        let mut bytes = &body[start..end];
        while let [rest @ .., 0] = bytes {
            bytes = rest;
        }

        let mut record = Record::with_id(index as i64);
        record.set(key, text::decode(bytes));
        records.push(record);
    }

    tracing::debug!(count = records.len(), "parsed dialog table");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialog(strings: &[&[u8]]) -> Vec<u8> {
        let mut body = Vec::new();
        let mut offset = strings.len() * 4;
        for s in strings {
            body.extend((offset as u32).to_le_bytes());
            offset += s.len();
        }
        for s in strings {
            body.extend_from_slice(s);
        }
        obfuscation::xor_80(&mut body);

        let mut data = (SIZE_FLAG + body.len() as u32).to_le_bytes().to_vec();
        data.extend(body);
        data
    }

    #[test]
    fn test_parse_dialog() {
        let data = dialog(&[b"Welcome.\0\0", b"Line\x07two\0", b""]);
        assert!(is_dialog(&data));

        let records = parse_dialog(&data, "en").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get_str("en"), Some("Welcome."));
        assert_eq!(records[1].get_str("en"), Some("Line\ntwo"));
        assert_eq!(records[2].get_str("en"), Some(""));
        assert_eq!(records[2].id(), Some(2));
    }

    #[test]
    fn test_rejects_bad_sizes() {
        let mut data = dialog(&[b"abc"]);
        data.push(0);
        assert!(!is_dialog(&data));
        assert!(matches!(parse_dialog(&data, "en"), Err(Error::Format(_))));

        // Table claims more offsets than the file holds.
        let mut body = 40u32.to_le_bytes().to_vec();
        obfuscation::xor_80(&mut body);
        let mut data = (SIZE_FLAG + 4).to_le_bytes().to_vec();
        data.extend(body);
        assert!(parse_dialog(&data, "en").unwrap_err().is_format());
    }
}
