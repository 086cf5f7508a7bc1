//! Format detection for string-table DAT files.

use vanadiel_common::BinaryReader;
use vanadiel_model::Record;

use crate::autotranslate::parse_auto_translate;
use crate::dialog::{is_dialog, parse_dialog};
use crate::dmsg::parse_dmsg;
use crate::header::DMsgHeader;
use crate::{field_name, Error, Result};

/// String table format of a DAT file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatFormat {
    DMsg,
    Dialog,
    AutoTranslate,
}

const AUTO_TRANSLATE_MASK: u32 = 0xFFFFFCFF;
const AUTO_TRANSLATE_TAG: u32 = 0x00010002;

impl DatFormat {
    /// Identify the format from the leading bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        let reader = BinaryReader::new(data);

        if reader.peek_u64().ok() == Some(DMsgHeader::FORMAT) {
            Some(Self::DMsg)
        } else if is_dialog(data) {
            Some(Self::Dialog)
        } else if reader
            .peek_u32()
            .is_ok_and(|raw| raw & AUTO_TRANSLATE_MASK == AUTO_TRANSLATE_TAG)
        {
            Some(Self::AutoTranslate)
        } else {
            None
        }
    }
}

/// Detect the format of `data` and decode it.
///
/// DMsg tables use every mapped field. Dialog and auto-translate files hold
/// a single string per entry, stored under the key mapped to field 0.
pub fn parse_dat(data: &[u8], fields: &[(usize, &str)]) -> Result<Vec<Record>> {
    let format = DatFormat::detect(data).ok_or_else(|| {
        let mut lead = [0u8; 8];
        let n = data.len().min(8);
        lead[..n].copy_from_slice(&data[..n]);
        Error::UnknownFormat(u64::from_le_bytes(lead))
    })?;
    tracing::trace!(?format, len = data.len(), "detected DAT format");

    match format {
        DatFormat::DMsg => parse_dmsg(data, fields),
        DatFormat::Dialog => parse_dialog(data, field_name(fields, 0).ok_or(Error::MissingField(0))?),
        DatFormat::AutoTranslate => {
            parse_auto_translate(data, field_name(fields, 0).ok_or(Error::MissingField(0))?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        let mut dmsg = b"d_msg\0\0\0".to_vec();
        dmsg.extend([0u8; 8]);
        assert_eq!(DatFormat::detect(&dmsg), Some(DatFormat::DMsg));

        let mut dialog = (0x10000000u32 + 4).to_le_bytes().to_vec();
        dialog.extend(0x80808084u32.to_le_bytes());
        assert_eq!(DatFormat::detect(&dialog), Some(DatFormat::Dialog));

        assert_eq!(DatFormat::detect(&[0x02, 0x02, 0x01, 0x00]), Some(DatFormat::AutoTranslate));
        assert_eq!(DatFormat::detect(&[0x02, 0x01, 0x01, 0x00]), Some(DatFormat::AutoTranslate));
        assert_eq!(DatFormat::detect(&[0xAB, 0xCD]), None);
    }

    #[test]
    fn test_parse_dat_dispatch() {
        let mut dialog = (0x10000000u32 + 6).to_le_bytes().to_vec();
        let mut body = 4u32.to_le_bytes().to_vec();
        body.extend(b"Hi");
        vanadiel_common::obfuscation::xor_80(&mut body);
        dialog.extend(body);

        let records = parse_dat(&dialog, &[(0, "en")]).unwrap();
        assert_eq!(records[0].get_str("en"), Some("Hi"));

        assert!(matches!(parse_dat(&dialog, &[(1, "en")]), Err(Error::MissingField(0))));
        assert!(matches!(parse_dat(b"garbage!", &[]), Err(Error::UnknownFormat(_))));
    }
}
