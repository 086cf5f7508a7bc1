//! JSON export of record collections.

use std::io::Write;

use crate::{Error, Record, RecordCollection, Result};

/// Public records of a collection, sorted by id.
fn public_records(collection: &RecordCollection) -> Vec<Record> {
    let mut records: Vec<Record> = collection.iter().map(Record::public).collect();
    records.sort_by_key(|r| r.id());
    records
}

/// Render a collection as a pretty-printed JSON array.
pub fn to_json(collection: &RecordCollection) -> Result<String> {
    serde_json::to_string_pretty(&public_records(collection)).map_err(|e| Error::Export(e.to_string()))
}

/// Write a collection as a pretty-printed JSON array.
pub fn write_json<W: Write>(writer: W, collection: &RecordCollection) -> Result<()> {
    serde_json::to_writer_pretty(writer, &public_records(collection))
        .map_err(|e| Error::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn test_json_shape() {
        let mut spell = Record::with_id(2);
        spell.set("en", "Cure II");
        spell.set("cast_time", 2.25);
        spell.set("_aoe_shape", 1);
        spell.set("levels", [("3", Value::from(11))].into_iter().collect::<Record>());
        let collection = RecordCollection::from_records("spells", vec![spell, Record::with_id(1)]);

        let json: serde_json::Value = serde_json::from_str(&to_json(&collection).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": 1},
                {"cast_time": 2.25, "en": "Cure II", "id": 2, "levels": {"3": 11}}
            ])
        );
    }
}
