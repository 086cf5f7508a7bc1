//! Lua table emitter.
//!
//! Output is a chunk returning the records keyed by id plus the list of keys
//! that appear in them:
//!
//! ```lua
//! -- Automatically generated file: Job Abilities
//!
//! return {
//!     [1] = {id=1,en="Mighty Strikes",ja="マイティストライク",mp_cost=0},
//! }, {"id", "en", "ja", "mp_cost"}
//! ```

use std::fmt::Write as _;
use std::io::Write;

use crate::record::is_diagnostic;
use crate::{Record, RecordCollection, Result, Value};

/// Keys emitted first, in this order, when present.
pub const FIXED_KEYS: [&str; 9] = ["id", "en", "ja", "de", "fr", "enl", "jal", "del", "frl"];

/// Header words for a collection name: `job_abilities` becomes `Job Abilities`.
pub fn title(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reserved words that cannot appear as bare table keys.
const KEYWORDS: [&str; 22] = [
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

fn is_identifier(key: &str) -> bool {
    if KEYWORDS.contains(&key) {
        return false;
    }
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

fn write_key(out: &mut String, key: &str) {
    if let Ok(n) = key.parse::<i64>() {
        let _ = write!(out, "[{n}]");
    } else if is_identifier(key) {
        out.push_str(key);
    } else {
        out.push('[');
        write_string(out, key);
        out.push(']');
    }
}

/// Render a single value as a Lua expression.
pub fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        Value::Int(v) => {
            let _ = write!(out, "{v}");
        }
        Value::Float(v) if v.is_nan() => out.push_str("0/0"),
        Value::Float(v) if v.is_infinite() => {
            out.push_str(if v.is_sign_negative() { "-math.huge" } else { "math.huge" })
        }
        Value::Float(v) => {
            let _ = write!(out, "{v}");
        }
        Value::String(s) => write_string(out, s),
        Value::Map(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_key(out, k);
                out.push('=');
                write_value(out, v);
            }
            out.push('}');
        }
        Value::List(list) => {
            out.push('{');
            for (i, v) in list.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, v);
            }
            out.push('}');
        }
    }
}

/// Keys of `record` in emission order: fixed keys first, then the rest sorted.
pub fn ordered_keys(record: &Record) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::with_capacity(record.len());
    for key in FIXED_KEYS {
        if record.contains(key) {
            keys.push(key);
        }
    }
    keys.extend(
        record
            .keys()
            .filter(|k| !FIXED_KEYS.contains(k) && !is_diagnostic(k)),
    );
    keys
}

/// Render a record as a Lua table constructor.
pub fn record_to_lua(record: &Record) -> String {
    let mut out = String::from("{");
    for (i, key) in ordered_keys(record).into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_key(&mut out, key);
        out.push('=');
        if let Some(value) = record.get(key) {
            write_value(&mut out, value);
        }
    }
    out.push('}');
    out
}

/// Render a whole collection as a Lua chunk.
pub fn to_lua(collection: &RecordCollection) -> String {
    let mut records: Vec<(i64, &Record)> = collection
        .iter()
        .filter_map(|r| r.id().map(|id| (id, r)))
        .collect();
    records.sort_by_key(|(id, _)| *id);

    let skipped = collection.len() - records.len();
    if skipped > 0 {
        tracing::debug!(collection = collection.name(), skipped, "records without id not emitted");
    }

    let mut out = String::new();
    let _ = writeln!(out, "-- Automatically generated file: {}", title(collection.name()));
    out.push('\n');
    out.push_str("return {\n");

    let mut keys: Vec<&str> = Vec::new();
    for (id, record) in &records {
        let _ = writeln!(out, "    [{}] = {},", id, record_to_lua(record));
        for key in ordered_keys(record) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    let key_list = keys
        .iter()
        .map(|k| {
            let mut quoted = String::new();
            write_string(&mut quoted, k);
            quoted
        })
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "}}, {{{}}}", key_list);

    out
}

/// Write a collection as a Lua chunk.
pub fn write_lua<W: Write>(writer: &mut W, collection: &RecordCollection) -> Result<()> {
    writer.write_all(to_lua(collection).as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        assert_eq!(title("job_abilities"), "Job Abilities");
        assert_eq!(title("items"), "Items");
    }

    #[test]
    fn test_record_key_order_and_escaping() {
        let mut record = Record::with_id(3);
        record.set("mp_cost", 8);
        record.set("ja", "ケアル");
        record.set("en", "Say \"hi\"\nnow");
        record.set("_unknown1", 1);
        record.set("cast_time", 2.5);

        assert_eq!(
            record_to_lua(&record),
            r#"{id=3,en="Say \"hi\"\nnow",ja="ケアル",cast_time=2.5,mp_cost=8}"#
        );
    }

    #[test]
    fn test_nested_values() {
        let levels: Record = [("3", Value::from(1)), ("7", Value::from(5))].into_iter().collect();
        let mut record = Record::with_id(1);
        record.set("levels", levels);
        record.set("tp_moves", Value::List(vec![Value::from(1), Value::from(2)]));
        record.set("recast", 5.0);

        assert_eq!(
            record_to_lua(&record),
            "{id=1,levels={[3]=1,[7]=5},recast=5,tp_moves={1,2}}"
        );
    }

    #[test]
    fn test_reserved_keys_and_special_floats() {
        let mut record = Record::with_id(4);
        record.set("end", 1);
        record.set("range", f64::INFINITY);
        record.set("ratio", f64::NAN);
        record.set("floor", f64::NEG_INFINITY);
        record.set("endurance", 2);

        assert_eq!(
            record_to_lua(&record),
            r#"{id=4,["end"]=1,endurance=2,floor=-math.huge,range=math.huge,ratio=0/0}"#
        );
    }

    #[test]
    fn test_collection_chunk() {
        let mut collection = RecordCollection::new("job_abilities");
        let mut b = Record::with_id(2);
        b.set("en", "Berserk");
        b.set("targets", 1);
        let mut a = Record::with_id(1);
        a.set("en", "Mighty Strikes");
        collection.extend([b, a, Record::new()]);

        let lua = to_lua(&collection);
        let expected = "-- Automatically generated file: Job Abilities\n\
                        \n\
                        return {\n    \
                        [1] = {id=1,en=\"Mighty Strikes\"},\n    \
                        [2] = {id=2,en=\"Berserk\",targets=1},\n\
                        }, {\"id\", \"en\", \"targets\"}\n";
        assert_eq!(lua, expected);
    }
}
