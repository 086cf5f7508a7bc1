//! Declarative overlay of manual corrections.
//!
//! A fixes document names collections and lists nested `update` elements:
//!
//! ```xml
//! <fixes>
//!     <spells>
//!         <update key="1">
//!             <update key="en" value="Cure"/>
//!             <update key="levels">
//!                 <update key="3" value="1" type="int"/>
//!             </update>
//!         </update>
//!     </spells>
//! </fixes>
//! ```
//!
//! At collection level `key` is a record id; inside a record it is a field
//! name; inside a `type="list"` element it is a list index.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{Error, Model, Record, RecordCollection, Result, Value};

/// Element name for a single correction.
const UPDATE: &str = "update";

#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Node {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn updates(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|c| c.name == UPDATE)
    }
}

fn start_node(e: &BytesStart<'_>) -> Result<Node> {
    let mut node = Node {
        name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        ..Node::default()
    };

    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        node.attributes.push((key, value));
    }

    Ok(node)
}

fn parse_document(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(start_node(&e)?),
            Ok(Event::Empty(e)) => {
                let node = start_node(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Ok(Event::End(_)) => {
                if let Some(node) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::Xml(format!("XML parse error: {}", e))),
        }
    }

    root.ok_or_else(|| Error::Xml("no root element found".to_string()))
}

/// Convert an attribute value according to its declared type.
fn convert(value: &str, kind: Option<&str>, target: &str) -> Result<Value> {
    let invalid = |reason: String| Error::InvalidFix {
        target: target.to_owned(),
        reason,
    };

    match kind {
        None | Some("string") => Ok(Value::String(value.to_owned())),
        Some("bool") => value
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|e| invalid(format!("{value:?}: {e}"))),
        Some("sbyte" | "short" | "int" | "long" | "byte" | "ushort" | "uint" | "ulong") => value
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| invalid(format!("{value:?}: {e}"))),
        Some("float" | "double" | "decimal") => value
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| invalid(format!("{value:?}: {e}"))),
        Some(other) => Err(invalid(format!("unknown value type {other:?}"))),
    }
}

fn apply_collection(collection: &mut RecordCollection, node: &Node) -> Result<usize> {
    let mut applied = 0;

    for update in node.updates() {
        let target = collection.name().to_owned();
        let key = update.attr("key").ok_or_else(|| Error::InvalidFix {
            target: target.clone(),
            reason: "update without key".to_string(),
        })?;
        let id: i64 = key.parse().map_err(|_| Error::InvalidFix {
            target: target.clone(),
            reason: format!("record key {key:?} is not an id"),
        })?;

        if update.attr("value").is_some() {
            return Err(Error::InvalidFix {
                target,
                reason: format!("record {id} cannot be replaced by a scalar"),
            });
        }

        if collection.get_by_id(id).is_none() {
            collection.push(Record::with_id(id));
        }
        if let Some(record) = collection.get_by_id_mut(id) {
            applied += apply_record(record, update, &format!("{target}[{id}]"))?;
        }
    }

    Ok(applied)
}

fn apply_record(record: &mut Record, node: &Node, path: &str) -> Result<usize> {
    let mut applied = 0;

    for update in node.updates() {
        let Some(key) = update.attr("key") else {
            continue;
        };
        let path = format!("{path}.{key}");
        let kind = update.attr("type");

        if let Some(value) = update.attr("value") {
            record.set(key, convert(value, kind, &path)?);
            applied += 1;
        } else if !update.children.is_empty() {
            let slot = container_slot(record.get(key), kind, &path)?;
            if let Some(fresh) = slot {
                record.set(key, fresh);
            }
            if let Some(current) = record.get_mut(key) {
                applied += apply_nested(current, update, &path)?;
            }
        }
    }

    Ok(applied)
}

fn apply_list(list: &mut Vec<Value>, node: &Node, path: &str) -> Result<usize> {
    let mut applied = 0;

    for update in node.updates() {
        let Some(key) = update.attr("key") else {
            continue;
        };
        let index: usize = key.parse().map_err(|_| Error::InvalidFix {
            target: path.to_owned(),
            reason: format!("list key {key:?} is not an index"),
        })?;
        let path = format!("{path}[{index}]");
        let kind = update.attr("type");

        if let Some(value) = update.attr("value") {
            let value = convert(value, kind, &path)?;
            match list.get_mut(index) {
                Some(slot) => *slot = value,
                None => list.push(value),
            }
            applied += 1;
        } else if !update.children.is_empty() {
            let position = index.min(list.len());
            let slot = container_slot(list.get(position), kind, &path)?;
            if let Some(fresh) = slot {
                match list.get_mut(position) {
                    Some(existing) => *existing = fresh,
                    None => list.push(fresh),
                }
            }
            if let Some(current) = list.get_mut(position) {
                applied += apply_nested(current, update, &path)?;
            }
        }
    }

    Ok(applied)
}

/// Decide whether a nested update needs a fresh container at its slot.
///
/// Lists replace anything that is not already a list. Maps are only created
/// when the slot is empty; an existing scalar is an error.
fn container_slot(current: Option<&Value>, kind: Option<&str>, path: &str) -> Result<Option<Value>> {
    match (kind, current) {
        (Some("list"), Some(Value::List(_))) => Ok(None),
        (Some("list"), _) => Ok(Some(Value::List(Vec::new()))),
        (_, None) => Ok(Some(Value::Map(Record::new()))),
        (_, Some(Value::Map(_))) => Ok(None),
        (_, Some(other)) => Err(Error::InvalidFix {
            target: path.to_owned(),
            reason: format!("cannot update fields of a {:?} value", other.kind()),
        }),
    }
}

fn apply_nested(current: &mut Value, node: &Node, path: &str) -> Result<usize> {
    match current {
        Value::List(list) => apply_list(list, node, path),
        Value::Map(map) => apply_record(map, node, path),
        _ => Ok(0),
    }
}

/// Apply a fixes document to the model. Returns the number of values set.
pub fn apply_fixes(model: &mut Model, xml: &str) -> Result<usize> {
    let root = parse_document(xml)?;
    let mut applied = 0;

    for set in &root.children {
        let count = apply_collection(model.collection_mut(&set.name), set)?;
        tracing::debug!(collection = %set.name, count, "applied fixes");
        applied += count;
    }

    Ok(applied)
}

/// Read and apply a fixes file.
pub fn apply_fixes_file(model: &mut Model, path: impl AsRef<Path>) -> Result<usize> {
    let xml = std::fs::read_to_string(path)?;
    apply_fixes(model, &xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Model {
        let mut model = Model::new(["spells"]);
        let mut cure = Record::with_id(1);
        cure.set("en", "Cuer");
        cure.set("mp_cost", 8);
        model.collection_mut("spells").push(cure);
        model
    }

    #[test]
    fn test_update_existing_field() {
        let mut model = model();
        let applied = apply_fixes(
            &mut model,
            r#"<fixes><spells><update key="1"><update key="en" value="Cure"/></update></spells></fixes>"#,
        )
        .unwrap();

        assert_eq!(applied, 1);
        let cure = model.require("spells").unwrap().get_by_id(1).unwrap();
        assert_eq!(cure.get_str("en"), Some("Cure"));
        assert_eq!(cure.get_int("mp_cost"), Some(8));
    }

    #[test]
    fn test_typed_values_and_new_record() {
        let mut model = model();
        apply_fixes(
            &mut model,
            r#"<fixes>
                <spells>
                    <update key="2">
                        <update key="mp_cost" value="24" type="int"/>
                        <update key="cast_time" value="2.5" type="float"/>
                        <update key="unlearnable" value="true" type="bool"/>
                    </update>
                </spells>
            </fixes>"#,
        )
        .unwrap();

        let spell = model.require("spells").unwrap().get_by_id(2).unwrap();
        assert_eq!(spell.get_int("mp_cost"), Some(24));
        assert_eq!(spell.get_float("cast_time"), Some(2.5));
        assert_eq!(spell.get("unlearnable"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_nested_map_and_list() {
        let mut model = model();
        apply_fixes(
            &mut model,
            r#"<fixes>
                <spells>
                    <update key="1">
                        <update key="levels">
                            <update key="3" value="1" type="int"/>
                        </update>
                        <update key="aliases" type="list">
                            <update key="0" value="cure1"/>
                            <update key="5" value="c1"/>
                        </update>
                    </update>
                </spells>
            </fixes>"#,
        )
        .unwrap();

        let cure = model.require("spells").unwrap().get_by_id(1).unwrap();
        let levels = cure.get("levels").and_then(Value::as_map).unwrap();
        assert_eq!(levels.get_int("3"), Some(1));

        let aliases = cure.get("aliases").and_then(Value::as_list).unwrap();
        assert_eq!(aliases, [Value::from("cure1"), Value::from("c1")]);
    }

    #[test]
    fn test_errors() {
        let mut model = model();
        assert!(matches!(
            apply_fixes(&mut model, r#"<fixes><spells><update key="x"/></spells></fixes>"#),
            Err(Error::InvalidFix { .. })
        ));
        assert!(matches!(
            apply_fixes(
                &mut model,
                r#"<fixes><spells><update key="1"><update key="mp_cost" value="lots" type="int"/></update></spells></fixes>"#
            ),
            Err(Error::InvalidFix { .. })
        ));
        assert!(matches!(
            apply_fixes(
                &mut model,
                r#"<fixes><spells><update key="1"><update key="en"><update key="x" value="y"/></update></update></spells></fixes>"#
            ),
            Err(Error::InvalidFix { .. })
        ));
        assert!(apply_fixes(&mut model, "").is_err());
    }
}
