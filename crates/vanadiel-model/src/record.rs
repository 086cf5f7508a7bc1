//! String-keyed attribute bags.

use std::collections::BTreeMap;

use crate::Value;

/// Prefix marking diagnostic fields that are kept for analysis but never emitted.
pub const DIAGNOSTIC_PREFIX: char = '_';

/// Whether `key` names a diagnostic field.
#[inline]
pub fn is_diagnostic(key: &str) -> bool {
    key.starts_with(DIAGNOSTIC_PREFIX)
}

/// One decoded logical entity: an item, a spell, a string table entry.
///
/// Keys are introduced by whichever parser decodes the entity. Within one
/// collection the `id` key, when present, identifies the entity across the
/// files that contribute to it.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record holding only an `id`.
    pub fn with_id(id: i64) -> Self {
        let mut record = Self::new();
        record.set("id", id);
        record
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a field mutably.
    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    /// Set a field, replacing any previous value.
    #[inline]
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Set a field only when `value` is non-zero.
    pub fn set_nonzero<T>(&mut self, key: &str, value: T)
    where
        T: Into<Value> + Default + PartialEq,
    {
        if value != T::default() {
            self.set(key, value);
        }
    }

    /// Remove a field, returning its value.
    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Whether a field is present.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Copy every field of `other` into `self`. Fields of `other` win on collision.
    pub fn merge(&mut self, other: Record) {
        self.fields.extend(other.fields);
    }

    /// The entity id, if present and integral.
    #[inline]
    pub fn id(&self) -> Option<i64> {
        self.get_int("id")
    }

    /// Get an integer field.
    #[inline]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    /// Get a float field. Integers widen.
    #[inline]
    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_float)
    }

    /// Get a string field.
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Iterate fields in key order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate field names in key order.
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// A copy without diagnostic fields.
    pub fn public(&self) -> Record {
        Record {
            fields: self
                .fields
                .iter()
                .filter(|(k, _)| !is_diagnostic(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let mut record = Record::with_id(12);
        record.set("en", "Cure");
        assert_eq!(record.id(), Some(12));
        assert_eq!(record.get_str("en"), Some("Cure"));
        assert!(record.contains("en"));

        assert_eq!(record.remove("en"), Some(Value::from("Cure")));
        assert!(!record.contains("en"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut a: Record = [("id", Value::from(1)), ("en", Value::from("Fire"))]
            .into_iter()
            .collect();
        let b: Record = [("id", Value::from(1)), ("en", Value::from("Fire II")), ("ja", Value::from("ファイア"))]
            .into_iter()
            .collect();

        a.merge(b);
        assert_eq!(a.get_str("en"), Some("Fire II"));
        assert_eq!(a.get_str("ja"), Some("ファイア"));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_set_nonzero() {
        let mut record = Record::new();
        record.set_nonzero("level", 0u16);
        record.set_nonzero("jobs", 0x1Eu32);
        assert!(!record.contains("level"));
        assert_eq!(record.get_int("jobs"), Some(0x1E));
    }

    #[test]
    fn test_public_drops_diagnostics() {
        let mut record = Record::with_id(5);
        record.set("_unknown1", 3);
        let public = record.public();
        assert!(!public.contains("_unknown1"));
        assert_eq!(public.id(), Some(5));
    }
}
