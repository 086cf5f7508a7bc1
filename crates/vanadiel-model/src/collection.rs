//! Record collections and the model that groups them.

use std::collections::BTreeMap;

use crate::{Error, Record, Result};

/// An ordered sequence of records for one resource category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordCollection {
    name: String,
    records: Vec<Record>,
}

impl RecordCollection {
    /// Create an empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Create a collection from existing records.
    pub fn from_records(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// Category name, e.g. `"items"`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record.
    #[inline]
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.records.iter_mut()
    }

    /// Borrow the records as a slice.
    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Record at a position.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Record at a position, mutably.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    /// Find the first record with the given id.
    pub fn get_by_id(&self, id: i64) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    /// Find the first record with the given id, mutably.
    pub fn get_by_id_mut(&mut self, id: i64) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id() == Some(id))
    }

    /// Keep only the records matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&Record) -> bool) {
        self.records.retain(keep);
    }

    /// Remove and return the records matching `take`, preserving order on both sides.
    pub fn extract_if(&mut self, mut take: impl FnMut(&Record) -> bool) -> Vec<Record> {
        let (taken, kept) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| take(r));
        self.records = kept;
        taken
    }

    /// Sort by id. Records without an id sort first.
    pub fn sort_by_id(&mut self) {
        self.records.sort_by_key(|r| r.id());
    }
}

impl IntoIterator for RecordCollection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Extend<Record> for RecordCollection {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

/// All record collections decoded in one run, keyed by category name.
///
/// The model is threaded explicitly through every parsing and
/// post-processing step.
#[derive(Debug, Clone, Default)]
pub struct Model {
    collections: BTreeMap<String, RecordCollection>,
}

impl Model {
    /// Create a model with an empty collection for each name.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let collections = names
            .into_iter()
            .map(|name| (name.to_owned(), RecordCollection::new(name)))
            .collect();
        Self { collections }
    }

    /// Get a collection by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&RecordCollection> {
        self.collections.get(name)
    }

    /// Get a collection by name, failing if it does not exist.
    pub fn require(&self, name: &str) -> Result<&RecordCollection> {
        self.get(name)
            .ok_or_else(|| Error::MissingCollection(name.to_owned()))
    }

    /// Get a collection mutably, creating it if needed.
    pub fn collection_mut(&mut self, name: &str) -> &mut RecordCollection {
        self.collections
            .entry(name.to_owned())
            .or_insert_with(|| RecordCollection::new(name))
    }

    /// Insert a collection, replacing one with the same name.
    pub fn insert(&mut self, collection: RecordCollection) -> Option<RecordCollection> {
        self.collections
            .insert(collection.name().to_owned(), collection)
    }

    /// Remove a collection.
    pub fn remove(&mut self, name: &str) -> Option<RecordCollection> {
        self.collections.remove(name)
    }

    /// Iterate collections in name order.
    pub fn iter(&self) -> impl Iterator<Item = &RecordCollection> {
        self.collections.values()
    }

    /// Collection names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creates_named_collections() {
        let mut model = Model::new(["items", "spells"]);
        assert!(model.get("items").unwrap().is_empty());
        assert!(model.require("zones").is_err());

        model.collection_mut("zones").push(Record::with_id(1));
        assert_eq!(model.require("zones").unwrap().len(), 1);
        assert_eq!(model.names().collect::<Vec<_>>(), ["items", "spells", "zones"]);
    }

    #[test]
    fn test_extract_if_partitions() {
        let mut collection =
            RecordCollection::from_records("abilities", (0..6).map(Record::with_id).collect());
        let taken = collection.extract_if(|r| r.id().unwrap_or(0) % 2 == 0);

        assert_eq!(taken.iter().filter_map(Record::id).collect::<Vec<_>>(), [0, 2, 4]);
        assert_eq!(collection.iter().filter_map(Record::id).collect::<Vec<_>>(), [1, 3, 5]);
    }

    #[test]
    fn test_get_by_id() {
        let mut collection = RecordCollection::new("items");
        collection.push(Record::with_id(10));
        collection.get_by_id_mut(10).unwrap().set("en", "Pebble");
        assert_eq!(collection.get_by_id(10).unwrap().get_str("en"), Some("Pebble"));
        assert!(collection.get_by_id(11).is_none());
    }
}
