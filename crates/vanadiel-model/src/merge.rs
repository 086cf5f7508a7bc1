//! Reconciliation of records decoded from parallel files.
//!
//! The same entity is usually spread across several files: numeric data in
//! one, English names in another, Japanese names in a third. Merging joins
//! them on `id`, with later files overwriting earlier ones per key.

use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::{Record, RecordCollection};

type FxHashMap<K, V> = FastHashMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

/// Counts from one merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Incoming records folded into an existing record.
    pub merged: usize,
    /// Incoming records appended as new entities.
    pub appended: usize,
}

/// Merge `incoming` into `target` by id.
///
/// An incoming record whose id already exists in `target` is merged into the
/// first record with that id; its values win on key collision. Records with
/// a new id, or without an id, are appended in order.
pub fn merge_by_id(
    target: &mut RecordCollection,
    incoming: impl IntoIterator<Item = Record>,
) -> MergeStats {
    let mut index: FxHashMap<i64, usize> = FxHashMap::default();
    for (position, record) in target.iter().enumerate() {
        if let Some(id) = record.id() {
            index.entry(id).or_insert(position);
        }
    }

    let mut stats = MergeStats::default();
    for record in incoming {
        match record.id().and_then(|id| index.get(&id).copied()) {
            Some(position) => {
                if let Some(existing) = target.get_mut(position) {
                    existing.merge(record);
                    stats.merged += 1;
                }
            }
            None => {
                if let Some(id) = record.id() {
                    index.insert(id, target.len());
                }
                target.push(record);
                stats.appended += 1;
            }
        }
    }

    tracing::trace!(
        collection = target.name(),
        merged = stats.merged,
        appended = stats.appended,
        "merged records by id"
    );

    stats
}

/// Fold several partial collections into one, in order.
pub fn merge_all(
    name: &str,
    parts: impl IntoIterator<Item = Vec<Record>>,
) -> RecordCollection {
    let mut merged = RecordCollection::new(name);
    for part in parts {
        merge_by_id(&mut merged, part);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn record(id: i64, fields: &[(&str, Value)]) -> Record {
        let mut r = Record::with_id(id);
        for (k, v) in fields {
            r.set(*k, v.clone());
        }
        r
    }

    #[test]
    fn test_merge_union_second_wins() {
        let mut target = RecordCollection::from_records(
            "spells",
            vec![record(1, &[("mp_cost", 8.into()), ("en", "Cure".into())])],
        );
        let stats = merge_by_id(
            &mut target,
            vec![record(1, &[("en", "Cure (v2)".into()), ("ja", "ケアル".into())])],
        );

        assert_eq!(stats, MergeStats { merged: 1, appended: 0 });
        let merged = target.get_by_id(1).unwrap();
        assert_eq!(merged.get_int("mp_cost"), Some(8));
        assert_eq!(merged.get_str("en"), Some("Cure (v2)"));
        assert_eq!(merged.get_str("ja"), Some("ケアル"));
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_merge_appends_new_ids() {
        let mut target = RecordCollection::from_records("zones", vec![Record::with_id(1)]);
        let stats = merge_by_id(
            &mut target,
            vec![Record::with_id(2), Record::new(), Record::with_id(2)],
        );

        assert_eq!(stats, MergeStats { merged: 1, appended: 2 });
        assert_eq!(target.len(), 3);
    }

    #[test]
    fn test_merge_all_in_order() {
        let collection = merge_all(
            "buffs",
            [
                vec![record(3, &[("en", "Poison".into())])],
                vec![record(3, &[("ja", "毒".into())])],
                vec![record(3, &[("en", "poison".into())])],
            ],
        );

        assert_eq!(collection.len(), 1);
        let buff = collection.get_by_id(3).unwrap();
        assert_eq!(buff.get_str("en"), Some("poison"));
        assert_eq!(buff.get_str("ja"), Some("毒"));
    }
}
