//! Post-load transformations over the model.

use hashbrown::HashSet;
use rustc_hash::FxHasher;

use crate::{Model, Record, RecordCollection, Result};

type FxHashSet<T> = HashSet<T, std::hash::BuildHasherDefault<FxHasher>>;

/// Whether `value` is a usable display name: present, not blank, not ignored.
pub fn is_valid_name(value: Option<&str>, ignore: &[&str]) -> bool {
    match value {
        Some(name) => !name.trim().is_empty() && !ignore.contains(&name),
        None => false,
    }
}

/// Drop records where any of `keys` is not a valid name.
///
/// Returns the number of records removed.
pub fn retain_valid_names(collection: &mut RecordCollection, keys: &[&str], ignore: &[&str]) -> usize {
    let before = collection.len();
    collection.retain(|r| keys.iter().all(|k| is_valid_name(r.get_str(k), ignore)));
    let removed = before - collection.len();

    tracing::debug!(collection = collection.name(), removed, "dropped records without valid names");
    removed
}

/// Remove `keys` from every record.
pub fn strip_fields(collection: &mut RecordCollection, keys: &[&str]) {
    for record in collection.iter_mut() {
        for key in keys {
            record.remove(key);
        }
    }
}

/// Move the records of `source` matching `predicate` into the collection `target`.
///
/// `remap` rewrites each moved id. The target collection is created when
/// missing and receives records in their original order. Returns the number
/// of records moved.
pub fn split_by(
    model: &mut Model,
    source: &str,
    target: &str,
    predicate: impl Fn(&Record) -> bool,
    remap: impl Fn(i64) -> i64,
) -> Result<usize> {
    model.require(source)?;

    let mut moved = model.collection_mut(source).extract_if(|r| predicate(r));
    for record in &mut moved {
        if let Some(id) = record.id() {
            record.set("id", remap(id));
        }
    }

    let count = moved.len();
    model.collection_mut(target).extend(moved);

    tracing::debug!(source, target, count, "split collection");
    Ok(count)
}

/// Build `target` as a map from each record's `link_key` to its id and name.
///
/// Records are scanned in id order and the first record for a link value
/// wins. The resulting records use the link value as their `id` and carry
/// `ability_id` and `en` from the source record.
pub fn cross_reference(
    model: &mut Model,
    source: &str,
    link_key: &str,
    target: &str,
) -> Result<usize> {
    let mut sources: Vec<&Record> = model.require(source)?.iter().collect();
    sources.sort_by_key(|r| r.id());

    let mut seen: FxHashSet<i64> = FxHashSet::default();
    let mut links = RecordCollection::new(target);
    for record in sources {
        let Some(link) = record.get_int(link_key) else {
            continue;
        };
        if !seen.insert(link) {
            continue;
        }

        let mut entry = Record::with_id(link);
        if let Some(id) = record.id() {
            entry.set("ability_id", id);
        }
        if let Some(name) = record.get_str("en") {
            entry.set("en", name);
        }
        links.push(entry);
    }

    let count = links.len();
    model.insert(links);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: i64, en: &str) -> Record {
        let mut r = Record::with_id(id);
        r.set("en", en);
        r
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name(Some("Cure"), &["."]));
        assert!(!is_valid_name(Some("."), &["."]));
        assert!(!is_valid_name(Some("   "), &[]));
        assert!(!is_valid_name(None, &[]));
    }

    #[test]
    fn test_retain_valid_names() {
        let mut collection = RecordCollection::from_records(
            "buffs",
            vec![named(0, "(None)"), named(1, "Poison"), Record::with_id(2), named(3, "(Imagery)")],
        );
        let removed = retain_valid_names(&mut collection, &["en"], &[".", "(None)", "(Imagery)"]);

        assert_eq!(removed, 3);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(0).unwrap().id(), Some(1));
    }

    #[test]
    fn test_split_with_remap() {
        let mut model = Model::new(["abilities"]);
        model
            .collection_mut("abilities")
            .extend([named(0x10, "Fast Blade"), named(0x210, "Provoke"), named(0x211, "Berserk")]);

        let moved = split_by(&mut model, "abilities", "job_abilities", |r| r.id() >= Some(0x200), |id| id - 0x200).unwrap();
        assert_eq!(moved, 2);

        let jas = model.require("job_abilities").unwrap();
        assert_eq!(jas.iter().filter_map(Record::id).collect::<Vec<_>>(), [0x10, 0x11]);
        assert_eq!(model.require("abilities").unwrap().len(), 1);

        assert!(split_by(&mut model, "missing", "x", |_| true, |id| id).is_err());
    }

    #[test]
    fn test_strip_fields() {
        let mut collection = RecordCollection::from_records("spells", vec![named(1, "Cure")]);
        collection.get_mut(0).unwrap().set("_aoe_shape", 2);
        strip_fields(&mut collection, &["_aoe_shape"]);
        assert!(!collection.get(0).unwrap().contains("_aoe_shape"));
    }

    #[test]
    fn test_cross_reference_first_wins() {
        let mut model = Model::new(["job_abilities"]);
        let mut a = named(5, "Provoke");
        a.set("recast_id", 5);
        let mut b = named(3, "Provoke (alt)");
        b.set("recast_id", 5);
        let mut c = named(7, "Berserk");
        c.set("recast_id", 1);
        model.collection_mut("job_abilities").extend([a, b, c]);

        let count = cross_reference(&mut model, "job_abilities", "recast_id", "ability_recasts").unwrap();
        assert_eq!(count, 2);

        let recasts = model.require("ability_recasts").unwrap();
        let provoke = recasts.get_by_id(5).unwrap();
        assert_eq!(provoke.get_int("ability_id"), Some(3));
        assert_eq!(provoke.get_str("en"), Some("Provoke (alt)"));
    }

    #[test]
    fn test_cross_reference_many_sources() {
        let mut model = Model::new(["job_abilities"]);
        model.collection_mut("job_abilities").extend((1..=5000).rev().map(|id| {
            let mut r = named(id, "Ability");
            r.set("recast_id", id % 40);
            r
        }));

        let count = cross_reference(&mut model, "job_abilities", "recast_id", "ability_recasts").unwrap();
        assert_eq!(count, 40);

        let recasts = model.require("ability_recasts").unwrap();
        assert_eq!(recasts.get_by_id(0).unwrap().get_int("ability_id"), Some(40));
        assert_eq!(recasts.get_by_id(7).unwrap().get_int("ability_id"), Some(7));
    }
}
