//! Dynamic record model for Vanadiel.
//!
//! Every parser produces [`Record`]s: string-keyed bags of [`Value`]s. Records
//! for one resource category live in a [`RecordCollection`], and all
//! collections of one run live in a [`Model`].
//!
//! - [`merge`] - Joins records decoded from parallel files by `id`
//! - [`transform`] - Name validation, category splitting, cross-references
//! - [`fixes`] - Declarative XML overlay of manual corrections
//! - [`lua`] - Lua table emitter
//! - [`json`] - JSON emitter
//!
//! # Example
//!
//! ```
//! use vanadiel_model::{merge::merge_by_id, Record, RecordCollection};
//!
//! let mut spells = RecordCollection::new("spells");
//! let mut cure = Record::with_id(1);
//! cure.set("mp_cost", 8);
//! spells.push(cure);
//!
//! let mut name = Record::with_id(1);
//! name.set("en", "Cure");
//! merge_by_id(&mut spells, [name]);
//!
//! assert_eq!(spells.get_by_id(1).unwrap().get_str("en"), Some("Cure"));
//! ```

mod collection;
mod error;
mod record;
mod value;

pub mod lua;
pub mod merge;
pub mod transform;

#[cfg(feature = "fixes")]
pub mod fixes;

#[cfg(feature = "json-export")]
pub mod json;

pub use collection::{Model, RecordCollection};
pub use error::{Error, Result};
pub use record::{is_diagnostic, Record, DIAGNOSTIC_PREFIX};
pub use value::{Value, ValueKind};
