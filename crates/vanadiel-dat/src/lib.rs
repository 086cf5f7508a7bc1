//! DAT file parsers for Vanadiel.
//!
//! This crate decodes the binary formats found in the game's DAT files:
//!
//! - [`container`] - Block-structured containers holding ability and spell tables
//! - [`ability`], [`spell`], [`item`] - Obfuscated fixed-layout records
//! - [`dmsg`], [`dialog`], [`autotranslate`] - String tables
//! - [`detect`] - Format detection for string-table files
//!
//! Every parser takes a fully buffered byte slice and produces
//! [`vanadiel_model::Record`]s.
//!
//! # Example
//!
//! ```no_run
//! use vanadiel_dat::parse_dat;
//!
//! let data = std::fs::read("ROM/176/13.DAT")?;
//! for record in parse_dat(&data, &[(0, "en")])? {
//!     println!("{:?} {:?}", record.id(), record.get_str("en"));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;

pub mod ability;
pub mod autotranslate;
pub mod container;
pub mod detect;
pub mod dialog;
pub mod dmsg;
pub mod header;
pub mod item;
pub mod spell;
pub mod types;

pub use container::{walk, DataBlock, Walk};
pub use detect::{parse_dat, DatFormat};
pub use error::{Error, Result};
pub use item::parse_items;
pub use types::{AbilityType, MagicType};

/// Key mapped to field `index` in a field mapping.
pub fn field_name<'a>(fields: &[(usize, &'a str)], index: usize) -> Option<&'a str> {
    fields
        .iter()
        .find(|(i, _)| *i == index)
        .map(|(_, name)| *name)
}
