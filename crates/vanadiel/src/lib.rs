//! Vanadiel - Final Fantasy XI resource extraction library.
//!
//! This crate ties the Vanadiel crates together into the extraction
//! pipeline: it locates DAT files in an installation, decodes them and
//! writes the resulting collections as Lua and JSON.
//!
//! # Crates
//!
//! - [`vanadiel_common`] - Binary reading, record obfuscation and game text
//! - [`vanadiel_model`] - Dynamic records, merging, fixes and emitters
//! - [`vanadiel_dat`] - Container walker, record and string table parsers
//! - [`vanadiel_image`] - Bitmap and DXT image decoding
//!
//! # Example
//!
//! ```no_run
//! use vanadiel::prelude::*;
//!
//! let install = InstallDir::open("C:/Program Files/PlayOnline/SquareEnix/FINAL FANTASY XI")?;
//! let (model, report) = Extractor::new(&install).run();
//!
//! for failure in report.failures() {
//!     eprintln!("{} failed", failure.step);
//! }
//! write_model(&model, "resources", &[OutputFormat::Lua])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod extract;
mod maps;
mod output;
mod source;

pub mod files;

pub use vanadiel_common as common;
pub use vanadiel_dat as dat;
pub use vanadiel_image as images;
pub use vanadiel_model as model;

pub use error::{Error, Result};
pub use extract::{Extractor, Report, Step, StepReport, JOB_ABILITY_OFFSET};
pub use maps::{MapEntry, MapExtractor};
pub use output::{write_model, OutputFormat};
pub use source::{DatSource, InstallDir, MemorySource};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        write_model, DatSource, Extractor, InstallDir, MapExtractor, MemorySource, OutputFormat,
        Report, Step,
    };
    pub use vanadiel_dat::{parse_dat, walk, DatFormat};
    pub use vanadiel_image::{parse_image, Image};
    pub use vanadiel_model::{Model, Record, RecordCollection, Value};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
