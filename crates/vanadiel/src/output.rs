//! Writing extracted collections to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use vanadiel_model::{json, lua, Model, RecordCollection};

use crate::Result;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Lua,
    Json,
}

impl OutputFormat {
    /// File extension, also used as the output subdirectory.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Lua => "lua",
            OutputFormat::Json => "json",
        }
    }
}

fn write_collection(collection: &RecordCollection, path: &Path, format: OutputFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Lua => lua::write_lua(&mut writer, collection)?,
        OutputFormat::Json => json::write_json(&mut writer, collection)?,
    }
    writer.flush()?;
    Ok(())
}

/// Write every collection of `model` as `<dir>/<ext>/<name>.<ext>` for each format.
///
/// Returns the paths written.
pub fn write_model(model: &Model, dir: impl AsRef<Path>, formats: &[OutputFormat]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for &format in formats {
        let subdir = dir.as_ref().join(format.extension());
        fs::create_dir_all(&subdir)?;

        for collection in model.iter() {
            let path = subdir.join(format!("{}.{}", collection.name(), format.extension()));
            write_collection(collection, &path, format)?;
            tracing::debug!(path = %path.display(), records = collection.len(), "wrote collection");
            written.push(path);
        }
    }

    Ok(written)
}
