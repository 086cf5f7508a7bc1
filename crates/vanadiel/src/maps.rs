//! Map image extraction.
//!
//! A lookup file lists the image file of every zone map as
//! `{"<zone>": {"<map>": <file id>}}`. Each image is decoded opaque and
//! saved as `<zone>_<map>.png`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use vanadiel_image::{parse_image, Image};

use crate::{DatSource, Error, Result};

/// One map image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub zone: String,
    pub map: String,
    pub file_id: u32,
}

impl MapEntry {
    pub fn file_name(&self) -> String {
        format!("{}_{}.png", self.zone, self.map)
    }
}

/// Decodes the map images listed in a lookup table.
#[derive(Debug)]
pub struct MapExtractor<S> {
    source: S,
    entries: Vec<MapEntry>,
}

impl<S: DatSource> MapExtractor<S> {
    /// Parse a lookup table from JSON text.
    pub fn from_json(source: S, json: &str) -> Result<Self> {
        let lut: BTreeMap<String, BTreeMap<String, u32>> = serde_json::from_str(json)?;
        let entries = lut
            .into_iter()
            .flat_map(|(zone, maps)| {
                maps.into_iter().map(move |(map, file_id)| MapEntry {
                    zone: zone.clone(),
                    map,
                    file_id,
                })
            })
            .collect();

        Ok(Self { source, entries })
    }

    /// Read the lookup table at `path`.
    pub fn open(source: S, path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(source, &json)
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    pub fn decode(&self, entry: &MapEntry) -> Result<Image> {
        let data = self.source.read(entry.file_id)?;
        Ok(parse_image(&data, true)?)
    }

    /// Decode `entry` and write it as a PNG under `dir`.
    pub fn save(&self, entry: &MapEntry, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let decoded = self.decode(entry)?;
        let (width, height) = (decoded.width, decoded.height);
        let buffer = RgbaImage::from_raw(width, height, decoded.pixels).ok_or_else(|| {
            Error::Image(vanadiel_image::Error::InvalidHeader(format!(
                "pixel buffer does not fit {width}x{height}"
            )))
        })?;

        let path = dir.as_ref().join(entry.file_name());
        buffer.save_with_format(&path, ImageFormat::Png)?;
        tracing::debug!(zone = %entry.zone, map = %entry.map, width, height, "saved map");
        Ok(path)
    }
}
