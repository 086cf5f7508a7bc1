//! Resolution of numeric file ids to DAT file contents.
//!
//! The client addresses every resource file by a numeric id. `FTABLE.DAT`
//! in the installation root maps each id to a packed `(directory, file)`
//! pair under `ROM/`. Expansion content lives in `ROM2/` to `ROM9/`, each
//! with its own `VTABLE{n}.DAT` (a byte per id marking the files it owns)
//! and `FTABLE{n}.DAT`.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::{Error, Result};

/// Highest expansion ROM directory index.
const MAX_ROM: u32 = 9;

/// A source of DAT files addressed by file id.
pub trait DatSource {
    /// Read the whole file with the given id.
    fn read(&self, file_id: u32) -> Result<Vec<u8>>;
}

impl<T: DatSource + ?Sized> DatSource for &T {
    fn read(&self, file_id: u32) -> Result<Vec<u8>> {
        (**self).read(file_id)
    }
}

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

/// File table of one ROM directory.
#[derive(Debug)]
struct RomTable {
    directory: String,
    ftable: Mmap,
    /// Ownership table; absent for the base directory.
    vtable: Option<Mmap>,
}

impl RomTable {
    fn owns(&self, file_id: u32) -> bool {
        match &self.vtable {
            Some(vtable) => vtable.get(file_id as usize).is_some_and(|&rom| rom != 0),
            None => true,
        }
    }

    fn entry(&self, file_id: u32) -> Option<u16> {
        let offset = file_id as usize * 2;
        let bytes = self.ftable.get(offset..offset + 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

/// A game installation directory.
#[derive(Debug)]
pub struct InstallDir {
    root: PathBuf,
    /// Expansion tables first, base table last.
    tables: Vec<RomTable>,
}

impl InstallDir {
    /// Open an installation directory and map its file tables.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let base = root.join("FTABLE.DAT");
        if !base.is_file() {
            return Err(Error::InstallDir(root));
        }

        let mut tables = Vec::new();
        for rom in (2..=MAX_ROM).rev() {
            let directory = format!("ROM{rom}");
            let vtable = root.join(&directory).join(format!("VTABLE{rom}.DAT"));
            let ftable = root.join(&directory).join(format!("FTABLE{rom}.DAT"));
            if vtable.is_file() && ftable.is_file() {
                tables.push(RomTable {
                    directory,
                    ftable: map_file(&ftable)?,
                    vtable: Some(map_file(&vtable)?),
                });
            }
        }
        tables.push(RomTable {
            directory: "ROM".to_string(),
            ftable: map_file(&base)?,
            vtable: None,
        });

        tracing::debug!(root = %root.display(), roms = tables.len(), "opened installation");
        Ok(Self { root, tables })
    }

    /// Installation root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the DAT file with the given id.
    pub fn resolve(&self, file_id: u32) -> Result<PathBuf> {
        let (table, entry) = self
            .tables
            .iter()
            .filter(|t| t.owns(file_id))
            .find_map(|t| t.entry(file_id).map(|e| (t, e)))
            .ok_or(Error::UnknownFileId(file_id))?;

        Ok(self
            .root
            .join(&table.directory)
            .join((entry >> 7).to_string())
            .join(format!("{}.DAT", entry & 0x7F)))
    }
}

impl DatSource for InstallDir {
    fn read(&self, file_id: u32) -> Result<Vec<u8>> {
        let path = self.resolve(file_id)?;
        tracing::trace!(file_id, path = %path.display(), "reading DAT file");
        std::fs::read(&path).map_err(|source| Error::Read {
            file_id,
            path,
            source,
        })
    }
}

/// In-memory DAT files.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<u32, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous contents.
    pub fn insert(&mut self, file_id: u32, data: impl Into<Vec<u8>>) {
        self.files.insert(file_id, data.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, file_id: u32, data: impl Into<Vec<u8>>) -> Self {
        self.insert(file_id, data);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DatSource for MemorySource {
    fn read(&self, file_id: u32) -> Result<Vec<u8>> {
        self.files
            .get(&file_id)
            .cloned()
            .ok_or(Error::UnknownFileId(file_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_table(path: &Path, entries: &[u16]) {
        let bytes: Vec<u8> = entries.iter().flat_map(|e| e.to_le_bytes()).collect();
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_resolve_base_table() {
        let dir = tempfile::tempdir().unwrap();
        write_table(&dir.path().join("FTABLE.DAT"), &[0, (1 << 7) | 5, (118 << 7) | 108]);

        let install = InstallDir::open(dir.path()).unwrap();
        assert_eq!(install.resolve(1).unwrap(), dir.path().join("ROM").join("1").join("5.DAT"));
        assert_eq!(install.resolve(2).unwrap(), dir.path().join("ROM").join("118").join("108.DAT"));
        assert!(matches!(install.resolve(3), Err(Error::UnknownFileId(3))));
    }

    #[test]
    fn test_resolve_expansion_table() {
        let dir = tempfile::tempdir().unwrap();
        write_table(&dir.path().join("FTABLE.DAT"), &[1, 2, 3]);
        let rom2 = dir.path().join("ROM2");
        std::fs::create_dir(&rom2).unwrap();
        std::fs::write(rom2.join("VTABLE2.DAT"), [0u8, 2, 0]).unwrap();
        write_table(&rom2.join("FTABLE2.DAT"), &[0, (3 << 7) | 1, 0]);

        let install = InstallDir::open(dir.path()).unwrap();
        assert_eq!(install.resolve(1).unwrap(), rom2.join("3").join("1.DAT"));
        assert_eq!(install.resolve(2).unwrap(), dir.path().join("ROM").join("0").join("3.DAT"));
    }

    #[test]
    fn test_read_files() {
        let dir = tempfile::tempdir().unwrap();
        write_table(&dir.path().join("FTABLE.DAT"), &[(1 << 7) | 2, (1 << 7) | 3]);
        std::fs::create_dir_all(dir.path().join("ROM").join("1")).unwrap();
        std::fs::write(dir.path().join("ROM").join("1").join("2.DAT"), b"abc").unwrap();

        let install = InstallDir::open(dir.path()).unwrap();
        assert_eq!(install.read(0).unwrap(), b"abc");
        assert!(matches!(install.read(1), Err(Error::Read { file_id: 1, .. })));
    }

    #[test]
    fn test_not_an_install_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(InstallDir::open(dir.path()), Err(Error::InstallDir(_))));
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with(0x51, vec![1, 2, 3]);
        assert_eq!(source.read(0x51).unwrap(), [1, 2, 3]);
        assert!(source.read(0x52).is_err());
        assert_eq!((&source).read(0x51).unwrap().len(), 3);
    }
}
