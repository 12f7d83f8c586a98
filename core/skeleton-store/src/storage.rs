//! FILENAME: core/skeleton-store/src/storage.rs
//! PURPOSE: Loads and saves the library snapshot as one JSON file.
//! CONTEXT: Writes go to a sibling temp file which is then renamed over the
//! target, so a crash mid-write never leaves a truncated library behind.

use crate::error::StoreError;
use crate::model::{LibrarySnapshot, STORAGE_VERSION};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot. A missing file is an empty library.
    pub fn load(&self) -> Result<LibrarySnapshot, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LibrarySnapshot::default()),
            Err(e) => return Err(e.into()),
        };

        let snapshot: LibrarySnapshot = serde_json::from_slice(&bytes)?;
        if snapshot.version > STORAGE_VERSION {
            return Err(StoreError::InvalidFormat(format!(
                "storage version {} is newer than supported version {}",
                snapshot.version, STORAGE_VERSION
            )));
        }
        Ok(snapshot)
    }

    /// Replaces the file with `snapshot`. Last write wins.
    pub fn save(&self, snapshot: &LibrarySnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&serde_json::to_vec(snapshot)?)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "library.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
