//! File backend
//!
//! The whole preference map lives in one JSON document:
//!
//! ```text
//! {"format":1,"checksum":<crc32>,"written_at":"<rfc3339>","entries":{"group__name":"raw",...}}
//! ```
//!
//! The checksum is CRC32 (IEEE) over the compact serialization of
//! `entries`. Writes go to a temp file, are fsynced, renamed over the
//! document, and the directory is fsynced. A missing document reads as an
//! empty map; a document that fails to parse or verify is corrupt and is
//! never treated as empty.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use super::backend::StorageBackend;
use super::errors::{StoreError, StoreResult};

/// Current document format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PreferenceDocument {
    format: u32,
    checksum: u32,
    written_at: String,
    entries: BTreeMap<String, String>,
}

/// Computes the document checksum over the canonical entry serialization.
pub fn compute_checksum(entries: &BTreeMap<String, String>) -> StoreResult<u32> {
    let bytes = serde_json::to_vec(entries)?;
    let mut hasher = Hasher::new();
    hasher.update(&bytes);
    Ok(hasher.finalize())
}

/// Single-document JSON file backend.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    /// Last durable contents; `None` until first read
    cache: Option<BTreeMap<String, String>>,
}

impl FileBackend {
    /// Backend for `<dir>/<file_name>`. Nothing is touched until first use.
    pub fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            path: dir.join(file_name),
            cache: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StoreResult<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::io_at_path(&self.path, e)),
        };

        let document: PreferenceDocument = serde_json::from_str(&content)
            .map_err(|e| StoreError::corrupt(&self.path, format!("invalid JSON: {}", e)))?;

        if document.format != FORMAT_VERSION {
            return Err(StoreError::corrupt(
                &self.path,
                format!("unsupported format version {}", document.format),
            ));
        }

        let actual = compute_checksum(&document.entries)?;
        if actual != document.checksum {
            return Err(StoreError::corrupt(
                &self.path,
                format!(
                    "checksum mismatch (stored {:08x}, computed {:08x})",
                    document.checksum, actual
                ),
            ));
        }

        Ok(document.entries)
    }

    fn write_document(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| StoreError::io_at_path(dir, e))?;
        }

        let document = PreferenceDocument {
            format: FORMAT_VERSION,
            checksum: compute_checksum(entries)?,
            written_at: Utc::now().to_rfc3339(),
            entries: entries.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&document)?;

        let tmp_path = self.path.with_extension("tmp");
        let mut file = File::create(&tmp_path).map_err(|e| StoreError::io_at_path(&tmp_path, e))?;
        file.write_all(&bytes)
            .map_err(|e| StoreError::io_at_path(&tmp_path, e))?;
        file.sync_all()
            .map_err(|e| StoreError::io(format!("fsync failed for '{}'", tmp_path.display()), e))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::io_at_path(&self.path, e))?;
        fsync_dir(dir)
    }

    fn cached(&mut self) -> StoreResult<BTreeMap<String, String>> {
        match &self.cache {
            Some(entries) => Ok(entries.clone()),
            None => self.read_document(),
        }
    }

    fn commit(&mut self, entries: BTreeMap<String, String>) -> StoreResult<()> {
        self.write_document(&entries)?;
        self.cache = Some(entries);
        Ok(())
    }
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> StoreResult<()> {
    let dir = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| StoreError::io_at_path(path, e))?;
    dir.sync_all()
        .map_err(|e| StoreError::io(format!("fsync directory failed: {}", path.display()), e))
}

#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> StoreResult<()> {
    Ok(())
}

impl StorageBackend for FileBackend {
    fn read_all(&mut self) -> StoreResult<BTreeMap<String, String>> {
        let entries = self.read_document()?;
        self.cache = Some(entries.clone());
        Ok(entries)
    }

    fn put(&mut self, key: &str, raw_value: &str) -> StoreResult<()> {
        let mut entries = self.cached()?;
        entries.insert(key.to_owned(), raw_value.to_owned());
        self.commit(entries)
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        let mut entries = self.cached()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.commit(entries)
    }

    fn replace_all(&mut self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        self.commit(entries.clone())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
