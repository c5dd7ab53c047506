//! Shared persistence state behind every bound entry.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::backend::{MemoryBackend, StorageBackend};
use super::errors::StoreResult;
use super::lock;

/// The backing medium plus the in-memory mirror of the raw map.
///
/// The mirror also holds raw values no schema slot claims; they are
/// preserved but inert.
pub(crate) struct StoreCore {
    backend: Mutex<Box<dyn StorageBackend>>,
    raw: Mutex<BTreeMap<String, String>>,
    ready: AtomicBool,
}

impl StoreCore {
    pub(crate) fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend: Mutex::new(backend),
            raw: Mutex::new(BTreeMap::new()),
            ready: AtomicBool::new(false),
        }
    }

    pub(crate) fn read_all(&self) -> StoreResult<BTreeMap<String, String>> {
        lock(&self.backend, "backend")?.read_all()
    }

    pub(crate) fn replace_all(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        lock(&self.backend, "backend")?.replace_all(entries)
    }

    /// Installs the post-migration raw map as the mirror.
    pub(crate) fn install(&self, entries: BTreeMap<String, String>) -> StoreResult<()> {
        *lock(&self.raw, "raw map")? = entries;
        Ok(())
    }

    /// Opens every bound entry for use. Set once the whole model is bound.
    pub(crate) fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Swaps the backing medium for an empty in-memory one.
    pub(crate) fn degrade(&self) -> StoreResult<()> {
        *lock(&self.backend, "backend")? = Box::new(MemoryBackend::new());
        self.install(BTreeMap::new())
    }

    /// Durably writes one raw value, then mirrors it.
    pub(crate) fn persist(&self, key: &str, raw_value: &str) -> StoreResult<()> {
        lock(&self.backend, "backend")?.put(key, raw_value)?;
        lock(&self.raw, "raw map")?.insert(key.to_owned(), raw_value.to_owned());
        Ok(())
    }

    /// Durably removes one raw value, then mirrors the removal.
    pub(crate) fn remove(&self, key: &str) -> StoreResult<()> {
        lock(&self.backend, "backend")?.remove(key)?;
        lock(&self.raw, "raw map")?.remove(key);
        Ok(())
    }

    pub(crate) fn raw_snapshot(&self) -> StoreResult<BTreeMap<String, String>> {
        Ok(lock(&self.raw, "raw map")?.clone())
    }

    pub(crate) fn raw_value(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(lock(&self.raw, "raw map")?.get(key).cloned())
    }

    pub(crate) fn describe(&self) -> String {
        lock(&self.backend, "backend")
            .map(|b| b.describe())
            .unwrap_or_else(|_| "poisoned".to_owned())
    }
}
