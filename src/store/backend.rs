//! Storage backends: the pluggable string key-value sink under the store.

use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use super::errors::{StoreError, StoreResult};
use super::lock;

/// A flat string-to-string persistence medium.
///
/// Implementations must make each call durable before returning `Ok`.
pub trait StorageBackend: Send {
    /// Reads every persisted entry.
    fn read_all(&mut self) -> StoreResult<BTreeMap<String, String>>;

    /// Writes or overwrites one entry.
    fn put(&mut self, key: &str, raw_value: &str) -> StoreResult<()>;

    /// Removes one entry. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;

    /// Replaces the full contents.
    fn replace_all(&mut self, entries: &BTreeMap<String, String>) -> StoreResult<()>;

    /// Short backend label for logs
    fn describe(&self) -> String;
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-process backend.
///
/// Cloning yields another handle to the same map, which lets callers
/// inspect what a store persisted. Reads and writes can be made to fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-populated with entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let backend = Self::new();
        if let Ok(mut state) = backend.state.lock() {
            state.entries = entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect();
        }
        backend
    }

    /// Makes subsequent reads fail with an I/O error
    pub fn set_fail_reads(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_reads = fail;
        }
    }

    /// Makes subsequent writes fail with an I/O error
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_writes = fail;
        }
    }

    /// Current persisted contents
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.state
            .lock()
            .map(|s| s.entries.clone())
            .unwrap_or_default()
    }

    /// Number of successful write calls
    pub fn write_count(&self) -> usize {
        self.state.lock().map(|s| s.writes).unwrap_or(0)
    }

    fn write<F>(&mut self, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut state = lock(&self.state, "memory backend")?;
        if state.fail_writes {
            return Err(StoreError::io(
                "memory backend write",
                io::Error::new(io::ErrorKind::Other, "writes disabled"),
            ));
        }
        f(&mut state.entries);
        state.writes += 1;
        Ok(())
    }
}

impl StorageBackend for MemoryBackend {
    fn read_all(&mut self) -> StoreResult<BTreeMap<String, String>> {
        let state = lock(&self.state, "memory backend")?;
        if state.fail_reads {
            return Err(StoreError::io(
                "memory backend read",
                io::Error::new(io::ErrorKind::Other, "reads disabled"),
            ));
        }
        Ok(state.entries.clone())
    }

    fn put(&mut self, key: &str, raw_value: &str) -> StoreResult<()> {
        self.write(|entries| {
            entries.insert(key.to_owned(), raw_value.to_owned());
        })
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.write(|entries| {
            entries.remove(key);
        })
    }

    fn replace_all(&mut self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        self.write(|current| *current = entries.clone())
    }

    fn describe(&self) -> String {
        "memory".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let backend = MemoryBackend::new();
        let mut handle = backend.clone();
        handle.put("a__b", "1").unwrap();
        assert_eq!(backend.snapshot().get("a__b").map(String::as_str), Some("1"));
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn test_failure_injection() {
        let mut backend = MemoryBackend::with_entries([("a__b", "1")]);
        backend.set_fail_reads(true);
        assert!(backend.read_all().is_err());
        backend.set_fail_reads(false);
        assert_eq!(backend.read_all().unwrap().len(), 1);

        backend.set_fail_writes(true);
        assert!(backend.put("a__c", "2").is_err());
        assert!(!backend.snapshot().contains_key("a__c"));
    }

    #[test]
    fn test_remove_and_replace() {
        let mut backend = MemoryBackend::with_entries([("a__b", "1"), ("a__c", "2")]);
        backend.remove("a__b").unwrap();
        backend.remove("a__missing").unwrap();
        assert_eq!(backend.snapshot().len(), 1);

        let replacement: BTreeMap<String, String> =
            [("x__y".to_string(), "z".to_string())].into_iter().collect();
        backend.replace_all(&replacement).unwrap();
        assert_eq!(backend.snapshot(), replacement);
    }
}
