//! ReactiveStore: load, migrate, bind, signal.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::backend::StorageBackend;
use super::shared::StoreCore;
use super::errors::{StoreError, StoreResult};
use super::file::FileBackend;
use super::lock;
use super::signal::{LoadState, LoadedSignal};
use crate::config::StoreConfig;
use crate::migration::{MigrationEngine, MigrationReport};
use crate::model::{BindReport, ErasedEntry, PreferenceModel};
use crate::observability::{log_event_with_fields, Event, ObservationScope};

/// What `load()` does when the backing medium cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailurePolicy {
    /// Return the error; the store stays pending and `load()` may be retried
    #[default]
    Fail,
    /// Bind every entry to its default over an in-memory backend
    Defaults,
}

impl fmt::Display for LoadFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFailurePolicy::Fail => write!(f, "fail"),
            LoadFailurePolicy::Defaults => write!(f, "defaults"),
        }
    }
}

/// Outcome of a completed load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub state: LoadState,
    pub migration: MigrationReport,
    /// True if the migrated raw map was written back
    pub persisted: bool,
    pub binding: BindReport,
    /// Raw keys no declared entry claims
    pub inert: Vec<String>,
}

/// The store: backing medium, migration engine, and the typed model bound
/// over them.
pub struct ReactiveStore {
    model: PreferenceModel,
    engine: MigrationEngine,
    core: Arc<StoreCore>,
    policy: LoadFailurePolicy,
    completed: Mutex<Option<LoadSummary>>,
    state: watch::Sender<LoadState>,
}

impl ReactiveStore {
    pub fn new(
        model: PreferenceModel,
        engine: MigrationEngine,
        backend: Box<dyn StorageBackend>,
    ) -> Self {
        let (state, _) = watch::channel(LoadState::Pending);
        Self {
            model,
            engine,
            core: Arc::new(StoreCore::new(backend)),
            policy: LoadFailurePolicy::default(),
            completed: Mutex::new(None),
            state,
        }
    }

    pub fn with_policy(mut self, policy: LoadFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// File-backed store at the configured location.
    pub fn open(config: &StoreConfig, model: PreferenceModel, engine: MigrationEngine) -> Self {
        let backend = FileBackend::new(&config.data_dir, &config.file_name);
        Self::new(model, engine, Box::new(backend)).with_policy(config.on_load_failure)
    }

    pub fn model(&self) -> &PreferenceModel {
        &self.model
    }

    pub fn engine(&self) -> &MigrationEngine {
        &self.engine
    }

    pub fn policy(&self) -> LoadFailurePolicy {
        self.policy
    }

    /// Backend label, e.g. `file:/path/prefs.json`
    pub fn describe(&self) -> String {
        self.core.describe()
    }

    /// A handle on the loaded signal.
    pub fn signal(&self) -> LoadedSignal {
        LoadedSignal::new(self.state.subscribe())
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.state.borrow().is_loaded()
    }

    /// Reads, migrates, writes back, binds, and flips the loaded signal.
    ///
    /// Idempotent: once a load has completed, later calls return the same
    /// summary without touching the backend. Concurrent callers serialize
    /// and the later ones observe the completed load.
    ///
    /// # Errors
    ///
    /// With [`LoadFailurePolicy::Fail`], a read or write-back failure is
    /// returned and the store stays pending.
    pub fn load(&self) -> StoreResult<LoadSummary> {
        let mut completed = lock(&self.completed, "load")?;
        if let Some(summary) = completed.as_ref() {
            return Ok(summary.clone());
        }

        let backend = self.core.describe();
        let scope = ObservationScope::with_fields("STORE_LOAD", &[("backend", &backend)]);

        let summary = match self.read_and_migrate() {
            Ok((entries, migration, persisted)) => {
                let inert: Vec<String> = entries
                    .keys()
                    .filter(|key| !self.model.contains(key))
                    .cloned()
                    .collect();
                self.core.install(entries.clone())?;
                let binding = self.model.bind_all(&entries, &self.core);
                LoadSummary {
                    state: LoadState::Ready,
                    migration,
                    persisted,
                    binding,
                    inert,
                }
            }
            Err(e) => {
                log_event_with_fields(
                    Event::StoreReadFailed,
                    &[("backend", &backend), ("code", e.code())],
                );
                if self.policy == LoadFailurePolicy::Fail {
                    scope.fail(&e.to_string());
                    return Err(e);
                }

                self.core.degrade()?;
                log_event_with_fields(
                    Event::StoreDegraded,
                    &[("backend", &backend), ("code", e.code())],
                );
                let binding = self.model.bind_all(&BTreeMap::new(), &self.core);
                LoadSummary {
                    state: LoadState::Degraded {
                        reason: e.to_string(),
                    },
                    migration: MigrationReport::default(),
                    persisted: false,
                    binding,
                    inert: Vec::new(),
                }
            }
        };

        self.core.mark_ready();
        self.state.send_replace(summary.state.clone());

        let entries = self.model.len().to_string();
        let fallbacks = summary.binding.fallbacks.len().to_string();
        let state = summary.state.to_string();
        log_event_with_fields(
            Event::StoreReady,
            &[("entries", &entries), ("fallbacks", &fallbacks), ("state", &state)],
        );
        scope.complete_with_fields(&[("entries", &entries)]);

        *completed = Some(summary.clone());
        Ok(summary)
    }

    fn read_and_migrate(&self) -> StoreResult<(BTreeMap<String, String>, MigrationReport, bool)> {
        let raw = self.core.read_all()?;
        let outcome = self.engine.apply(raw);

        let persisted = outcome.report.has_changes();
        if persisted {
            self.core.replace_all(&outcome.entries)?;
            let count = outcome.report.applied.len().to_string();
            log_event_with_fields(Event::MigrationPersisted, &[("applied", &count)]);
        }

        Ok((outcome.entries, outcome.report, persisted))
    }

    /// Runs [`load`](Self::load) on the blocking pool.
    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<StoreResult<LoadSummary>> {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.load())
    }

    /// The post-load raw map, including inert keys.
    pub fn raw_snapshot(&self) -> StoreResult<BTreeMap<String, String>> {
        self.ensure_loaded()?;
        self.core.raw_snapshot()
    }

    /// Persisted raw value for a key, if any.
    pub fn raw_value(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_loaded()?;
        self.core.raw_value(key)
    }

    /// Looks up a declared entry by key.
    pub fn entry(&self, key: &str) -> StoreResult<&dyn ErasedEntry> {
        self.model
            .entry(key)
            .ok_or_else(|| StoreError::UnknownKey(key.to_owned()))
    }

    /// Encoded current value of a declared entry.
    pub fn get_raw(&self, key: &str) -> StoreResult<String> {
        self.ensure_loaded()?;
        Ok(self.entry(key)?.current_raw())
    }

    /// Decodes `raw` through the entry's codec and sets it.
    pub fn set_raw(&self, key: &str, raw: &str) -> StoreResult<()> {
        self.entry(key)?.set_raw(raw)
    }

    fn ensure_loaded(&self) -> StoreResult<()> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(StoreError::NotReady)
        }
    }
}

impl fmt::Debug for ReactiveStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveStore")
            .field("backend", &self.core.describe())
            .field("entries", &self.model.len())
            .field("rules", &self.engine.rules().len())
            .field("policy", &self.policy)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::MigrationRule;
    use crate::model::{Pref, SchemaBuilder};
    use crate::store::MemoryBackend;

    struct Fixture {
        store: ReactiveStore,
        backend: MemoryBackend,
        delay: Pref<i32>,
        enabled: Pref<bool>,
    }

    fn fixture(seed: &[(&str, &str)]) -> Fixture {
        let mut schema = SchemaBuilder::new();
        let mut keyboard = schema.group("keyboard");
        let delay = keyboard.int("keyboard__long_press_delay", 300);
        let enabled = keyboard.boolean("keyboard__number_row", false);
        let model = schema.build().unwrap();

        let engine = MigrationEngine::new(vec![
            MigrationRule::rename("keyboard__long_press", "keyboard__long_press_delay"),
            MigrationRule::reset("keyboard__one_handed_mode"),
        ])
        .unwrap();

        let backend = MemoryBackend::with_entries(seed.iter().copied());
        let store = ReactiveStore::new(model, engine, Box::new(backend.clone()));
        Fixture {
            store,
            backend,
            delay,
            enabled,
        }
    }

    #[test]
    fn test_load_migrates_and_binds() {
        let f = fixture(&[
            ("keyboard__long_press", "450"),
            ("keyboard__one_handed_mode", "END"),
            ("legacy__flag", "true"),
        ]);
        assert!(matches!(f.delay.get(), Err(StoreError::NotReady)));

        let summary = f.store.load().unwrap();
        assert_eq!(summary.state, LoadState::Ready);
        assert!(summary.persisted);
        assert_eq!(summary.migration.transformed, 1);
        assert_eq!(summary.migration.reset, 1);
        assert_eq!(summary.inert, vec!["legacy__flag".to_string()]);

        assert_eq!(f.delay.get().unwrap(), 450);
        assert!(!f.enabled.get().unwrap());

        let persisted = f.backend.snapshot();
        assert_eq!(persisted.get("keyboard__long_press_delay").unwrap(), "450");
        assert!(!persisted.contains_key("keyboard__long_press"));
        assert!(!persisted.contains_key("keyboard__one_handed_mode"));
        assert_eq!(persisted.get("legacy__flag").unwrap(), "true");
    }

    #[test]
    fn test_load_without_changes_does_not_write() {
        let f = fixture(&[("keyboard__number_row", "true")]);
        let summary = f.store.load().unwrap();
        assert!(!summary.persisted);
        assert_eq!(f.backend.write_count(), 0);
        assert!(f.enabled.get().unwrap());
    }

    #[test]
    fn test_load_is_idempotent() {
        let f = fixture(&[("keyboard__long_press", "450")]);
        let first = f.store.load().unwrap();
        f.delay.set(100).unwrap();
        let second = f.store.load().unwrap();
        assert_eq!(first, second);
        assert_eq!(f.delay.get().unwrap(), 100);
    }

    #[test]
    fn test_read_failure_with_fail_policy_stays_pending() {
        let f = fixture(&[("keyboard__number_row", "true")]);
        f.backend.set_fail_reads(true);
        let err = f.store.load().unwrap_err();
        assert!(err.is_storage_failure());
        assert_eq!(f.store.state(), LoadState::Pending);
        assert!(f.enabled.get().is_err());

        f.backend.set_fail_reads(false);
        f.store.load().unwrap();
        assert!(f.enabled.get().unwrap());
    }

    #[test]
    fn test_read_failure_with_defaults_policy_degrades() {
        let f = fixture(&[("keyboard__number_row", "true")]);
        f.backend.set_fail_reads(true);
        let store = f.store.with_policy(LoadFailurePolicy::Defaults);

        let summary = store.load().unwrap();
        assert!(summary.state.is_degraded());
        assert!(store.signal().state().is_degraded());
        assert!(!f.enabled.get().unwrap());

        f.enabled.set(true).unwrap();
        assert!(f.enabled.get().unwrap());
        assert_eq!(f.backend.write_count(), 0);
    }

    #[test]
    fn test_raw_access_by_key() {
        let f = fixture(&[]);
        assert!(matches!(
            f.store.get_raw("keyboard__number_row"),
            Err(StoreError::NotReady)
        ));
        f.store.load().unwrap();

        f.store.set_raw("keyboard__long_press_delay", "125").unwrap();
        assert_eq!(f.delay.get().unwrap(), 125);
        assert_eq!(f.store.get_raw("keyboard__long_press_delay").unwrap(), "125");
        assert!(matches!(
            f.store.set_raw("keyboard__missing", "1"),
            Err(StoreError::UnknownKey(_))
        ));
        assert!(matches!(
            f.store.set_raw("keyboard__number_row", "maybe"),
            Err(StoreError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_spawn_load_fires_signal() {
        let f = fixture(&[]);
        let store = Arc::new(f.store);
        let mut signal = store.signal();
        assert!(!signal.is_loaded());

        let handle = store.spawn_load();
        assert_eq!(signal.wait().await, LoadState::Ready);
        assert!(handle.await.unwrap().is_ok());
    }
}
