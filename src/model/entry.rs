//! One typed, defaulted, observable preference slot.

use std::sync::{Arc, Mutex, OnceLock, RwLock};

use crate::codec::Codec;
use crate::observability::{log_event_with_fields, Event};
use crate::store::notify::ChangeChannel;
use crate::store::{lock, Observer, StoreCore, StoreError, StoreResult};

/// Typed handle to a declared entry, returned by the schema builder.
pub type Pref<T> = Arc<PreferenceEntry<T>>;

/// A schema slot: key, compiled default, codec, cached value and its
/// change channel.
///
/// Writes to one entry are serialized by a per-entry lock; reads take a
/// short read lock on the cached value and never wait on I/O. Until the
/// owning store has loaded, `get`, `set` and `observe` fail with
/// [`StoreError::NotReady`].
pub struct PreferenceEntry<T> {
    group: String,
    key: String,
    default: T,
    codec: Box<dyn Codec<T>>,
    current: RwLock<T>,
    writer: Mutex<()>,
    core: OnceLock<Arc<StoreCore>>,
    changes: ChangeChannel<T>,
}

impl<T> PreferenceEntry<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        group: impl Into<String>,
        key: impl Into<String>,
        default: T,
        codec: Box<dyn Codec<T>>,
    ) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            current: RwLock::new(default.clone()),
            default,
            codec,
            writer: Mutex::new(()),
            core: OnceLock::new(),
            changes: ChangeChannel::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// The compiled-in default
    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn codec(&self) -> &dyn Codec<T> {
        self.codec.as_ref()
    }

    /// True once the owning store has bound this entry
    pub fn is_bound(&self) -> bool {
        self.core.get().is_some()
    }

    /// The bound store, once its load has completed.
    fn core(&self) -> StoreResult<&Arc<StoreCore>> {
        match self.core.get() {
            Some(core) if core.is_ready() => Ok(core),
            _ => Err(StoreError::NotReady),
        }
    }

    fn read_current(&self) -> T {
        match self.current.read() {
            Ok(value) => value.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_current(&self, value: T) {
        match self.current.write() {
            Ok(mut current) => *current = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }

    /// Returns the current value.
    pub fn get(&self) -> StoreResult<T> {
        self.core()?;
        Ok(self.read_current())
    }

    /// Returns the current value, or the compiled default before load.
    pub fn get_or_default(&self) -> T {
        self.read_current()
    }

    /// Persists and publishes a new value.
    ///
    /// The value is durable in the backing medium before the cached value
    /// changes; exactly one notification is sent per accepted call.
    pub fn set(&self, value: T) -> StoreResult<()> {
        let core = self.core()?;
        let _writer = lock(&self.writer, "entry writer")?;

        let raw = self.codec.encode(&value);
        if let Err(e) = core.persist(&self.key, &raw) {
            log_event_with_fields(
                Event::PreferenceWriteFailed,
                &[("key", &self.key), ("code", e.code())],
            );
            return Err(e);
        }

        self.write_current(value.clone());
        self.changes.publish(&value);
        Ok(())
    }

    /// Removes the persisted override; the entry reverts to its default.
    pub fn reset(&self) -> StoreResult<()> {
        let core = self.core()?;
        let _writer = lock(&self.writer, "entry writer")?;

        if let Err(e) = core.remove(&self.key) {
            log_event_with_fields(
                Event::PreferenceWriteFailed,
                &[("key", &self.key), ("code", e.code())],
            );
            return Err(e);
        }

        self.write_current(self.default.clone());
        self.changes.publish(&self.default);
        Ok(())
    }

    /// Subscribes to the entry: yields the current value, then every change.
    pub fn observe(&self) -> StoreResult<Observer<T>> {
        self.core()?;
        let _writer = lock(&self.writer, "entry writer")?;
        self.changes.subscribe(self.read_current())
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.changes.subscriber_count()
    }

    /// Binds the entry to a store and seeds its value from the raw map.
    fn bind_raw(&self, raw: Option<&str>, core: Arc<StoreCore>) -> BindOutcome {
        let (value, outcome) = match raw {
            None => (self.default.clone(), BindOutcome::Default),
            Some(raw) => match self.codec.try_decode(raw) {
                Some(value) => (value, BindOutcome::Persisted),
                None => {
                    log_event_with_fields(Event::DecodeFallback, &[("key", &self.key)]);
                    (self.default.clone(), BindOutcome::Fallback)
                }
            },
        };
        self.write_current(value);
        // A second bind keeps the first store
        let _ = self.core.set(core);
        outcome
    }
}

/// How an entry's value was obtained at bind time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Decoded from the persisted raw value
    Persisted,
    /// No persisted value
    Default,
    /// Persisted value did not decode; default used
    Fallback,
}

/// Type-erased view of an entry, for access by key.
pub trait ErasedEntry: Send + Sync {
    fn key(&self) -> &str;
    fn group(&self) -> &str;
    fn is_bound(&self) -> bool;
    /// Encoded compiled default
    fn default_raw(&self) -> String;
    /// Encoded current value (the default before load)
    fn current_raw(&self) -> String;
    /// Decodes `raw` strictly and sets it; malformed input is rejected.
    fn set_raw(&self, raw: &str) -> StoreResult<()>;
    fn reset(&self) -> StoreResult<()>;
}

impl<T> ErasedEntry for PreferenceEntry<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn key(&self) -> &str {
        &self.key
    }

    fn group(&self) -> &str {
        &self.group
    }

    fn is_bound(&self) -> bool {
        PreferenceEntry::is_bound(self)
    }

    fn default_raw(&self) -> String {
        self.codec.encode(&self.default)
    }

    fn current_raw(&self) -> String {
        self.codec.encode(&self.read_current())
    }

    fn set_raw(&self, raw: &str) -> StoreResult<()> {
        let value = self
            .codec
            .try_decode(raw)
            .ok_or_else(|| StoreError::InvalidValue {
                key: self.key.clone(),
                raw: raw.to_owned(),
            })?;
        self.set(value)
    }

    fn reset(&self) -> StoreResult<()> {
        PreferenceEntry::reset(self)
    }
}

/// Store-side binding hook, kept out of the public surface.
pub(crate) trait Bindable: Send + Sync {
    fn erased(&self) -> &dyn ErasedEntry;
    fn bind(&self, raw: Option<&str>, core: Arc<StoreCore>) -> BindOutcome;
}

impl<T> Bindable for PreferenceEntry<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn erased(&self) -> &dyn ErasedEntry {
        self
    }

    fn bind(&self, raw: Option<&str>, core: Arc<StoreCore>) -> BindOutcome {
        self.bind_raw(raw, core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IntCodec;
    use crate::store::MemoryBackend;

    fn bound_entry(raw: Option<&str>) -> (PreferenceEntry<i32>, MemoryBackend, BindOutcome) {
        let backend = MemoryBackend::new();
        let core = Arc::new(StoreCore::new(Box::new(backend.clone())));
        let entry = PreferenceEntry::new(
            "keyboard",
            "keyboard__long_press_delay",
            300,
            Box::new(IntCodec::new()),
        );
        let outcome = Bindable::bind(&entry, raw, core.clone());
        core.mark_ready();
        (entry, backend, outcome)
    }

    #[test]
    fn test_unbound_entry_is_not_ready() {
        let entry: PreferenceEntry<i32> =
            PreferenceEntry::new("keyboard", "keyboard__long_press_delay", 300, Box::new(IntCodec::new()));
        assert!(matches!(entry.get(), Err(StoreError::NotReady)));
        assert!(matches!(entry.set(1), Err(StoreError::NotReady)));
        assert!(entry.observe().is_err());
        assert_eq!(entry.get_or_default(), 300);
    }

    #[test]
    fn test_bound_entry_waits_for_store_ready() {
        let core = Arc::new(StoreCore::new(Box::new(MemoryBackend::new())));
        let entry: PreferenceEntry<i32> =
            PreferenceEntry::new("keyboard", "keyboard__long_press_delay", 300, Box::new(IntCodec::new()));
        Bindable::bind(&entry, Some("450"), core.clone());

        assert!(entry.is_bound());
        assert!(matches!(entry.get(), Err(StoreError::NotReady)));
        assert!(matches!(entry.set(1), Err(StoreError::NotReady)));
        assert!(matches!(entry.reset(), Err(StoreError::NotReady)));
        assert!(entry.observe().is_err());
        assert_eq!(entry.get_or_default(), 450);

        core.mark_ready();
        assert_eq!(entry.get().unwrap(), 450);
    }

    #[test]
    fn test_bind_outcomes() {
        assert_eq!(bound_entry(None).2, BindOutcome::Default);
        let (entry, _, outcome) = bound_entry(Some("450"));
        assert_eq!(outcome, BindOutcome::Persisted);
        assert_eq!(entry.get().unwrap(), 450);

        let (entry, _, outcome) = bound_entry(Some("fast"));
        assert_eq!(outcome, BindOutcome::Fallback);
        assert_eq!(entry.get().unwrap(), 300);
    }

    #[test]
    fn test_set_persists_and_notifies_once() {
        let (entry, backend, _) = bound_entry(None);
        let mut observer = entry.observe().unwrap();
        assert_eq!(observer.try_recv(), Some(300));

        entry.set(500).unwrap();
        assert_eq!(entry.get().unwrap(), 500);
        assert_eq!(
            backend.snapshot().get("keyboard__long_press_delay").map(String::as_str),
            Some("500")
        );
        assert_eq!(observer.try_recv(), Some(500));
        assert_eq!(observer.try_recv(), None);
    }

    #[test]
    fn test_failed_write_leaves_value_and_observers_untouched() {
        let (entry, backend, _) = bound_entry(None);
        let mut observer = entry.observe().unwrap();
        observer.try_recv();

        backend.set_fail_writes(true);
        assert!(entry.set(1).is_err());
        assert_eq!(entry.get().unwrap(), 300);
        assert_eq!(observer.try_recv(), None);
    }

    #[test]
    fn test_reset_reverts_to_default() {
        let (entry, backend, _) = bound_entry(Some("10"));
        entry.set(20).unwrap();
        entry.reset().unwrap();
        assert_eq!(entry.get().unwrap(), 300);
        assert!(!backend.snapshot().contains_key("keyboard__long_press_delay"));
    }

    #[test]
    fn test_set_raw_rejects_malformed_values() {
        let (entry, _, _) = bound_entry(None);
        let erased: &dyn ErasedEntry = &entry;
        assert!(matches!(
            erased.set_raw("soon"),
            Err(StoreError::InvalidValue { .. })
        ));
        erased.set_raw("250").unwrap();
        assert_eq!(erased.current_raw(), "250");
        assert_eq!(erased.default_raw(), "300");
    }
}
