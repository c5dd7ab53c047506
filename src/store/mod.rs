//! Persistence and notification substrate
//!
//! The store owns the raw persisted map and the notification fabric. On
//! load it:
//!
//! 1. reads every raw entry from the backing medium
//! 2. runs the migration engine over the raw map
//! 3. writes the migrated map back if anything changed
//! 4. binds every declared entry through its codec
//! 5. flips the loaded signal
//!
//! After load, typed entries read from memory and write through to the
//! backend. Raw values no declared entry claims stay in the map untouched.
//!
//! # Failure policy
//!
//! A failed read is never treated as an empty map. Depending on
//! [`LoadFailurePolicy`] the load either returns the error (and may be
//! retried) or falls back to an all-defaults in-memory store whose
//! degraded state is visible through the [`LoadedSignal`].

mod backend;
mod errors;
mod file;
pub(crate) mod notify;
mod reactive;
mod shared;
mod signal;

pub use backend::{MemoryBackend, StorageBackend};
pub use errors::{StoreError, StoreResult};
pub use file::{compute_checksum, FileBackend, FORMAT_VERSION};
pub use notify::Observer;
pub use reactive::{LoadFailurePolicy, LoadSummary, ReactiveStore};
pub use signal::{LoadState, LoadedSignal};

pub(crate) use shared::StoreCore;

use std::sync::{Mutex, MutexGuard};

/// Locks a mutex, mapping poisoning to [`StoreError::Poisoned`].
pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, what: &'static str) -> StoreResult<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| StoreError::Poisoned(what))
}
