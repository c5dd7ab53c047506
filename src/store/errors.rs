//! Store error types
//!
//! Error codes:
//! - PREF_STORE_IO_ERROR (ERROR) - backing medium unavailable
//! - PREF_STORE_CORRUPT (ERROR) - persisted document unreadable or checksum mismatch
//! - PREF_STORE_NOT_READY (ERROR) - entry used before load completed
//! - PREF_STORE_POISONED (ERROR) - a writer panicked while holding a lock
//! - PREF_STORE_SERIALIZATION (ERROR)
//! - PREF_STORE_UNKNOWN_KEY / PREF_STORE_INVALID_VALUE (ERROR) - raw access by key
//! - schema and migration errors wrapped with their own codes (FATAL)

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::migration::MigrationError;
use crate::model::SchemaError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing medium I/O failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Persisted document exists but cannot be trusted
    #[error("corrupt preference file '{path}': {reason}")]
    Corrupt { path: String, reason: String },

    /// Store has not finished loading
    #[error("preference store is not loaded yet")]
    NotReady,

    /// A lock was poisoned by a panicking writer
    #[error("lock poisoned: {0}")]
    Poisoned(&'static str),

    #[error("serialization failed: {0}")]
    Serialization(String),

    /// No declared entry has this key
    #[error("unknown preference key '{0}'")]
    UnknownKey(String),

    /// Raw value is not a valid encoding for the entry
    #[error("invalid value for '{key}': '{raw}'")]
    InvalidValue { key: String, raw: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

impl StoreError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn io_at_path(path: &Path, source: io::Error) -> Self {
        Self::io(format!("I/O failure at '{}'", path.display()), source)
    }

    pub fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io { .. } => "PREF_STORE_IO_ERROR",
            StoreError::Corrupt { .. } => "PREF_STORE_CORRUPT",
            StoreError::NotReady => "PREF_STORE_NOT_READY",
            StoreError::Poisoned(_) => "PREF_STORE_POISONED",
            StoreError::Serialization(_) => "PREF_STORE_SERIALIZATION",
            StoreError::UnknownKey(_) => "PREF_STORE_UNKNOWN_KEY",
            StoreError::InvalidValue { .. } => "PREF_STORE_INVALID_VALUE",
            StoreError::Schema(e) => e.code(),
            StoreError::Migration(e) => e.code(),
        }
    }

    /// True for errors raised while reading the backing medium
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Corrupt { .. })
    }

    /// True if initialization cannot continue
    pub fn is_fatal(&self) -> bool {
        match self {
            StoreError::Schema(e) => e.is_fatal(),
            StoreError::Migration(e) => e.is_fatal(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
