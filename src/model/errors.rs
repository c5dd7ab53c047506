//! Schema construction errors
//!
//! Both variants are programmer errors in the schema declaration and are
//! FATAL: initialization must stop with the offending key in the message.
//!
//! Error codes:
//! - PREF_SCHEMA_DUPLICATE_KEY
//! - PREF_SCHEMA_INVALID_KEY

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two entries declare the same key
    #[error("duplicate preference key '{key}' (first declared in group '{first_group}')")]
    DuplicateKey { key: String, first_group: String },

    /// Key is not of the form `group__name`
    #[error("invalid preference key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}

impl SchemaError {
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::DuplicateKey { .. } => "PREF_SCHEMA_DUPLICATE_KEY",
            SchemaError::InvalidKey { .. } => "PREF_SCHEMA_INVALID_KEY",
        }
    }

    /// The key the error is about
    pub fn key(&self) -> &str {
        match self {
            SchemaError::DuplicateKey { key, .. } | SchemaError::InvalidKey { key, .. } => key,
        }
    }

    /// Schema errors always halt initialization
    pub fn is_fatal(&self) -> bool {
        true
    }
}
