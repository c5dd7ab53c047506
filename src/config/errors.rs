//! Configuration errors
//!
//! Error codes:
//! - PREF_CONFIG_READ - file missing or unreadable
//! - PREF_CONFIG_PARSE - not a valid configuration document
//! - PREF_CONFIG_INVALID - a field failed validation
//!
//! All configuration errors are FATAL: the store is never opened with a
//! configuration that did not validate.

use std::io;

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON in '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        ConfigError::Invalid(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "PREF_CONFIG_READ",
            ConfigError::Parse { .. } => "PREF_CONFIG_PARSE",
            ConfigError::Invalid(_) => "PREF_CONFIG_INVALID",
        }
    }
}
