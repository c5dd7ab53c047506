//! Migration error types
//!
//! Error codes:
//! - PREF_MIGRATION_CORRUPT_LEGACY_VALUE (RECOVERABLE) - entry downgraded to reset
//! - PREF_MIGRATION_DUPLICATE_RULE (FATAL) - rule table construction
//! - PREF_MIGRATION_SELF_FEEDING_RULE (FATAL) - rule table construction

use std::fmt;

use thiserror::Error;

/// Severity of a migration error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Handled locally; the load continues
    Recoverable,
    /// Rule table is unusable; initialization must stop
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Recoverable => write!(f, "RECOVERABLE"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Result type for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Migration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    /// A legacy value could not be reshaped into the current format
    #[error("legacy value for '{key}' cannot be migrated: {reason}")]
    CorruptLegacyValue { key: String, reason: String },

    /// Two rules claim the same source key
    #[error("migration rule for '{key}' is declared more than once")]
    DuplicateRule { key: String },

    /// A rule writes to a key that another rule (or itself) consumes
    #[error("migration rule for '{key}' targets '{target}', which is itself migrated")]
    SelfFeedingRule { key: String, target: String },
}

impl MigrationError {
    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        MigrationError::CorruptLegacyValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            MigrationError::CorruptLegacyValue { .. } => "PREF_MIGRATION_CORRUPT_LEGACY_VALUE",
            MigrationError::DuplicateRule { .. } => "PREF_MIGRATION_DUPLICATE_RULE",
            MigrationError::SelfFeedingRule { .. } => "PREF_MIGRATION_SELF_FEEDING_RULE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            MigrationError::CorruptLegacyValue { .. } => Severity::Recoverable,
            _ => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_severity() {
        let corrupt = MigrationError::corrupt("media__emoji_recently_used", "empty glyph");
        assert_eq!(corrupt.code(), "PREF_MIGRATION_CORRUPT_LEGACY_VALUE");
        assert!(!corrupt.is_fatal());

        let dup = MigrationError::DuplicateRule { key: "a__b".into() };
        assert!(dup.is_fatal());
        assert!(dup.to_string().contains("a__b"));
    }
}
