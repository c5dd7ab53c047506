//! Observable events emitted by the store lifecycle.

use std::fmt;

/// Observable events in prefdb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,

    // Schema
    /// Schema construction rejected (duplicate or malformed key)
    SchemaRejected,

    // Load phase
    /// Reading the raw map from the backing medium failed
    StoreReadFailed,
    /// Store fell back to in-memory defaults
    StoreDegraded,
    /// Store bound and marked loaded
    StoreReady,

    // Migration
    /// A rule rewrote or reset a raw entry
    MigrationApplied,
    /// A transform could not parse legacy data and was downgraded to reset
    MigrationDowngraded,
    /// A transform target already existed; the legacy entry was dropped
    MigrationConflict,
    /// The migrated raw map was written back
    MigrationPersisted,

    // Binding and writes
    /// A persisted raw value did not decode; the slot uses its default
    DecodeFallback,
    /// A preference write could not be persisted
    PreferenceWriteFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::StoreReadFailed => "STORE_READ_FAILED",
            Event::StoreDegraded => "STORE_DEGRADED",
            Event::StoreReady => "STORE_READY",
            Event::MigrationApplied => "MIGRATION_APPLIED",
            Event::MigrationDowngraded => "MIGRATION_DOWNGRADED",
            Event::MigrationConflict => "MIGRATION_CONFLICT",
            Event::MigrationPersisted => "MIGRATION_PERSISTED",
            Event::DecodeFallback => "DECODE_FALLBACK",
            Event::PreferenceWriteFailed => "PREFERENCE_WRITE_FAILED",
        }
    }

    /// Returns true if this event indicates initialization cannot continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::SchemaRejected)
    }

    /// Returns true if this event reports a recovered condition
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::StoreDegraded
                | Event::MigrationDowngraded
                | Event::MigrationConflict
                | Event::DecodeFallback
        )
    }

    /// Returns true if this event reports a surfaced failure
    pub fn is_error(&self) -> bool {
        matches!(self, Event::StoreReadFailed | Event::PreferenceWriteFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_labels_are_screaming_snake_case() {
        let events = [
            Event::ConfigLoaded,
            Event::SchemaRejected,
            Event::StoreReadFailed,
            Event::StoreDegraded,
            Event::StoreReady,
            Event::MigrationApplied,
            Event::MigrationDowngraded,
            Event::MigrationConflict,
            Event::MigrationPersisted,
            Event::DecodeFallback,
            Event::PreferenceWriteFailed,
        ];
        for event in events {
            assert!(event
                .as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_classification() {
        assert!(Event::SchemaRejected.is_fatal());
        assert!(Event::DecodeFallback.is_warning());
        assert!(Event::StoreReadFailed.is_error());
        assert!(!Event::StoreReady.is_warning());
    }
}
