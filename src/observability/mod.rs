//! Observability subsystem for prefdb
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Scope-based begin/complete tracing for the load phase
//!
//! Observability is read-only: a failed log write never fails the
//! operation being logged.
//!
//! ```ignore
//! use prefdb::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::DecodeFallback, &[("key", "theme__mode")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::ObservationScope;

/// Returns the severity an event is logged at.
pub fn severity_of(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_error() {
        Severity::Error
    } else if event.is_warning() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_of(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_of_events() {
        assert_eq!(severity_of(Event::SchemaRejected), Severity::Fatal);
        assert_eq!(severity_of(Event::StoreReadFailed), Severity::Error);
        assert_eq!(severity_of(Event::MigrationDowngraded), Severity::Warn);
        assert_eq!(severity_of(Event::StoreReady), Severity::Info);
    }

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(Event::StoreReady);
        log_event_with_fields(Event::MigrationApplied, &[("key", "a__b"), ("action", "reset")]);
    }
}
