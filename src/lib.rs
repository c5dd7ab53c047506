//! prefdb - a typed, versioned preference store
//!
//! Persisted `(key, raw value)` pairs pass through a deterministic
//! migration pass exactly once at load time, then bind into typed,
//! defaulted, observable entries.

pub mod cli;
pub mod codec;
pub mod config;
pub mod migration;
pub mod model;
pub mod observability;
pub mod prefs;
pub mod store;
