//! CLI command implementations
//!
//! Every command opens the file-backed application store from the
//! configuration. Commands that read values load the store first, so they
//! also run (and persist) the migration pass. `migrate --dry-run` and
//! `keys` never write.

use std::path::Path;

use serde_json::{json, Value};

use crate::config::StoreConfig;
use crate::migration::MigrationReport;
use crate::prefs::{standard_engine, AppStore};
use crate::store::{FileBackend, LoadSummary, StorageBackend, StoreError};

use super::args::Command;
use super::errors::CliResult;

/// Execute a parsed command, returning its output document.
pub fn run_command(command: &Command) -> CliResult<Value> {
    let config = StoreConfig::load(command.config_path())?;
    match command {
        Command::Dump { .. } => dump(&config),
        Command::Migrate { dry_run: true, .. } => migrate_dry_run(&config),
        Command::Migrate { dry_run: false, .. } => migrate(&config),
        Command::Get { key, .. } => get(&config, key),
        Command::Set { key, raw, .. } => set(&config, key, raw),
        Command::Keys { .. } => keys(&config),
    }
}

fn open_loaded(config: &StoreConfig) -> CliResult<(AppStore, LoadSummary)> {
    let app = AppStore::open(config)?;
    let summary = app.load()?;
    Ok((app, summary))
}

/// Post-load raw map, including keys no slot claims.
pub fn dump(config: &StoreConfig) -> CliResult<Value> {
    let (app, summary) = open_loaded(config)?;
    Ok(json!({
        "file": path_string(&config.file_path()),
        "state": summary.state.to_string(),
        "entries": app.store.raw_snapshot()?,
        "inert": summary.inert,
    }))
}

/// Loads the store, which migrates and writes back.
pub fn migrate(config: &StoreConfig) -> CliResult<Value> {
    let (_, summary) = open_loaded(config)?;
    Ok(json!({
        "dry_run": false,
        "state": summary.state.to_string(),
        "persisted": summary.persisted,
        "report": report_json(&summary.migration),
    }))
}

/// Runs the rule table over the file's contents without writing.
pub fn migrate_dry_run(config: &StoreConfig) -> CliResult<Value> {
    let mut backend = FileBackend::new(&config.data_dir, &config.file_name);
    let raw = backend.read_all()?;
    let outcome = standard_engine().map_err(StoreError::from)?.apply(raw);
    Ok(json!({
        "dry_run": true,
        "would_persist": outcome.report.has_changes(),
        "report": report_json(&outcome.report),
        "entries": outcome.entries,
    }))
}

pub fn get(config: &StoreConfig, key: &str) -> CliResult<Value> {
    let (app, _) = open_loaded(config)?;
    Ok(json!({
        "key": key,
        "value": app.store.get_raw(key)?,
        "persisted": app.store.raw_value(key)?,
    }))
}

pub fn set(config: &StoreConfig, key: &str, raw: &str) -> CliResult<Value> {
    let (app, _) = open_loaded(config)?;
    app.store.set_raw(key, raw)?;
    Ok(json!({
        "key": key,
        "value": app.store.get_raw(key)?,
    }))
}

/// Declared keys in schema order. Does not read the preference file.
pub fn keys(config: &StoreConfig) -> CliResult<Value> {
    let app = AppStore::open(config)?;
    let keys: Vec<Value> = app
        .store
        .model()
        .entries()
        .map(|entry| {
            json!({
                "key": entry.key(),
                "group": entry.group(),
                "default": entry.default_raw(),
            })
        })
        .collect();
    Ok(json!({ "keys": keys }))
}

fn report_json(report: &MigrationReport) -> Value {
    let applied: Vec<Value> = report
        .applied
        .iter()
        .map(|applied| {
            json!({
                "key": applied.key,
                "action": applied.action.to_string(),
                "outcome": applied.outcome.as_str(),
            })
        })
        .collect();
    json!({
        "kept": report.kept,
        "transformed": report.transformed,
        "reset": report.reset,
        "downgraded": report.downgraded,
        "conflicts": report.conflicts,
        "applied": applied,
    })
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}
