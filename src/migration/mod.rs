//! Load-time migration of persisted raw entries
//!
//! Every raw `(key, value)` pair read from storage passes through the
//! engine exactly once before any typed access. A manually curated rule
//! table maps legacy keys to an action:
//!
//! - keep as-is (no rule; the default for almost every key)
//! - transform (rename, optionally reshaping the value)
//! - reset (delete, so the slot reverts to its compiled default)
//!
//! A transform whose legacy value cannot be parsed is downgraded to a
//! reset for that entry alone; the load never fails because of migration.

mod action;
mod engine;
mod errors;
mod rule;

pub use action::{MigrationAction, RawEntry};
pub use engine::{
    AppliedMigration, MigrationEngine, MigrationOutcome, MigrationOutcomeKind, MigrationReport,
};
pub use errors::{MigrationError, MigrationResult, Severity};
pub use rule::{MigrationRule, Reshape, RuleAction};
