//! Typed preference schema
//!
//! A schema is a set of groups, each holding typed entries with a key, a
//! compiled default and a codec. Keys are `group__name` and unique across
//! the schema; violations are reported when the schema is built.
//!
//! Entries are created once, live for the life of the process, and are
//! shared as [`Pref<T>`] handles. The store binds them at load time.

mod entry;
mod errors;
mod schema;

pub use entry::{BindOutcome, ErasedEntry, Pref, PreferenceEntry};
pub use errors::{SchemaError, SchemaResult};
pub use schema::{
    validate_key, BindReport, GroupBuilder, GroupInfo, PreferenceModel, SchemaBuilder,
    KEY_SEPARATOR,
};
