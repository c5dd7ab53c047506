//! Declarative schema: groups of typed entries, validated at build time.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveTime;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::entry::{BindOutcome, Bindable, ErasedEntry, Pref, PreferenceEntry};
use super::errors::{SchemaError, SchemaResult};
use crate::codec::{
    AccentColor, AccentColorCodec, BoolCodec, Codec, FloatCodec, IntCodec, JsonCodec, LabelCodec,
    LocalTimeCodec, LongCodec, StringCodec,
};
use crate::observability::{log_event_with_fields, Event};
use crate::store::StoreCore;

/// Separator between group and name in a key
pub const KEY_SEPARATOR: &str = "__";

/// Checks that `key` is `<group>__<name>` in lowercase ASCII, digits and
/// underscores.
pub fn validate_key(group: &str, key: &str) -> SchemaResult<()> {
    if key.is_empty() {
        return Err(SchemaError::invalid_key(key, "key is empty"));
    }
    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
    {
        return Err(SchemaError::invalid_key(
            key,
            format!("character '{}' is not allowed", c),
        ));
    }
    let Some((prefix, name)) = key.split_once(KEY_SEPARATOR) else {
        return Err(SchemaError::invalid_key(key, "missing '__' group separator"));
    };
    if prefix != group {
        return Err(SchemaError::invalid_key(
            key,
            format!("key is declared in group '{}'", group),
        ));
    }
    if name.is_empty() {
        return Err(SchemaError::invalid_key(key, "name is empty"));
    }
    Ok(())
}

/// A group and the keys declared in it, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub name: String,
    pub keys: Vec<String>,
}

/// Collects entry declarations.
///
/// Declaration never fails mid-way: the first invalid or duplicate key is
/// recorded and reported by [`build`](Self::build), so a whole schema can
/// be written as straight-line code.
#[derive(Default)]
pub struct SchemaBuilder {
    groups: Vec<GroupInfo>,
    entries: Vec<Arc<dyn Bindable>>,
    index: HashMap<String, usize>,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or reopens) a group.
    pub fn group(&mut self, name: &str) -> GroupBuilder<'_> {
        let position = match self.groups.iter().position(|g| g.name == name) {
            Some(position) => position,
            None => {
                self.groups.push(GroupInfo {
                    name: name.to_owned(),
                    keys: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        GroupBuilder {
            schema: self,
            group: position,
        }
    }

    fn declare<T>(&mut self, group: usize, key: &str, default: T, codec: Box<dyn Codec<T>>) -> Pref<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let group_name = self.groups[group].name.clone();
        let entry = Arc::new(PreferenceEntry::new(group_name.clone(), key, default, codec));

        if let Err(e) = validate_key(&group_name, key) {
            self.reject(e);
            return entry;
        }
        if let Some(&existing) = self.index.get(key) {
            let first_group = self.entries[existing].erased().group().to_owned();
            self.reject(SchemaError::DuplicateKey {
                key: key.to_owned(),
                first_group,
            });
            return entry;
        }

        self.index.insert(key.to_owned(), self.entries.len());
        self.entries.push(entry.clone());
        self.groups[group].keys.push(key.to_owned());
        entry
    }

    fn reject(&mut self, error: SchemaError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Finishes the schema.
    ///
    /// # Errors
    ///
    /// The first `DuplicateKey` or `InvalidKey` seen during declaration.
    pub fn build(self) -> SchemaResult<PreferenceModel> {
        if let Some(error) = self.error {
            log_event_with_fields(
                Event::SchemaRejected,
                &[("code", error.code()), ("key", error.key())],
            );
            return Err(error);
        }
        Ok(PreferenceModel {
            groups: self.groups,
            entries: self.entries,
            index: self.index,
        })
    }
}

/// Declares entries under one group.
///
/// Keys are given in full (`group__name`) so they read the same as in the
/// persisted file.
pub struct GroupBuilder<'a> {
    schema: &'a mut SchemaBuilder,
    group: usize,
}

impl GroupBuilder<'_> {
    pub fn name(&self) -> &str {
        &self.schema.groups[self.group].name
    }

    /// Declares an entry with an explicit codec.
    pub fn custom<T, C>(&mut self, key: &str, default: T, codec: C) -> Pref<T>
    where
        T: Clone + Send + Sync + 'static,
        C: Codec<T> + 'static,
    {
        self.schema.declare(self.group, key, default, Box::new(codec))
    }

    pub fn boolean(&mut self, key: &str, default: bool) -> Pref<bool> {
        self.custom(key, default, BoolCodec::new())
    }

    pub fn int(&mut self, key: &str, default: i32) -> Pref<i32> {
        self.custom(key, default, IntCodec::new())
    }

    pub fn long(&mut self, key: &str, default: i64) -> Pref<i64> {
        self.custom(key, default, LongCodec::new())
    }

    pub fn float(&mut self, key: &str, default: f32) -> Pref<f32> {
        self.custom(key, default, FloatCodec::new())
    }

    pub fn string(&mut self, key: &str, default: impl Into<String>) -> Pref<String> {
        self.custom(key, default.into(), StringCodec)
    }

    /// Enum persisted by label; unknown labels fall back to `default`.
    pub fn enumeration<E>(&mut self, key: &str, default: E) -> Pref<E>
    where
        E: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.custom(key, default, LabelCodec::new())
    }

    pub fn local_time(&mut self, key: &str, default: NaiveTime) -> Pref<NaiveTime> {
        self.custom(key, default, LocalTimeCodec)
    }

    pub fn color(&mut self, key: &str, default: AccentColor) -> Pref<AccentColor> {
        self.custom(key, default, AccentColorCodec)
    }

    /// Structured value persisted as JSON.
    pub fn json<T>(&mut self, key: &str, default: T) -> Pref<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    {
        self.custom(key, default, JsonCodec::new())
    }
}

/// Counts from binding every declared entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Entries decoded from a persisted value
    pub persisted: usize,
    /// Entries with no persisted value
    pub defaulted: usize,
    /// Keys whose persisted value did not decode
    pub fallbacks: Vec<String>,
}

/// The complete, validated schema.
pub struct PreferenceModel {
    groups: Vec<GroupInfo>,
    entries: Vec<Arc<dyn Bindable>>,
    index: HashMap<String, usize>,
}

impl PreferenceModel {
    /// Groups in declaration order
    pub fn groups(&self) -> &[GroupInfo] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.erased().key())
    }

    pub fn entry(&self, key: &str) -> Option<&dyn ErasedEntry> {
        self.index.get(key).map(|&i| self.entries[i].erased())
    }

    /// Entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = &dyn ErasedEntry> {
        self.entries.iter().map(|e| e.erased())
    }

    pub(crate) fn bind_all(
        &self,
        raw: &BTreeMap<String, String>,
        core: &Arc<StoreCore>,
    ) -> BindReport {
        let mut report = BindReport::default();
        for entry in &self.entries {
            let key = entry.erased().key();
            match entry.bind(raw.get(key).map(String::as_str), Arc::clone(core)) {
                BindOutcome::Persisted => report.persisted += 1,
                BindOutcome::Default => report.defaulted += 1,
                BindOutcome::Fallback => report.fallbacks.push(key.to_owned()),
            }
        }
        report
    }
}

impl std::fmt::Debug for PreferenceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceModel")
            .field("groups", &self.groups)
            .finish()
    }
}
