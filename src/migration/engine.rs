//! Migration engine
//!
//! Maps every persisted raw entry to exactly one action, applies the
//! actions to the raw map, and reports what changed. The pass is
//! deterministic (entries are visited in key order) and idempotent: a rule
//! table is rejected at construction if any rule writes to a key that a
//! rule consumes, so migrated keys are fixed points.

use std::collections::{BTreeMap, HashMap};

use super::action::{MigrationAction, RawEntry};
use super::errors::{MigrationError, MigrationResult};
use super::rule::MigrationRule;
use crate::observability::{log_event_with_fields, Event};

/// Rule table plus the lookup index over it.
#[derive(Debug, Clone, Default)]
pub struct MigrationEngine {
    rules: Vec<MigrationRule>,
    by_key: HashMap<&'static str, usize>,
}

impl MigrationEngine {
    /// Builds an engine from a rule table.
    ///
    /// # Errors
    ///
    /// - `DuplicateRule` if two rules match the same key
    /// - `SelfFeedingRule` if a rule's target is some rule's source
    pub fn new(rules: Vec<MigrationRule>) -> MigrationResult<Self> {
        let mut by_key = HashMap::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            if by_key.insert(rule.from(), index).is_some() {
                return Err(MigrationError::DuplicateRule {
                    key: rule.from().to_owned(),
                });
            }
        }

        for rule in &rules {
            if let Some(target) = rule.target() {
                if by_key.contains_key(target) {
                    return Err(MigrationError::SelfFeedingRule {
                        key: rule.from().to_owned(),
                        target: target.to_owned(),
                    });
                }
            }
        }

        Ok(Self { rules, by_key })
    }

    /// An engine that keeps every entry.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[MigrationRule] {
        &self.rules
    }

    pub fn rule_for(&self, key: &str) -> Option<&MigrationRule> {
        self.by_key.get(key).map(|&index| &self.rules[index])
    }

    /// Decides the action for one entry, surfacing reshape failures.
    pub fn try_migrate(&self, entry: &RawEntry) -> MigrationResult<MigrationAction> {
        match self.rule_for(&entry.key) {
            Some(rule) => rule.execute(&entry.raw_value),
            None => Ok(MigrationAction::KeepAsIs),
        }
    }

    /// Decides the action for one entry. Total: a transform whose legacy
    /// value cannot be parsed is downgraded to `Reset`.
    pub fn migrate(&self, entry: &RawEntry) -> MigrationAction {
        self.try_migrate(entry).unwrap_or(MigrationAction::Reset)
    }

    /// Applies the rule table to a whole raw map.
    ///
    /// Entries that are kept as-is are placed first, so a transform whose
    /// target already exists never overwrites it; the legacy entry is
    /// dropped and counted as a conflict.
    pub fn apply(&self, raw: BTreeMap<String, String>) -> MigrationOutcome {
        let mut report = MigrationReport::default();
        let mut entries = BTreeMap::new();
        let mut pending = Vec::new();

        for (key, raw_value) in raw {
            let entry = RawEntry::new(key, raw_value);
            match self.try_migrate(&entry) {
                Ok(MigrationAction::KeepAsIs) => {
                    report.kept += 1;
                    entries.insert(entry.key, entry.raw_value);
                }
                Ok(action) => pending.push((entry, action)),
                Err(e) => {
                    log_event_with_fields(
                        Event::MigrationDowngraded,
                        &[("key", &entry.key), ("reason", &e.to_string())],
                    );
                    report.downgraded += 1;
                    report.applied.push(AppliedMigration {
                        key: entry.key,
                        action: MigrationAction::Reset,
                        outcome: MigrationOutcomeKind::Downgraded,
                    });
                }
            }
        }

        for (entry, action) in pending {
            let source = entry.key.clone();
            let outcome = match entry.apply(&action) {
                None => {
                    report.reset += 1;
                    MigrationOutcomeKind::Reset
                }
                Some(migrated) if entries.contains_key(&migrated.key) => {
                    log_event_with_fields(
                        Event::MigrationConflict,
                        &[("key", &source), ("target", &migrated.key)],
                    );
                    report.conflicts += 1;
                    MigrationOutcomeKind::Conflict
                }
                Some(migrated) => {
                    report.transformed += 1;
                    entries.insert(migrated.key, migrated.raw_value);
                    MigrationOutcomeKind::Transformed
                }
            };
            log_event_with_fields(
                Event::MigrationApplied,
                &[("key", &source), ("action", action.kind())],
            );
            report.applied.push(AppliedMigration {
                key: source,
                action,
                outcome,
            });
        }

        MigrationOutcome { entries, report }
    }
}

/// Result of a migration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// The post-migration raw map
    pub entries: BTreeMap<String, String>,
    pub report: MigrationReport,
}

/// How a matched entry ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcomeKind {
    Transformed,
    Reset,
    /// Legacy value was corrupt; entry deleted
    Downgraded,
    /// Target key already present; legacy entry deleted
    Conflict,
}

impl MigrationOutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationOutcomeKind::Transformed => "transformed",
            MigrationOutcomeKind::Reset => "reset",
            MigrationOutcomeKind::Downgraded => "downgraded",
            MigrationOutcomeKind::Conflict => "conflict",
        }
    }
}

/// One entry a rule matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    /// Legacy key
    pub key: String,
    pub action: MigrationAction,
    pub outcome: MigrationOutcomeKind,
}

/// Counters for a migration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub kept: usize,
    pub transformed: usize,
    pub reset: usize,
    pub downgraded: usize,
    pub conflicts: usize,
    /// Matched entries in the order they were applied
    pub applied: Vec<AppliedMigration>,
}

impl MigrationReport {
    /// True if the pass changed the raw map
    pub fn has_changes(&self) -> bool {
        self.transformed + self.reset + self.downgraded + self.conflicts > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double(raw: &str) -> MigrationResult<String> {
        raw.parse::<i64>()
            .map(|n| (n * 2).to_string())
            .map_err(|e| MigrationError::corrupt("num__old", e.to_string()))
    }

    fn engine() -> MigrationEngine {
        MigrationEngine::new(vec![
            MigrationRule::rename("group__old", "group__new"),
            MigrationRule::rewrite("num__old", "num__new", double),
            MigrationRule::reset("gone__feature"),
        ])
        .unwrap()
    }

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unmatched_keys_are_kept() {
        let action = engine().migrate(&RawEntry::new("theme__mode", "ALWAYS_DAY"));
        assert_eq!(action, MigrationAction::KeepAsIs);
    }

    #[test]
    fn test_corrupt_transform_is_downgraded() {
        let engine = engine();
        let entry = RawEntry::new("num__old", "not-a-number");
        assert!(engine.try_migrate(&entry).is_err());
        assert_eq!(engine.migrate(&entry), MigrationAction::Reset);

        let outcome = engine.apply(map(&[("num__old", "x"), ("other__a", "1")]));
        assert_eq!(outcome.entries, map(&[("other__a", "1")]));
        assert_eq!(outcome.report.downgraded, 1);
        assert_eq!(outcome.report.kept, 1);
    }

    #[test]
    fn test_apply_counts_and_rewrites() {
        let outcome = engine().apply(map(&[
            ("group__old", "v"),
            ("num__old", "21"),
            ("gone__feature", "1"),
            ("keep__me", "k"),
        ]));
        assert_eq!(
            outcome.entries,
            map(&[("group__new", "v"), ("keep__me", "k"), ("num__new", "42")])
        );
        assert_eq!(outcome.report.transformed, 2);
        assert_eq!(outcome.report.reset, 1);
        assert_eq!(outcome.report.kept, 1);
        assert!(outcome.report.has_changes());
    }

    #[test]
    fn test_existing_target_wins_conflict() {
        let outcome = engine().apply(map(&[("group__new", "current"), ("group__old", "legacy")]));
        assert_eq!(outcome.entries, map(&[("group__new", "current")]));
        assert_eq!(outcome.report.conflicts, 1);
        assert_eq!(outcome.report.applied[0].outcome, MigrationOutcomeKind::Conflict);
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let engine = engine();
        let first = engine.apply(map(&[("group__old", "v"), ("num__old", "3"), ("gone__feature", "")]));
        let second = engine.apply(first.entries.clone());
        assert_eq!(second.entries, first.entries);
        assert!(!second.report.has_changes());
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let err = MigrationEngine::new(vec![
            MigrationRule::reset("a__b"),
            MigrationRule::rename("a__b", "a__c"),
        ])
        .unwrap_err();
        assert_eq!(err, MigrationError::DuplicateRule { key: "a__b".into() });
    }

    #[test]
    fn test_self_feeding_rule_rejected() {
        let err = MigrationEngine::new(vec![
            MigrationRule::rename("a__b", "a__c"),
            MigrationRule::rename("a__c", "a__d"),
        ])
        .unwrap_err();
        assert!(matches!(err, MigrationError::SelfFeedingRule { .. }));

        let err = MigrationEngine::new(vec![MigrationRule::rename("a__b", "a__b")]).unwrap_err();
        assert!(matches!(err, MigrationError::SelfFeedingRule { .. }));
    }

    #[test]
    fn test_empty_engine_keeps_everything() {
        let raw = map(&[("a__b", "1"), ("c__d", "2")]);
        let outcome = MigrationEngine::empty().apply(raw.clone());
        assert_eq!(outcome.entries, raw);
        assert!(!outcome.report.has_changes());
    }
}
