//! Migration Invariant Tests
//!
//! - Every raw entry maps to exactly one action
//! - A second pass over migrated data changes nothing
//! - Corrupt legacy data resets one entry and never fails the pass
//! - Legacy emoji lists keep every non-empty glyph
//! - An existing target entry wins over a legacy one
//! - Invalid rule tables are rejected at construction

use std::collections::BTreeMap;

use prefdb::migration::{
    MigrationAction, MigrationEngine, MigrationError, MigrationOutcomeKind, MigrationRule,
    RawEntry,
};
use prefdb::prefs::{standard_engine, standard_rules, EmojiHistory};

// =============================================================================
// Test Utilities
// =============================================================================

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn legacy_file() -> BTreeMap<String, String> {
    map(&[
        ("media__emoji_recently_used", "😀;😂;🎉"),
        ("media__emoji_recently_used_max_size", "40"),
        ("advanced__settings_theme", "DARK"),
        ("advanced__accent_color", "#FF2196F3"),
        ("advanced__settings_language", "de"),
        ("advanced__show_app_icon", "false"),
        ("advanced__incognito_mode", "true"),
        ("keyboard__one_handed_mode", "END"),
        ("smartbar__action_arrangement", "{}"),
        ("theme__editor_display_colors_as", "RGBA"),
        ("keyboard__number_row", "true"),
        ("spelling__use_contacts", "true"),
    ])
}

// =============================================================================
// Totality and determinism
// =============================================================================

#[test]
fn test_unmatched_keys_are_kept_as_is() {
    let engine = standard_engine().unwrap();
    for key in ["keyboard__number_row", "theme__mode", "", "no_separator", "x__y__z"] {
        assert_eq!(
            engine.migrate(&RawEntry::new(key, "anything")),
            MigrationAction::KeepAsIs,
            "key {key:?}"
        );
    }
}

#[test]
fn test_pass_is_deterministic() {
    let engine = standard_engine().unwrap();
    let first = engine.apply(legacy_file());
    let second = engine.apply(legacy_file());
    assert_eq!(first, second);
}

#[test]
fn test_legacy_file_migrates_fully() {
    let outcome = standard_engine().unwrap().apply(legacy_file());
    let entries = &outcome.entries;

    assert_eq!(entries["other__settings_theme"], "DARK");
    assert_eq!(entries["other__accent_color"], "#FF2196F3");
    assert_eq!(entries["other__settings_language"], "de");
    assert_eq!(entries["other__show_app_icon"], "false");
    assert_eq!(entries["emoji__history_recent_max_size"], "40");
    assert_eq!(entries["theme__editor_color_representation"], "RGB");
    assert_eq!(entries["keyboard__number_row"], "true");
    // No rule: kept, even though no slot claims it
    assert_eq!(entries["spelling__use_contacts"], "true");

    let history: EmojiHistory = serde_json::from_str(&entries["emoji__history_data"]).unwrap();
    let recent: Vec<&str> = history.recent.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(recent, vec!["😀", "😂", "🎉"]);

    for gone in [
        "media__emoji_recently_used",
        "advanced__incognito_mode",
        "keyboard__one_handed_mode",
        "smartbar__action_arrangement",
        "theme__editor_display_colors_as",
    ] {
        assert!(!entries.contains_key(gone), "{gone} should be gone");
    }

    let report = &outcome.report;
    assert_eq!(report.transformed, 7);
    assert_eq!(report.reset, 3);
    assert_eq!(report.kept, 2);
    assert!(report.has_changes());
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn test_second_pass_is_a_no_op() {
    let engine = standard_engine().unwrap();
    let once = engine.apply(legacy_file());
    let twice = engine.apply(once.entries.clone());

    assert_eq!(twice.entries, once.entries);
    assert!(!twice.report.has_changes());
    assert!(twice.report.applied.is_empty());
}

// =============================================================================
// Corrupt legacy data
// =============================================================================

/// Legacy counter stored as `"n/limit"`; anything else is unreadable.
fn counter_from_legacy(raw: &str) -> Result<String, MigrationError> {
    raw.split_once('/')
        .and_then(|(count, _)| count.parse::<u32>().ok())
        .map(|count| count.to_string())
        .ok_or_else(|| MigrationError::corrupt("legacy__counter", "not a counter"))
}

fn counter_engine() -> MigrationEngine {
    MigrationEngine::new(vec![
        MigrationRule::rewrite("legacy__counter", "stats__counter", counter_from_legacy),
        MigrationRule::rename("advanced__show_app_icon", "other__show_app_icon"),
    ])
    .unwrap()
}

#[test]
fn test_corrupt_legacy_value_resets_only_that_entry() {
    let outcome = counter_engine().apply(map(&[
        ("legacy__counter", "garbage"),
        ("advanced__show_app_icon", "false"),
    ]));

    assert!(!outcome.entries.contains_key("legacy__counter"));
    assert!(!outcome.entries.contains_key("stats__counter"));
    assert_eq!(outcome.entries["other__show_app_icon"], "false");
    assert_eq!(outcome.report.downgraded, 1);

    let downgraded = outcome
        .report
        .applied
        .iter()
        .find(|a| a.key == "legacy__counter")
        .unwrap();
    assert_eq!(downgraded.outcome, MigrationOutcomeKind::Downgraded);
}

#[test]
fn test_try_migrate_surfaces_corruption() {
    let err = counter_engine()
        .try_migrate(&RawEntry::new("legacy__counter", "7"))
        .unwrap_err();
    assert!(matches!(err, MigrationError::CorruptLegacyValue { .. }));
    assert!(!err.is_fatal());
}

#[test]
fn test_emoji_list_with_empty_segments_keeps_its_glyphs() {
    let outcome = standard_engine().unwrap().apply(map(&[
        ("media__emoji_recently_used", "😀;;🎉;"),
    ]));

    assert_eq!(outcome.report.downgraded, 0);
    let history: EmojiHistory =
        serde_json::from_str(&outcome.entries["emoji__history_data"]).unwrap();
    let glyphs: Vec<&str> = history.recent.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(glyphs, vec!["😀", "🎉"]);
}

// =============================================================================
// Conflicts
// =============================================================================

#[test]
fn test_existing_target_wins_over_legacy_entry() {
    let engine = standard_engine().unwrap();
    let outcome = engine.apply(map(&[
        ("advanced__settings_theme", "DARK"),
        ("other__settings_theme", "LIGHT"),
    ]));

    assert_eq!(outcome.entries, map(&[("other__settings_theme", "LIGHT")]));
    assert_eq!(outcome.report.conflicts, 1);
}

// =============================================================================
// Rule table validation
// =============================================================================

#[test]
fn test_duplicate_rule_is_rejected() {
    let mut rules = standard_rules();
    rules.push(MigrationRule::reset("advanced__settings_theme"));
    assert!(matches!(
        MigrationEngine::new(rules),
        Err(MigrationError::DuplicateRule { ref key }) if key == "advanced__settings_theme"
    ));
}

#[test]
fn test_chained_rules_are_rejected() {
    let rules = vec![
        MigrationRule::rename("a__old", "a__mid"),
        MigrationRule::rename("a__mid", "a__new"),
    ];
    let err = MigrationEngine::new(rules).unwrap_err();
    assert!(matches!(err, MigrationError::SelfFeedingRule { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_every_standard_rule_notes_its_lifetime_or_is_a_reset() {
    for rule in standard_rules() {
        assert!(
            rule.keep_until_cycle().is_some() || rule.target().is_none(),
            "{} has no keep-until note",
            rule.from()
        );
    }
}
