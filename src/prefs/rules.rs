//! Rule table for data written by earlier releases.
//!
//! Each rule notes the development cycle until which it is kept. Keys of
//! removed feature modules are reset so they do not linger in the file.

use super::emoji::{Emoji, EmojiHistory};
use super::types::ColorRepresentation;
use crate::codec::{Codec, LabelCodec};
use crate::migration::{MigrationEngine, MigrationError, MigrationResult, MigrationRule};

const LEGACY_EMOJI_RECENT: &str = "media__emoji_recently_used";
const LEGACY_COLOR_REPRESENTATION: &str = "theme__editor_display_colors_as";

/// The application's rule table, in evaluation-independent order.
pub fn standard_rules() -> Vec<MigrationRule> {
    vec![
        // Media prefs moved to emoji prefs
        MigrationRule::rewrite(LEGACY_EMOJI_RECENT, "emoji__history_data", emoji_history_from_legacy)
            .keep_until("0.6"),
        MigrationRule::rename(
            "media__emoji_recently_used_max_size",
            "emoji__history_recent_max_size",
        )
        .keep_until("0.6"),
        // Advanced prefs moved to other prefs
        MigrationRule::rename("advanced__settings_theme", "other__settings_theme").keep_until("0.7"),
        MigrationRule::rename("advanced__accent_color", "other__accent_color").keep_until("0.7"),
        MigrationRule::rename("advanced__settings_language", "other__settings_language")
            .keep_until("0.7"),
        MigrationRule::rename("advanced__show_app_icon", "other__show_app_icon").keep_until("0.7"),
        // Removed modules
        MigrationRule::reset("advanced__incognito_mode"),
        MigrationRule::reset("advanced__force_incognito_mode_from_dynamic"),
        MigrationRule::reset("keyboard__one_handed_mode"),
        MigrationRule::reset("smartbar__action_arrangement"),
        // Theme editor fine-tuning
        MigrationRule::rewrite(
            LEGACY_COLOR_REPRESENTATION,
            "theme__editor_color_representation",
            color_representation_from_legacy,
        )
        .keep_until("0.6"),
    ]
}

/// Engine over [`standard_rules`].
pub fn standard_engine() -> MigrationResult<MigrationEngine> {
    MigrationEngine::new(standard_rules())
}

/// `"😀;😂"` becomes a history whose recent list holds those emoji.
///
/// Empty segments carry no glyph and are skipped.
fn emoji_history_from_legacy(raw: &str) -> MigrationResult<String> {
    let recent: Vec<Emoji> = raw
        .split(';')
        .filter(|value| !value.is_empty())
        .map(Emoji::bare)
        .collect();

    serde_json::to_string(&EmojiHistory::with_recent(recent))
        .map_err(|e| MigrationError::corrupt(LEGACY_EMOJI_RECENT, e.to_string()))
}

/// `RGBA` maps to `RGB`; anything else maps to `HEX`.
fn color_representation_from_legacy(raw: &str) -> MigrationResult<String> {
    let representation = match raw {
        "RGBA" => ColorRepresentation::Rgb,
        _ => ColorRepresentation::Hex,
    };
    Ok(LabelCodec::<ColorRepresentation>::new().encode(&representation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::{MigrationAction, RawEntry};

    fn migrate(key: &str, raw: &str) -> MigrationAction {
        standard_engine().unwrap().migrate(&RawEntry::new(key, raw))
    }

    #[test]
    fn test_standard_table_is_valid() {
        let engine = standard_engine().unwrap();
        assert_eq!(engine.rules().len(), 11);
        assert_eq!(
            engine.rule_for("advanced__show_app_icon").unwrap().keep_until_cycle(),
            Some("0.7")
        );
    }

    #[test]
    fn test_emoji_list_becomes_history() {
        let (new_key, raw) = match migrate("media__emoji_recently_used", "😀;😂;🎉") {
            MigrationAction::Transform {
                new_key,
                new_raw_value: Some(raw),
            } => (new_key, raw),
            other => panic!("expected a rewrite, got {other}"),
        };
        assert_eq!(new_key, "emoji__history_data");
        let history: EmojiHistory = serde_json::from_str(&raw).unwrap();
        assert!(history.pinned.is_empty());
        assert_eq!(
            history.recent,
            vec![Emoji::bare("😀"), Emoji::bare("😂"), Emoji::bare("🎉")]
        );
    }

    #[test]
    fn test_empty_emoji_segments_are_skipped() {
        let recent = |raw: &str| -> Vec<Emoji> {
            let history: EmojiHistory =
                serde_json::from_str(&emoji_history_from_legacy(raw).unwrap()).unwrap();
            assert!(history.pinned.is_empty());
            history.recent
        };
        assert_eq!(
            recent("😀;😂;🎉;"),
            vec![Emoji::bare("😀"), Emoji::bare("😂"), Emoji::bare("🎉")]
        );
        assert_eq!(recent("😀;;🎉"), vec![Emoji::bare("😀"), Emoji::bare("🎉")]);
        assert!(recent("").is_empty());
        assert!(recent(";").is_empty());
    }

    #[test]
    fn test_trailing_separator_keeps_history() {
        match migrate("media__emoji_recently_used", "😀;😂;🎉;") {
            MigrationAction::Transform {
                new_key,
                new_raw_value: Some(_),
            } => assert_eq!(new_key, "emoji__history_data"),
            other => panic!("expected a rewrite, got {other}"),
        }
    }

    #[test]
    fn test_color_representation() {
        assert_eq!(
            migrate("theme__editor_display_colors_as", "RGBA"),
            MigrationAction::rewrite("theme__editor_color_representation", "RGB")
        );
        assert_eq!(
            migrate("theme__editor_display_colors_as", "garbage"),
            MigrationAction::rewrite("theme__editor_color_representation", "HEX")
        );
    }

    #[test]
    fn test_removed_modules_reset() {
        assert_eq!(migrate("keyboard__one_handed_mode", "END"), MigrationAction::Reset);
        assert_eq!(migrate("smartbar__action_arrangement", "{}"), MigrationAction::Reset);
        assert!(migrate("keyboard__number_row", "true").is_keep());
    }
}
