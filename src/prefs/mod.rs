//! The keyboard application's preference schema
//!
//! Groups, keys and defaults of the live settings model, plus the rule
//! table that carries data from earlier releases forward. Feature modules
//! that were removed (devtools, dictionary, glide typing, smartbar,
//! spelling, suggestion, one-handed mode) have no slots here; their keys
//! are either reset by a rule or left inert in the file.
//!
//! ```ignore
//! let app = AppStore::open(&config)?;
//! app.load()?;
//! let hints = app.prefs.keyboard.key_hint_configuration()?;
//! ```

mod emoji;
mod rules;
mod types;

pub use emoji::{Emoji, EmojiHistory, MAX_SIZE_UNLIMITED};
pub use rules::{standard_engine, standard_rules};
pub use types::{
    AppTheme, CapitalizationBehavior, ColorRepresentation, DisplayKbdAfterDialogs,
    DisplayLanguageNamesIn, EmojiHairStyle, EmojiSkinTone, EmojiSuggestionType,
    HapticVibrationMode, InputFeedbackActivationMode, KeyHintConfiguration, KeyHintMode,
    Orientation, SnyggLevel, SpaceBarMode, SwipeAction, ThemeMode, UpdateStrategy,
    UtilityKeyAction,
};

use std::sync::Arc;

use chrono::NaiveTime;

use crate::codec::{AccentColor, DEFAULT_GREEN};
use crate::config::StoreConfig;
use crate::model::{GroupBuilder, Pref, PreferenceModel, SchemaBuilder, SchemaResult};
use crate::store::{LoadSummary, LoadedSignal, ReactiveStore, StoreResult};

/// Process-wide store name
pub const STORE_NAME: &str = "prefdb-app-prefs";

/// Version string before any version has been recorded
pub const DEFAULT_VERSION_NAME: &str = "0.0.0";

/// Id of the built-in fallback subtype
pub const DEFAULT_SUBTYPE_ID: i64 = -1;

/// Platform facts that select compiled defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaOptions {
    /// The platform supplies a dynamic accent color
    pub dynamic_colors: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            dynamic_colors: true,
        }
    }
}

impl SchemaOptions {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            dynamic_colors: config.dynamic_colors,
        }
    }

    /// Default accent: defer to the platform when it has dynamic colors.
    pub fn default_accent_color(&self) -> AccentColor {
        if self.dynamic_colors {
            AccentColor::Unspecified
        } else {
            DEFAULT_GREEN
        }
    }
}

fn hour_of_day(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default()
}

pub struct Correction {
    pub auto_capitalization: Pref<bool>,
    pub auto_space_punctuation: Pref<bool>,
    pub double_space_period: Pref<bool>,
    pub remember_caps_lock_state: Pref<bool>,
}

impl Correction {
    fn declare(g: &mut GroupBuilder<'_>) -> Self {
        Self {
            auto_capitalization: g.boolean("correction__auto_capitalization", true),
            auto_space_punctuation: g.boolean("correction__auto_space_punctuation", false),
            double_space_period: g.boolean("correction__double_space_period", true),
            remember_caps_lock_state: g.boolean("correction__remember_caps_lock_state", false),
        }
    }
}

pub struct EmojiPrefs {
    pub preferred_skin_tone: Pref<EmojiSkinTone>,
    pub preferred_hair_style: Pref<EmojiHairStyle>,
    pub history_enabled: Pref<bool>,
    pub history_data: Pref<EmojiHistory>,
    pub history_pinned_update_strategy: Pref<UpdateStrategy>,
    pub history_pinned_max_size: Pref<i32>,
    pub history_recent_update_strategy: Pref<UpdateStrategy>,
    pub history_recent_max_size: Pref<i32>,
    pub suggestion_enabled: Pref<bool>,
    pub suggestion_type: Pref<EmojiSuggestionType>,
    pub suggestion_update_history: Pref<bool>,
    pub suggestion_candidate_show_name: Pref<bool>,
    pub suggestion_query_min_length: Pref<i32>,
    pub suggestion_candidate_max_count: Pref<i32>,
}

impl EmojiPrefs {
    fn declare(g: &mut GroupBuilder<'_>) -> Self {
        Self {
            preferred_skin_tone: g.enumeration("emoji__preferred_skin_tone", EmojiSkinTone::Default),
            preferred_hair_style: g
                .enumeration("emoji__preferred_hair_style", EmojiHairStyle::Default),
            history_enabled: g.boolean("emoji__history_enabled", true),
            history_data: g.json("emoji__history_data", EmojiHistory::EMPTY),
            history_pinned_update_strategy: g.enumeration(
                "emoji__history_pinned_update_strategy",
                UpdateStrategy::ManualSortPrepend,
            ),
            history_pinned_max_size: g.int("emoji__history_pinned_max_size", MAX_SIZE_UNLIMITED),
            history_recent_update_strategy: g.enumeration(
                "emoji__history_recent_update_strategy",
                UpdateStrategy::AutoSortPrepend,
            ),
            history_recent_max_size: g.int("emoji__history_recent_max_size", 90),
            suggestion_enabled: g.boolean("emoji__suggestion_enabled", true),
            suggestion_type: g
                .enumeration("emoji__suggestion_type", EmojiSuggestionType::LeadingColon),
            suggestion_update_history: g.boolean("emoji__suggestion_update_history", true),
            suggestion_candidate_show_name: g
                .boolean("emoji__suggestion_candidate_show_name", false),
            suggestion_query_min_length: g.int("emoji__suggestion_query_min_length", 3),
            suggestion_candidate_max_count: g.int("emoji__suggestion_candidate_max_count", 5),
        }
    }
}

pub struct Gestures {
    pub swipe_up: Pref<SwipeAction>,
    pub swipe_down: Pref<SwipeAction>,
    pub swipe_left: Pref<SwipeAction>,
    pub swipe_right: Pref<SwipeAction>,
    pub space_bar_swipe_up: Pref<SwipeAction>,
    pub space_bar_swipe_left: Pref<SwipeAction>,
    pub space_bar_swipe_right: Pref<SwipeAction>,
    pub space_bar_long_press: Pref<SwipeAction>,
    pub delete_key_swipe_left: Pref<SwipeAction>,
    pub delete_key_long_press: Pref<SwipeAction>,
    pub swipe_distance_threshold: Pref<i32>,
    pub swipe_velocity_threshold: Pref<i32>,
}

impl Gestures {
    fn declare(g: &mut GroupBuilder<'_>) -> Self {
        use SwipeAction::*;
        Self {
            swipe_up: g.enumeration("gestures__swipe_up", Shift),
            swipe_down: g.enumeration("gestures__swipe_down", HideKeyboard),
            swipe_left: g.enumeration("gestures__swipe_left", SwitchToNextSubtype),
            swipe_right: g.enumeration("gestures__swipe_right", SwitchToPrevSubtype),
            space_bar_swipe_up: g.enumeration("gestures__space_bar_swipe_up", NoAction),
            space_bar_swipe_left: g.enumeration("gestures__space_bar_swipe_left", MoveCursorLeft),
            space_bar_swipe_right: g
                .enumeration("gestures__space_bar_swipe_right", MoveCursorRight),
            space_bar_long_press: g
                .enumeration("gestures__space_bar_long_press", ShowInputMethodPicker),
            delete_key_swipe_left: g
                .enumeration("gestures__delete_key_swipe_left", DeleteCharactersPrecisely),
            delete_key_long_press: g.enumeration("gestures__delete_key_long_press", DeleteCharacter),
            swipe_distance_threshold: g.int("gestures__swipe_distance_threshold", 32),
            swipe_velocity_threshold: g.int("gestures__swipe_velocity_threshold", 1900),
        }
    }
}

pub struct InputFeedback {
    pub audio_enabled: Pref<bool>,
    pub audio_activation_mode: Pref<InputFeedbackActivationMode>,
    pub audio_volume: Pref<i32>,
    pub audio_feat_key_press: Pref<bool>,
    pub audio_feat_key_long_press: Pref<bool>,
    pub audio_feat_key_repeated_action: Pref<bool>,
    pub audio_feat_gesture_swipe: Pref<bool>,
    pub audio_feat_gesture_moving_swipe: Pref<bool>,
    pub haptic_enabled: Pref<bool>,
    pub haptic_activation_mode: Pref<InputFeedbackActivationMode>,
    pub haptic_vibration_mode: Pref<HapticVibrationMode>,
    pub haptic_vibration_duration: Pref<i32>,
    pub haptic_vibration_strength: Pref<i32>,
    pub haptic_feat_key_press: Pref<bool>,
    pub haptic_feat_key_long_press: Pref<bool>,
    pub haptic_feat_key_repeated_action: Pref<bool>,
    pub haptic_feat_gesture_swipe: Pref<bool>,
    pub haptic_feat_gesture_moving_swipe: Pref<bool>,
}

impl InputFeedback {
    fn declare(g: &mut GroupBuilder<'_>) -> Self {
        let respect = InputFeedbackActivationMode::RespectSystemSettings;
        Self {
            audio_enabled: g.boolean("input_feedback__audio_enabled", true),
            audio_activation_mode: g.enumeration("input_feedback__audio_activation_mode", respect),
            audio_volume: g.int("input_feedback__audio_volume", 50),
            audio_feat_key_press: g.boolean("input_feedback__audio_feat_key_press", true),
            audio_feat_key_long_press: g.boolean("input_feedback__audio_feat_key_long_press", false),
            audio_feat_key_repeated_action: g
                .boolean("input_feedback__audio_feat_key_repeated_action", false),
            audio_feat_gesture_swipe: g.boolean("input_feedback__audio_feat_gesture_swipe", false),
            audio_feat_gesture_moving_swipe: g
                .boolean("input_feedback__audio_feat_gesture_moving_swipe", false),
            haptic_enabled: g.boolean("input_feedback__haptic_enabled", true),
            haptic_activation_mode: g
                .enumeration("input_feedback__haptic_activation_mode", respect),
            haptic_vibration_mode: g.enumeration(
                "input_feedback__haptic_vibration_mode",
                HapticVibrationMode::UseVibratorDirectly,
            ),
            haptic_vibration_duration: g.int("input_feedback__haptic_vibration_duration", 50),
            haptic_vibration_strength: g.int("input_feedback__haptic_vibration_strength", 50),
            haptic_feat_key_press: g.boolean("input_feedback__haptic_feat_key_press", true),
            haptic_feat_key_long_press: g
                .boolean("input_feedback__haptic_feat_key_long_press", false),
            haptic_feat_key_repeated_action: g
                .boolean("input_feedback__haptic_feat_key_repeated_action", true),
            haptic_feat_gesture_swipe: g.boolean("input_feedback__haptic_feat_gesture_swipe", false),
            haptic_feat_gesture_moving_swipe: g
                .boolean("input_feedback__haptic_feat_gesture_moving_swipe", true),
        }
    }
}

pub struct Internal {
    pub home_is_beta_toolbox_collapsed: Pref<bool>,
    pub version_on_install: Pref<String>,
    pub version_last_use: Pref<String>,
    pub version_last_changelog: Pref<String>,
}

impl Internal {
    fn declare(g: &mut GroupBuilder<'_>) -> Self {
        Self {
            home_is_beta_toolbox_collapsed: g
                .boolean("internal__home_is_beta_toolbox_collapsed_040a01", false),
            version_on_install: g.string("internal__version_on_install", DEFAULT_VERSION_NAME),
            version_last_use: g.string("internal__version_last_use", DEFAULT_VERSION_NAME),
            version_last_changelog: g
                .string("internal__version_last_changelog", DEFAULT_VERSION_NAME),
        }
    }
}

pub struct Keyboard {
    pub number_row: Pref<bool>,
    pub hinted_number_row_enabled: Pref<bool>,
    pub hinted_number_row_mode: Pref<KeyHintMode>,
    pub hinted_symbols_enabled: Pref<bool>,
    pub hinted_symbols_mode: Pref<KeyHintMode>,
    pub utility_key_enabled: Pref<bool>,
    pub utility_key_action: Pref<UtilityKeyAction>,
    pub space_bar_mode: Pref<SpaceBarMode>,
    pub capitalization_behavior: Pref<CapitalizationBehavior>,
    pub font_size_multiplier_portrait: Pref<i32>,
    pub font_size_multiplier_landscape: Pref<i32>,
    pub height_factor_portrait: Pref<i32>,
    pub height_factor_landscape: Pref<i32>,
    pub key_spacing_vertical: Pref<f32>,
    pub key_spacing_horizontal: Pref<f32>,
    pub bottom_offset_portrait: Pref<i32>,
    pub bottom_offset_landscape: Pref<i32>,
    pub popup_enabled: Pref<bool>,
    pub merge_hint_popups_enabled: Pref<bool>,
    pub long_press_delay: Pref<i32>,
    pub space_bar_switches_to_characters: Pref<bool>,
}

impl Keyboard {
    fn declare(g: &mut GroupBuilder<'_>) -> Self {
        Self {
            number_row: g.boolean("keyboard__number_row", false),
            hinted_number_row_enabled: g.boolean("keyboard__hinted_number_row_enabled", true),
            hinted_number_row_mode: g
                .enumeration("keyboard__hinted_number_row_mode", KeyHintMode::SmartPriority),
            hinted_symbols_enabled: g.boolean("keyboard__hinted_symbols_enabled", true),
            hinted_symbols_mode: g
                .enumeration("keyboard__hinted_symbols_mode", KeyHintMode::SmartPriority),
            utility_key_enabled: g.boolean("keyboard__utility_key_enabled", true),
            utility_key_action: g.enumeration(
                "keyboard__utility_key_action",
                UtilityKeyAction::DynamicSwitchLanguageEmojis,
            ),
            space_bar_mode: g
                .enumeration("keyboard__space_bar_display_mode", SpaceBarMode::CurrentLanguage),
            capitalization_behavior: g.enumeration(
                "keyboard__capitalization_behavior",
                CapitalizationBehavior::CapslockByDoubleTap,
            ),
            font_size_multiplier_portrait: g.int("keyboard__font_size_multiplier_portrait", 100),
            font_size_multiplier_landscape: g.int("keyboard__font_size_multiplier_landscape", 100),
            height_factor_portrait: g.int("keyboard__height_factor_portrait", 100),
            height_factor_landscape: g.int("keyboard__height_factor_landscape", 100),
            key_spacing_vertical: g.float("keyboard__key_spacing_vertical", 5.0),
            key_spacing_horizontal: g.float("keyboard__key_spacing_horizontal", 2.0),
            bottom_offset_portrait: g.int("keyboard__bottom_offset_portrait", 0),
            bottom_offset_landscape: g.int("keyboard__bottom_offset_landscape", 0),
            popup_enabled: g.boolean("keyboard__popup_enabled", true),
            merge_hint_popups_enabled: g.boolean("keyboard__merge_hint_popups_enabled", false),
            long_press_delay: g.int("keyboard__long_press_delay", 300),
            space_bar_switches_to_characters: g
                .boolean("keyboard__space_bar_switches_to_characters", true),
        }
    }

    /// Hint modes in effect; a disabled toggle forces its mode to `DISABLED`.
    pub fn key_hint_configuration(&self) -> StoreResult<KeyHintConfiguration> {
        let number_hint_mode = if self.hinted_number_row_enabled.get()? {
            self.hinted_number_row_mode.get()?
        } else {
            KeyHintMode::Disabled
        };
        let symbol_hint_mode = if self.hinted_symbols_enabled.get()? {
            self.hinted_symbols_mode.get()?
        } else {
            KeyHintMode::Disabled
        };
        Ok(KeyHintConfiguration {
            number_hint_mode,
            symbol_hint_mode,
            merge_hint_popups: self.merge_hint_popups_enabled.get()?,
        })
    }

    /// Font scale for the orientation, as a factor (100 % is `1.0`).
    pub fn font_size_multiplier(&self, orientation: Orientation) -> StoreResult<f32> {
        let percent = match orientation {
            Orientation::Portrait => self.font_size_multiplier_portrait.get()?,
            Orientation::Landscape => self.font_size_multiplier_landscape.get()?,
        };
        Ok(percent as f32 / 100.0)
    }
}

pub struct Localization {
    pub display_language_names_in: Pref<DisplayLanguageNamesIn>,
    pub display_keyboard_labels_in_subtype_language: Pref<bool>,
    pub active_subtype_id: Pref<i64>,
    /// Serialized subtype list, owned by the subtype manager
    pub subtypes: Pref<String>,
}

impl Localization {
    fn declare(g: &mut GroupBuilder<'_>) -> Self {
        Self {
            display_language_names_in: g.enumeration(
                "localization__display_language_names_in",
                DisplayLanguageNamesIn::SystemLocale,
            ),
            display_keyboard_labels_in_subtype_language: g
                .boolean("localization__display_keyboard_labels_in_subtype_language", false),
            active_subtype_id: g.long("localization__active_subtype_id", DEFAULT_SUBTYPE_ID),
            subtypes: g.string("localization__subtypes", "[]"),
        }
    }
}

pub struct Other {
    pub settings_theme: Pref<AppTheme>,
    pub accent_color: Pref<AccentColor>,
    pub settings_language: Pref<String>,
    pub show_app_icon: Pref<bool>,
}

impl Other {
    fn declare(g: &mut GroupBuilder<'_>, options: &SchemaOptions) -> Self {
        Self {
            settings_theme: g.enumeration("other__settings_theme", AppTheme::Auto),
            accent_color: g.color("other__accent_color", options.default_accent_color()),
            settings_language: g.string("other__settings_language", "auto"),
            show_app_icon: g.boolean("other__show_app_icon", true),
        }
    }
}

pub struct PhysicalKeyboard {
    pub show_on_screen_keyboard: Pref<bool>,
}

impl PhysicalKeyboard {
    fn declare(g: &mut GroupBuilder<'_>) -> Self {
        Self {
            show_on_screen_keyboard: g
                .boolean("physical_keyboard__show_on_screen_keyboard", false),
        }
    }
}

pub struct Theme {
    pub mode: Pref<ThemeMode>,
    pub accent_color: Pref<AccentColor>,
    pub sunrise_time: Pref<NaiveTime>,
    pub sunset_time: Pref<NaiveTime>,
    pub editor_color_representation: Pref<ColorRepresentation>,
    pub editor_display_kbd_after_dialogs: Pref<DisplayKbdAfterDialogs>,
    pub editor_level: Pref<SnyggLevel>,
}

impl Theme {
    fn declare(g: &mut GroupBuilder<'_>, options: &SchemaOptions) -> Self {
        Self {
            mode: g.enumeration("theme__mode", ThemeMode::FollowSystem),
            accent_color: g.color("theme__accent_color", options.default_accent_color()),
            sunrise_time: g.local_time("theme__sunrise_time", hour_of_day(6)),
            sunset_time: g.local_time("theme__sunset_time", hour_of_day(18)),
            editor_color_representation: g
                .enumeration("theme__editor_color_representation", ColorRepresentation::Hex),
            editor_display_kbd_after_dialogs: g.enumeration(
                "theme__editor_display_kbd_after_dialogs",
                DisplayKbdAfterDialogs::Remember,
            ),
            editor_level: g.enumeration("theme__editor_level", SnyggLevel::Advanced),
        }
    }
}

/// Typed handles to every application preference, grouped.
pub struct AppPrefs {
    pub correction: Correction,
    pub emoji: EmojiPrefs,
    pub gestures: Gestures,
    pub input_feedback: InputFeedback,
    pub internal: Internal,
    pub keyboard: Keyboard,
    pub localization: Localization,
    pub other: Other,
    pub physical_keyboard: PhysicalKeyboard,
    pub theme: Theme,
}

impl AppPrefs {
    /// Declares the schema, returning the handles and the validated model.
    pub fn schema(options: &SchemaOptions) -> SchemaResult<(AppPrefs, PreferenceModel)> {
        let mut schema = SchemaBuilder::new();
        let correction = Correction::declare(&mut schema.group("correction"));
        let emoji = EmojiPrefs::declare(&mut schema.group("emoji"));
        let gestures = Gestures::declare(&mut schema.group("gestures"));
        let input_feedback = InputFeedback::declare(&mut schema.group("input_feedback"));
        let internal = Internal::declare(&mut schema.group("internal"));
        let keyboard = Keyboard::declare(&mut schema.group("keyboard"));
        let localization = Localization::declare(&mut schema.group("localization"));
        let other = Other::declare(&mut schema.group("other"), options);
        let physical_keyboard = PhysicalKeyboard::declare(&mut schema.group("physical_keyboard"));
        let theme = Theme::declare(&mut schema.group("theme"), options);

        let prefs = AppPrefs {
            correction,
            emoji,
            gestures,
            input_feedback,
            internal,
            keyboard,
            localization,
            other,
            physical_keyboard,
            theme,
        };
        Ok((prefs, schema.build()?))
    }
}

/// The application schema bound to its store.
pub struct AppStore {
    pub prefs: AppPrefs,
    pub store: Arc<ReactiveStore>,
}

impl AppStore {
    /// File-backed store at the configured location, with the standard
    /// rule table. Nothing is read until [`load`](Self::load).
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let (prefs, model) = AppPrefs::schema(&SchemaOptions::from_config(config))?;
        let store = ReactiveStore::open(config, model, standard_engine()?);
        Ok(Self {
            prefs,
            store: Arc::new(store),
        })
    }

    /// Binds the schema over an arbitrary store built from its model.
    pub fn with_store(
        options: &SchemaOptions,
        build: impl FnOnce(PreferenceModel) -> ReactiveStore,
    ) -> StoreResult<Self> {
        let (prefs, model) = AppPrefs::schema(options)?;
        Ok(Self {
            prefs,
            store: Arc::new(build(model)),
        })
    }

    pub fn load(&self) -> StoreResult<LoadSummary> {
        self.store.load()
    }

    pub fn signal(&self) -> LoadedSignal {
        self.store.signal()
    }
}
