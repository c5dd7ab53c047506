//! Value types of the application schema.
//!
//! Enums persist by label; an unrecognized label loads as the entry's
//! default, so adding or removing a variant never breaks older data.

use serde::{Deserialize, Serialize};

macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }
    };
}

label_enum!(
    /// Skin tone modifier applied to emoji that support one
    EmojiSkinTone {
        Default,
        LightSkinTone,
        MediumLightSkinTone,
        MediumSkinTone,
        MediumDarkSkinTone,
        DarkSkinTone,
    }
);

label_enum!(
    EmojiHairStyle {
        Default,
        RedHair,
        CurlyHair,
        WhiteHair,
        Bald,
    }
);

label_enum!(
    /// How a list in the emoji history is reordered on use
    UpdateStrategy {
        AutoSortPrepend,
        AutoSortAppend,
        ManualSortPrepend,
        ManualSortAppend,
    }
);

label_enum!(
    EmojiSuggestionType {
        LeadingColon,
        InlineText,
    }
);

label_enum!(
    /// Action bound to a swipe or long-press gesture
    SwipeAction {
        NoAction,
        CycleToPreviousKeyboardMode,
        CycleToNextKeyboardMode,
        DeleteWord,
        DeleteWordsPrecisely,
        DeleteCharacter,
        DeleteCharactersPrecisely,
        HideKeyboard,
        InsertSpace,
        MoveCursorUp,
        MoveCursorDown,
        MoveCursorLeft,
        MoveCursorRight,
        MoveCursorStartOfLine,
        MoveCursorEndOfLine,
        MoveCursorStartOfPage,
        MoveCursorEndOfPage,
        Shift,
        Redo,
        Undo,
        SwitchToClipboardContext,
        ShowInputMethodPicker,
        SwitchToPrevSubtype,
        SwitchToNextSubtype,
        SwitchToPrevKeyboard,
    }
);

label_enum!(
    InputFeedbackActivationMode {
        RespectSystemSettings,
        IgnoreSystemSettings,
    }
);

label_enum!(
    HapticVibrationMode {
        UseVibratorDirectly,
        UseHapticFeedbackInterface,
    }
);

label_enum!(
    /// Which popup a hinted key prefers
    KeyHintMode {
        Disabled,
        AccentPriority,
        HintPriority,
        SmartPriority,
    }
);

label_enum!(
    UtilityKeyAction {
        SwitchToEmojis,
        SwitchLanguage,
        SwitchKeyboardApp,
        DynamicSwitchLanguageEmojis,
        Disabled,
    }
);

label_enum!(
    SpaceBarMode {
        Nothing,
        CurrentLanguage,
        SpaceBarKey,
    }
);

label_enum!(
    CapitalizationBehavior {
        CapslockByDoubleTap,
        CapslockByCycle,
    }
);

label_enum!(
    DisplayLanguageNamesIn {
        SystemLocale,
        NativeLocale,
    }
);

label_enum!(
    /// Theme of the settings app itself
    AppTheme {
        Auto,
        AutoAmoled,
        Light,
        Dark,
        AmoledDark,
    }
);

label_enum!(
    /// When the keyboard uses its night theme
    ThemeMode {
        AlwaysDay,
        AlwaysNight,
        FollowSystem,
        FollowTime,
    }
);

label_enum!(
    /// Color notation in the theme editor
    ColorRepresentation {
        Hex,
        Rgb,
        Hsv,
    }
);

label_enum!(
    DisplayKbdAfterDialogs {
        Always,
        Never,
        Remember,
    }
);

label_enum!(
    /// Theme editor complexity level
    SnyggLevel {
        Basic,
        Advanced,
        Developer,
    }
);

/// Screen orientation, supplied by the caller of derived accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Effective key hint settings, derived from the keyboard group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHintConfiguration {
    pub number_hint_mode: KeyHintMode,
    pub symbol_hint_mode: KeyHintMode,
    pub merge_hint_popups: bool,
}
