//! Raw entries and the actions a migration can take on them.

use std::fmt;

/// One untyped persisted `(key, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub key: String,
    pub raw_value: String,
}

impl RawEntry {
    pub fn new(key: impl Into<String>, raw_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            raw_value: raw_value.into(),
        }
    }

    /// Applies an action, returning the entry that survives, if any.
    pub fn apply(self, action: &MigrationAction) -> Option<RawEntry> {
        match action {
            MigrationAction::KeepAsIs => Some(self),
            MigrationAction::Transform {
                new_key,
                new_raw_value,
            } => Some(RawEntry {
                key: new_key.clone(),
                raw_value: new_raw_value.clone().unwrap_or(self.raw_value),
            }),
            MigrationAction::Reset => None,
        }
    }
}

/// The migration engine's decision for one raw entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationAction {
    /// Entry passes through unchanged
    KeepAsIs,
    /// Entry is renamed and/or its value rewritten; `None` keeps the original value
    Transform {
        new_key: String,
        new_raw_value: Option<String>,
    },
    /// Entry is deleted; a matching schema slot reverts to its default
    Reset,
}

impl MigrationAction {
    pub fn rename(new_key: impl Into<String>) -> Self {
        MigrationAction::Transform {
            new_key: new_key.into(),
            new_raw_value: None,
        }
    }

    pub fn rewrite(new_key: impl Into<String>, new_raw_value: impl Into<String>) -> Self {
        MigrationAction::Transform {
            new_key: new_key.into(),
            new_raw_value: Some(new_raw_value.into()),
        }
    }

    /// Short label used in logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            MigrationAction::KeepAsIs => "keep",
            MigrationAction::Transform { .. } => "transform",
            MigrationAction::Reset => "reset",
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, MigrationAction::KeepAsIs)
    }
}

impl fmt::Display for MigrationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationAction::KeepAsIs => write!(f, "keep"),
            MigrationAction::Transform {
                new_key,
                new_raw_value: None,
            } => write!(f, "rename -> {}", new_key),
            MigrationAction::Transform {
                new_key,
                new_raw_value: Some(_),
            } => write!(f, "rewrite -> {}", new_key),
            MigrationAction::Reset => write!(f, "reset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_rename_keeps_value() {
        let entry = RawEntry::new("advanced__show_app_icon", "false");
        let out = entry.apply(&MigrationAction::rename("other__show_app_icon"));
        assert_eq!(out, Some(RawEntry::new("other__show_app_icon", "false")));
    }

    #[test]
    fn test_apply_rewrite_replaces_value() {
        let entry = RawEntry::new("old__key", "RGBA");
        let out = entry.apply(&MigrationAction::rewrite("new__key", "RGB"));
        assert_eq!(out, Some(RawEntry::new("new__key", "RGB")));
    }

    #[test]
    fn test_apply_reset_drops_entry() {
        let entry = RawEntry::new("keyboard__one_handed_mode", "END");
        assert_eq!(entry.apply(&MigrationAction::Reset), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(MigrationAction::rename("a__b").to_string(), "rename -> a__b");
        assert_eq!(MigrationAction::Reset.kind(), "reset");
    }
}
