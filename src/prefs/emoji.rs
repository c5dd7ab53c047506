//! Emoji history record, persisted as JSON under `emoji__history_data`.

use serde::{Deserialize, Serialize};

/// `emoji__history_*_max_size` value meaning "no limit"
pub const MAX_SIZE_UNLIMITED: i32 = 0;

/// One emoji as stored in the history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emoji {
    pub value: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Emoji {
    /// An emoji known only by its value.
    pub fn bare(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: String::new(),
            keywords: Vec::new(),
        }
    }
}

/// Pinned and recently used emoji.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiHistory {
    #[serde(default)]
    pub pinned: Vec<Emoji>,
    #[serde(default)]
    pub recent: Vec<Emoji>,
}

impl EmojiHistory {
    pub const EMPTY: EmojiHistory = EmojiHistory {
        pinned: Vec::new(),
        recent: Vec::new(),
    };

    pub fn with_recent(recent: Vec<Emoji>) -> Self {
        Self {
            pinned: Vec::new(),
            recent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty() && self.recent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Codec, JsonCodec};

    #[test]
    fn test_history_json_shape() {
        let history = EmojiHistory::with_recent(vec![Emoji::bare("😀")]);
        let raw = JsonCodec::<EmojiHistory>::new().encode(&history);
        assert_eq!(
            raw,
            r#"{"pinned":[],"recent":[{"value":"😀","name":"","keywords":[]}]}"#
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let history: EmojiHistory =
            serde_json::from_str(r#"{"recent":[{"value":"🎉"}]}"#).unwrap();
        assert!(history.pinned.is_empty());
        assert_eq!(history.recent, vec![Emoji::bare("🎉")]);
    }

    #[test]
    fn test_malformed_history_is_rejected() {
        assert_eq!(JsonCodec::<EmojiHistory>::new().try_decode("[1,2"), None);
        assert!(EmojiHistory::EMPTY.is_empty());
    }
}
