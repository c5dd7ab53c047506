//! Codecs between typed preference values and their raw string form
//!
//! A codec is total in both directions from the caller's point of view:
//! `encode` always yields a string, and decoding never raises. A raw value
//! that is not a valid encoding yields `None` from `try_decode`, and the
//! owning entry substitutes its compiled default.
//!
//! | Codec | Raw form |
//! |---|---|
//! | [`BoolCodec`] | `true` / `false` |
//! | [`IntCodec`], [`LongCodec`] | decimal integer |
//! | [`FloatCodec`] | shortest round-trip decimal |
//! | [`StringCodec`] | the string itself |
//! | [`LabelCodec`] | enum label (`SCREAMING_SNAKE_CASE`) |
//! | [`JsonCodec`] | compact JSON document |
//! | [`LocalTimeCodec`] | `HH:MM` |
//! | [`AccentColorCodec`] | `unspecified` or `#AARRGGBB` |

mod color;
mod json;
mod label;
mod primitives;
mod time;

pub use color::{AccentColor, AccentColorCodec, DEFAULT_GREEN};
pub use json::JsonCodec;
pub use label::LabelCodec;
pub use primitives::{BoolCodec, DisplayCodec, FloatCodec, IntCodec, LongCodec, StringCodec};
pub use time::LocalTimeCodec;

/// Bidirectional mapping between a value and its persisted string.
pub trait Codec<T>: Send + Sync {
    /// Encodes a value. Must be total.
    fn encode(&self, value: &T) -> String;

    /// Decodes a raw value, returning `None` for anything that is not a
    /// valid encoding.
    fn try_decode(&self, raw: &str) -> Option<T>;

    /// Decodes a raw value, falling back to `default` on malformed input.
    fn decode_or(&self, raw: &str, default: &T) -> T
    where
        T: Clone,
    {
        self.try_decode(raw).unwrap_or_else(|| default.clone())
    }
}
