//! Accent color value and codec.

use serde::{Deserialize, Serialize};

use super::Codec;

/// Default accent on platforms without dynamic colors.
pub const DEFAULT_GREEN: AccentColor = AccentColor::Argb(0xFF4C_AF50);

const UNSPECIFIED_LABEL: &str = "unspecified";

/// An accent color preference.
///
/// `Unspecified` defers to the platform's dynamic color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccentColor {
    Unspecified,
    /// Packed `0xAARRGGBB`
    Argb(u32),
}

impl AccentColor {
    pub const fn from_argb(argb: u32) -> Self {
        AccentColor::Argb(argb)
    }

    /// Returns the packed value, if any.
    pub fn argb(&self) -> Option<u32> {
        match self {
            AccentColor::Unspecified => None,
            AccentColor::Argb(argb) => Some(*argb),
        }
    }
}

/// Codec for [`AccentColor`]: `unspecified` or `#AARRGGBB`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccentColorCodec;

impl Codec<AccentColor> for AccentColorCodec {
    fn encode(&self, value: &AccentColor) -> String {
        match value {
            AccentColor::Unspecified => UNSPECIFIED_LABEL.to_owned(),
            AccentColor::Argb(argb) => format!("#{:08X}", argb),
        }
    }

    fn try_decode(&self, raw: &str) -> Option<AccentColor> {
        if raw == UNSPECIFIED_LABEL {
            return Some(AccentColor::Unspecified);
        }
        let hex = raw.strip_prefix('#')?;
        if hex.len() != 8 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(AccentColor::Argb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let codec = AccentColorCodec;
        for color in [
            AccentColor::Unspecified,
            DEFAULT_GREEN,
            AccentColor::Argb(0),
            AccentColor::Argb(u32::MAX),
        ] {
            assert_eq!(codec.try_decode(&codec.encode(&color)), Some(color));
        }
        assert_eq!(codec.encode(&DEFAULT_GREEN), "#FF4CAF50");
    }

    #[test]
    fn test_lowercase_hex_is_accepted() {
        assert_eq!(
            AccentColorCodec.try_decode("#ff4caf50"),
            Some(DEFAULT_GREEN)
        );
    }

    #[test]
    fn test_malformed_falls_back() {
        let codec = AccentColorCodec;
        for raw in ["", "#FFF", "4CAF50FF", "#GG4CAF50", "#+FFFFFFF", "green"] {
            assert_eq!(codec.decode_or(raw, &DEFAULT_GREEN), DEFAULT_GREEN, "{raw}");
        }
    }
}
