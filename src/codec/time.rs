//! Local wall-clock time codec (`HH:MM`).

use chrono::{NaiveTime, Timelike};

use super::Codec;

const FORMAT: &str = "%H:%M";

/// Codec for minute-precision local times.
///
/// Seconds are not part of the persisted form; encoding truncates them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimeCodec;

impl Codec<NaiveTime> for LocalTimeCodec {
    fn encode(&self, value: &NaiveTime) -> String {
        format!("{:02}:{:02}", value.hour(), value.minute())
    }

    fn try_decode(&self, raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw, FORMAT).ok()
    }
}
