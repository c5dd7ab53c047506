//! Codecs for primitive literal encodings.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use super::Codec;

/// Codec for any type whose `Display` output parses back through `FromStr`.
///
/// Rust's float formatting emits the shortest string that parses back to
/// the same value, so this also covers `f32`.
#[derive(Debug)]
pub struct DisplayCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> DisplayCodec<T> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for DisplayCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for DisplayCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for DisplayCodec<T>
where
    T: Display + FromStr,
{
    fn encode(&self, value: &T) -> String {
        value.to_string()
    }

    fn try_decode(&self, raw: &str) -> Option<T> {
        raw.parse().ok()
    }
}

/// `true` / `false`
pub type BoolCodec = DisplayCodec<bool>;
/// 32-bit decimal integer
pub type IntCodec = DisplayCodec<i32>;
/// 64-bit decimal integer
pub type LongCodec = DisplayCodec<i64>;
/// Decimal float
pub type FloatCodec = DisplayCodec<f32>;

/// Identity codec. Every string is a valid encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn encode(&self, value: &String) -> String {
        value.clone()
    }

    fn try_decode(&self, raw: &str) -> Option<String> {
        Some(raw.to_owned())
    }
}
