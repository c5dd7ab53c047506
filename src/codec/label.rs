//! Enum-by-label codec.
//!
//! Enums persist as their serde label. An unknown label (for example one
//! written by a newer release, or a variant that has since been removed)
//! decodes to `None` so older data never prevents a load.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::Codec;

/// Codec for unit-variant enums serialized as a bare string label.
#[derive(Debug)]
pub struct LabelCodec<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> LabelCodec<E> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for LabelCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Codec<E> for LabelCodec<E>
where
    E: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &E) -> String {
        match serde_json::to_value(value) {
            Ok(Value::String(label)) => label,
            Ok(other) => other.to_string(),
            Err(_) => String::new(),
        }
    }

    fn try_decode(&self, raw: &str) -> Option<E> {
        serde_json::from_value(Value::String(raw.to_owned())).ok()
    }
}
