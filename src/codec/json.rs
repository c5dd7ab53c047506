//! JSON codec for structured preference values.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Codec;

/// Codec storing a value as a compact JSON document.
#[derive(Debug)]
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> String {
        // Plain data types never fail to serialize
        serde_json::to_string(value).unwrap_or_else(|_| "null".to_owned())
    }

    fn try_decode(&self, raw: &str) -> Option<T> {
        serde_json::from_str(raw).ok()
    }
}
