//! Payload serialization
//!
//! Payloads cross the store boundary as text. A `Serializer` must round-trip
//! every valid payload and must reject malformed input with
//! `CodecError::Decode` rather than producing a default.

mod errors;

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use errors::{CodecError, CodecResult};

/// Text codec for one payload type.
pub trait Serializer<P> {
    fn encode(&self, payload: &P) -> CodecResult<String>;

    fn decode(&self, text: &str) -> CodecResult<P>;
}

/// JSON codec for any serde payload.
pub struct JsonSerializer<P> {
    _payload: PhantomData<fn() -> P>,
}

impl<P> JsonSerializer<P> {
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<P> Default for JsonSerializer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for JsonSerializer<P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for JsonSerializer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonSerializer")
    }
}

impl<P: Serialize + DeserializeOwned> Serializer<P> for JsonSerializer<P> {
    fn encode(&self, payload: &P) -> CodecResult<String> {
        serde_json::to_string(payload).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, text: &str) -> CodecResult<P> {
        serde_json::from_str(text).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Identity codec for plain string payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextSerializer;

impl Serializer<String> for TextSerializer {
    fn encode(&self, payload: &String) -> CodecResult<String> {
        Ok(payload.clone())
    }

    fn decode(&self, text: &str) -> CodecResult<String> {
        Ok(text.to_string())
    }
}
