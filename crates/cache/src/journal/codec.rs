//! Line codecs for journal events

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A journal line that could not be turned back into an event
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot decode journal line '{line}': {reason}")]
pub struct DeserializationError {
    pub line: String,
    pub reason: String,
}

impl DeserializationError {
    pub fn new(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            reason: reason.into(),
        }
    }
}

/// Converts events to and from single journal lines
///
/// `encode` must never produce a line break; the journal adds the
/// terminator itself.
pub trait JournalCodec<E>: Send + Sync {
    fn encode(&self, event: &E) -> String;

    fn decode(&self, line: &str) -> Result<E, DeserializationError>;
}

/// Codec storing each event as one line of JSON
pub struct JsonCodec<E> {
    _event: PhantomData<fn() -> E>,
}

impl<E> JsonCodec<E> {
    pub fn new() -> Self {
        Self {
            _event: PhantomData,
        }
    }
}

impl<E> Default for JsonCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> JournalCodec<E> for JsonCodec<E>
where
    E: Serialize + DeserializeOwned,
{
    fn encode(&self, event: &E) -> String {
        // serde_json escapes control characters, so the output is one line
        match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "journal event is not representable as JSON");
                String::new()
            }
        }
    }

    fn decode(&self, line: &str) -> Result<E, DeserializationError> {
        serde_json::from_str(line).map_err(|e| DeserializationError::new(line, e.to_string()))
    }
}
