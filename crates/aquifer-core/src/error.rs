//! Error types for cached fetches.

use serde_json::Value;
use thiserror::Error;

/// A failed fetch, stored in the record for its key.
///
/// Failures never propagate to the consumer or interrupt a render
/// traversal; they are contained in the record and consumers check the
/// `error` field. A failed key stays failed until the record is cleared
/// or overwritten.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Connection or HTTP-level failure from the default fetcher.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body failed to decode as JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// Plain-text failure from a custom fetcher, and the form errors take
    /// after a hydration round trip.
    #[error("{0}")]
    Message(String),

    /// Structured failure payload from a custom fetcher. Survives snapshot
    /// serialization field by field.
    #[error("fetch failed: {0}")]
    Payload(Value),
}

impl FetchError {
    /// Plain serializable representation for snapshot embedding.
    pub fn to_plain(&self) -> Value {
        match self {
            Self::Payload(value) => value.clone(),
            other => Value::String(other.to_string()),
        }
    }

    /// Restore an error from its snapshot representation.
    pub fn from_plain(value: Value) -> Self {
        match value {
            Value::String(message) => Self::Message(message),
            other => Self::Payload(other),
        }
    }
}
