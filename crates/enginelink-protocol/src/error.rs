//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding or decoding a single message.
///
/// None of these are fatal to a connection: the offending message is
/// dropped and the caller carries on with the next frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The text frame does not have the `<type>,<flag>,<payload>` shape.
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: &'static str },

    /// The envelope payload is not valid base64.
    #[error("invalid base64 payload in {type_key}: {source}")]
    InvalidPayload {
        type_key: String,
        #[source]
        source: base64::DecodeError,
    },

    /// The (decompressed) payload is not JSON.
    #[error("invalid JSON body in {type_key}: {source}")]
    InvalidJson {
        type_key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The payload is JSON but not an object.
    #[error("JSON body of {type_key} is not an object")]
    NotAnObject { type_key: String },

    /// Gzip compression of an outgoing body failed.
    #[error("compression failed: {0}")]
    Compression(#[source] std::io::Error),

    /// Gzip decompression of an incoming payload failed.
    #[error("failed to decompress {type_key}: {source}")]
    DecompressionFailed {
        type_key: String,
        #[source]
        source: DecompressError,
    },

    /// No variant is registered for the envelope's type key.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// A required body field is absent.
    #[error("missing field: {name}")]
    FieldMissing { name: &'static str },

    /// A body field is present with the wrong JSON type.
    #[error("field {name} has the wrong type (expected {expected})")]
    FieldTypeMismatch {
        name: &'static str,
        expected: &'static str,
    },

    /// A binary body field is not valid base64.
    #[error("field {name} is not valid base64: {source}")]
    InvalidBase64 {
        name: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// An outgoing float field is NaN or infinite.
    #[error("field {name} of {type_key} is not a finite number")]
    NonFiniteFloat { type_key: String, name: String },

    /// Serializing a body to JSON text failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProtocolError {
    pub(crate) fn malformed(reason: &'static str) -> Self {
        Self::MalformedEnvelope { reason }
    }

    pub(crate) fn missing(name: &'static str) -> Self {
        Self::FieldMissing { name }
    }

    pub(crate) fn mismatch(name: &'static str, expected: &'static str) -> Self {
        Self::FieldTypeMismatch { name, expected }
    }
}

/// Failure inside the gzip decoder.
#[derive(Debug, Error)]
pub enum DecompressError {
    /// The stream is truncated, corrupt, or not gzip at all.
    #[error("corrupt gzip stream: {0}")]
    Corrupt(#[from] std::io::Error),

    /// The decompressed output would exceed the configured cap.
    #[error("decompressed size exceeds limit of {limit} bytes")]
    LimitExceeded { limit: usize },
}
