//! # Error Types
//!
//! Errors raised while decoding envelopes off the wire.

use thiserror::Error;

/// A wire message that could not be turned into an envelope or a typed payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The wire text is not valid JSON.
    #[error("Malformed envelope: {0}")]
    Malformed(String),

    /// The wire text is JSON but not an object.
    #[error("Envelope is not a JSON object")]
    NotAnObject,

    /// The `id` field is absent.
    #[error("Envelope is missing `id`")]
    MissingId,

    /// The `id` field is not a non-negative integer.
    #[error("Envelope has invalid `id`: {0}")]
    InvalidId(String),

    /// The `type` field is absent or not a string.
    #[error("Envelope is missing `type`")]
    MissingType,

    /// The `type` field names no known operation.
    #[error("Unknown message type: {0}")]
    UnknownType(String),

    /// A response (`*_result`, `pong`, `error`, or any envelope carrying
    /// `success`) arrived where a request was expected.
    #[error("Response `{0}` sent as a request")]
    UnexpectedResponse(String),

    /// The payload does not match the shape required by its `type`.
    #[error("Invalid {message_type} payload: {reason}")]
    InvalidPayload {
        message_type: String,
        reason: String,
    },
}

impl DecodeError {
    pub(crate) fn invalid_payload(message_type: &str, reason: impl ToString) -> Self {
        Self::InvalidPayload {
            message_type: message_type.to_string(),
            reason: reason.to_string(),
        }
    }
}
