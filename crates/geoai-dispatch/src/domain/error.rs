//! Dispatcher error types.
//!
//! Every variant reaches exactly one awaiting caller, except a channel
//! failure, which is fanned out to every outstanding caller (hence `Clone`).

use geoai_types::{ErrorKind, ErrorResponse, RequestId};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The identifier is already in flight. Should never happen with a
    /// monotonic generator; fatal to the one request.
    #[error("Duplicate request id: {0}")]
    DuplicateId(RequestId),

    /// No response within the bound given at send time.
    #[error("Request timeout: {operation} did not complete within {}ms", .timeout.as_millis())]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// The channel failed or was closed; no further requests are accepted.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// The dispatcher was terminated while the request was pending.
    #[error("Dispatcher terminated")]
    Terminated,

    /// The worker reported a failure.
    #[error("Worker error ({kind}): {message}")]
    Remote {
        kind: ErrorKind,
        message: String,
        stack: Option<String>,
    },

    /// Posting the request failed.
    #[error("Send failed: {0}")]
    Send(String),

    /// The worker answered with something this request cannot use.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl DispatchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DispatchError::Timeout { .. })
    }

    /// Category of a worker-reported failure, if this is one.
    pub fn remote_kind(&self) -> Option<ErrorKind> {
        match self {
            DispatchError::Remote { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Label used for the `outcome` metric.
    pub(crate) fn outcome(&self) -> &'static str {
        match self {
            DispatchError::Timeout { .. } => "timeout",
            DispatchError::Remote { .. } => "remote_error",
            DispatchError::ChannelClosed(_) | DispatchError::Terminated => "drained",
            DispatchError::Send(_) => "send_failed",
            DispatchError::DuplicateId(_) | DispatchError::UnexpectedResponse(_) => "invalid",
        }
    }
}

impl From<ErrorResponse> for DispatchError {
    fn from(e: ErrorResponse) -> Self {
        DispatchError::Remote {
            kind: e.kind,
            message: e.message,
            stack: e.stack,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_operation_and_bound() {
        let err = DispatchError::Timeout {
            operation: "call".into(),
            timeout: Duration::from_millis(10),
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "Request timeout: call did not complete within 10ms"
        );
    }

    #[test]
    fn test_remote_error_keeps_worker_fields() {
        let err = DispatchError::from(
            ErrorResponse::new(ErrorKind::UnknownInstance, "Unknown instance: x").with_stack("at y"),
        );
        assert_eq!(err.remote_kind(), Some(ErrorKind::UnknownInstance));
        match err {
            DispatchError::Remote { message, stack, .. } => {
                assert_eq!(message, "Unknown instance: x");
                assert_eq!(stack.as_deref(), Some("at y"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
