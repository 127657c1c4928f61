//! # Message Envelope
//!
//! The unit of communication crossing the worker boundary.
//!
//! ```text
//! request:  { "id": 7, "type": "call", "payload": { ... } }
//! response: { "id": 7, "type": "call_result", "payload": { ... }, "success": true }
//! ```
//!
//! The `id` is the only link between a response and its request. A response
//! carries the `id` of the request it answers, nothing else.

use crate::errors::DecodeError;
use crate::ids::RequestId;
use crate::messages::{Request, Response};
use serde_json::Value;
use std::fmt;

/// Wire discriminator for an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    // caller → worker
    Init,
    Call,
    Dispose,
    Ping,
    // worker → caller
    InitResult,
    CallResult,
    DisposeResult,
    Pong,
    Error,
}

impl MessageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageType::Init => "init",
            MessageType::Call => "call",
            MessageType::Dispose => "dispose",
            MessageType::Ping => "ping",
            MessageType::InitResult => "init_result",
            MessageType::CallResult => "call_result",
            MessageType::DisposeResult => "dispose_result",
            MessageType::Pong => "pong",
            MessageType::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let kind = match s {
            "init" => MessageType::Init,
            "call" => MessageType::Call,
            "dispose" => MessageType::Dispose,
            "ping" => MessageType::Ping,
            "init_result" => MessageType::InitResult,
            "call_result" => MessageType::CallResult,
            "dispose_result" => MessageType::DisposeResult,
            "pong" => MessageType::Pong,
            "error" => MessageType::Error,
            _ => return None,
        };
        Some(kind)
    }

    /// True for discriminators that travel worker → caller.
    pub const fn is_response(self) -> bool {
        matches!(
            self,
            MessageType::InitResult
                | MessageType::CallResult
                | MessageType::DisposeResult
                | MessageType::Pong
                | MessageType::Error
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded envelope. The payload is still untyped JSON; use
/// [`Envelope::into_request`] or [`Envelope::into_response`] to validate it.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub id: RequestId,
    /// Raw `type` field.
    pub message_type: String,
    pub payload: Value,
    /// Present on responses only.
    pub success: Option<bool>,
}

impl Envelope {
    pub fn request(id: RequestId, request: &Request) -> Self {
        Self {
            id,
            message_type: request.message_type().as_str().to_string(),
            payload: request.to_payload(),
            success: None,
        }
    }

    pub fn response(id: RequestId, response: &Response) -> Self {
        Self {
            id,
            message_type: response.message_type().as_str().to_string(),
            payload: response.to_payload(),
            success: Some(response.is_success()),
        }
    }

    pub fn is_response(&self) -> bool {
        self.success.is_some()
            || MessageType::parse(&self.message_type).is_some_and(MessageType::is_response)
    }

    /// Validate the payload as a caller → worker request.
    pub fn into_request(self) -> Result<Request, DecodeError> {
        Request::from_parts(&self.message_type, self.payload)
    }

    /// Validate the payload as a worker → caller response.
    pub fn into_response(self) -> Result<Response, DecodeError> {
        Response::from_parts(&self.message_type, self.success, self.payload)
    }

    /// Render to wire text.
    pub fn to_wire(&self) -> String {
        match self.success {
            Some(success) => crate::codec::encode_response(
                self.id,
                &self.message_type,
                success,
                self.payload.clone(),
            ),
            None => crate::codec::encode(self.id, &self.message_type, self.payload.clone()),
        }
    }
}
