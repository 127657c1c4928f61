//! Typed payloads for every operation that crosses the worker boundary.
//!
//! Requests flow caller → worker, responses flow worker → caller. Each variant
//! maps to exactly one wire `type` (see [`MessageType`]).

use crate::envelope::MessageType;
use crate::errors::DecodeError;
use crate::ids::InstanceId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Payload object for one message struct.
///
/// Every message struct derives `Serialize` over string-keyed fields holding
/// strings, integers, flags, ids and `Value`s, none of which can fail to
/// convert. `Null` is unreachable here.
fn payload_of<T: Serialize>(message: &T) -> Value {
    serde_json::to_value(message).unwrap_or(Value::Null)
}

// ═══════════════════════════════════════════════════════════════════════════
// REQUESTS (caller → worker)
// ═══════════════════════════════════════════════════════════════════════════

/// One stage of a pipeline requested at `init` time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Task name, e.g. `building-detection`.
    pub task: String,
    /// Model override for this stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Stage-specific options, passed to the backend untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl TaskDescriptor {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            model_id: None,
            options: None,
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}

/// Build the key a pipeline is registered under: stage names joined by `+`.
pub fn task_key(tasks: &[TaskDescriptor]) -> String {
    tasks
        .iter()
        .map(|d| d.task.as_str())
        .collect::<Vec<_>>()
        .join("+")
}

/// Create a pipeline instance in the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitRequest {
    pub tasks: Vec<TaskDescriptor>,
    /// Provider/runtime configuration, opaque to this layer.
    #[serde(default)]
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl InitRequest {
    pub fn task_key(&self) -> String {
        task_key(&self.tasks)
    }
}

/// Run inference on an existing instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    pub task: String,
    pub instance_id: InstanceId,
    #[serde(default)]
    pub input: Value,
}

/// Release an instance and the model resources it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisposeRequest {
    pub instance_id: InstanceId,
}

/// All requests a caller can issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Init(InitRequest),
    Call(CallRequest),
    Dispose(DisposeRequest),
    /// Liveness check.
    Ping,
}

impl Request {
    pub fn message_type(&self) -> MessageType {
        match self {
            Request::Init(_) => MessageType::Init,
            Request::Call(_) => MessageType::Call,
            Request::Dispose(_) => MessageType::Dispose,
            Request::Ping => MessageType::Ping,
        }
    }

    /// Operation name used in logs and timeout errors.
    pub fn operation(&self) -> &'static str {
        self.message_type().as_str()
    }

    pub fn to_payload(&self) -> Value {
        match self {
            Request::Init(r) => payload_of(r),
            Request::Call(r) => payload_of(r),
            Request::Dispose(r) => payload_of(r),
            Request::Ping => Value::Object(Default::default()),
        }
    }

    /// Validate a payload against the shape its `type` requires.
    pub fn from_parts(message_type: &str, payload: Value) -> Result<Self, DecodeError> {
        let kind = MessageType::parse(message_type)
            .ok_or_else(|| DecodeError::UnknownType(message_type.to_string()))?;

        match kind {
            MessageType::Init => {
                let init: InitRequest = serde_json::from_value(payload)
                    .map_err(|e| DecodeError::invalid_payload(message_type, e))?;
                if init.tasks.is_empty() {
                    return Err(DecodeError::invalid_payload(
                        message_type,
                        "at least one task descriptor is required",
                    ));
                }
                if init.tasks.iter().any(|d| d.task.trim().is_empty()) {
                    return Err(DecodeError::invalid_payload(
                        message_type,
                        "task name cannot be empty",
                    ));
                }
                Ok(Request::Init(init))
            }
            MessageType::Call => serde_json::from_value(payload)
                .map(Request::Call)
                .map_err(|e| DecodeError::invalid_payload(message_type, e)),
            MessageType::Dispose => serde_json::from_value(payload)
                .map(Request::Dispose)
                .map_err(|e| DecodeError::invalid_payload(message_type, e)),
            MessageType::Ping => Ok(Request::Ping),
            other => Err(DecodeError::invalid_payload(
                other.as_str(),
                "not a request type",
            )),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RESPONSES (worker → caller)
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitResponse {
    pub instance_id: InstanceId,
    /// Task key the instance answers to.
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResponse {
    /// Backend output, returned verbatim.
    pub output: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisposeResponse {
    pub instance_id: InstanceId,
    /// `false` when the instance did not exist.
    pub released: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pong {
    /// Live pipeline instances in the worker.
    pub instances: usize,
}

/// Category of a worker-reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownInstance,
    InitFailed,
    PipelineFailed,
    InvalidRequest,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::UnknownInstance => "unknown_instance",
            ErrorKind::InitFailed => "init_failed",
            ErrorKind::PipelineFailed => "pipeline_failed",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Failure description carried on an unsuccessful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default = "default_error_kind")]
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

fn default_error_kind() -> ErrorKind {
    ErrorKind::Internal
}

impl ErrorResponse {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Read a failure payload, tolerating peers that send something other
    /// than `{message, kind, stack}`.
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::String(message) => Self::new(ErrorKind::Internal, message),
            other => serde_json::from_value(other.clone())
                .unwrap_or_else(|_| Self::new(ErrorKind::Internal, other.to_string())),
        }
    }
}

/// All responses a worker can send back.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Init(InitResponse),
    Call(CallResponse),
    Dispose(DisposeResponse),
    Pong(Pong),
    Error(ErrorResponse),
}

impl Response {
    pub fn message_type(&self) -> MessageType {
        match self {
            Response::Init(_) => MessageType::InitResult,
            Response::Call(_) => MessageType::CallResult,
            Response::Dispose(_) => MessageType::DisposeResult,
            Response::Pong(_) => MessageType::Pong,
            Response::Error(_) => MessageType::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Response::Error(_))
    }

    pub fn to_payload(&self) -> Value {
        match self {
            Response::Init(r) => payload_of(r),
            Response::Call(r) => payload_of(r),
            Response::Dispose(r) => payload_of(r),
            Response::Pong(r) => payload_of(r),
            Response::Error(r) => payload_of(r),
        }
    }

    /// Validate a response payload.
    ///
    /// `success == Some(false)` or a `type` of `error` always yields
    /// [`Response::Error`], whatever the payload shape.
    pub fn from_parts(
        message_type: &str,
        success: Option<bool>,
        payload: Value,
    ) -> Result<Self, DecodeError> {
        let kind = MessageType::parse(message_type)
            .ok_or_else(|| DecodeError::UnknownType(message_type.to_string()))?;

        if success == Some(false) || kind == MessageType::Error {
            return Ok(Response::Error(ErrorResponse::from_payload(payload)));
        }

        let invalid = |e: serde_json::Error| DecodeError::invalid_payload(message_type, e);
        match kind {
            MessageType::InitResult => serde_json::from_value(payload)
                .map(Response::Init)
                .map_err(invalid),
            MessageType::CallResult => serde_json::from_value(payload)
                .map(Response::Call)
                .map_err(invalid),
            MessageType::DisposeResult => serde_json::from_value(payload)
                .map(Response::Dispose)
                .map_err(invalid),
            MessageType::Pong => serde_json::from_value(payload)
                .map(Response::Pong)
                .map_err(invalid),
            other => Err(DecodeError::invalid_payload(
                other.as_str(),
                "not a response type",
            )),
        }
    }
}

impl From<ErrorResponse> for Response {
    fn from(e: ErrorResponse) -> Self {
        Response::Error(e)
    }
}
