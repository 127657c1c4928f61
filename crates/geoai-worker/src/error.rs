//! Error types for the worker

use geoai_types::{DecodeError, ErrorKind, ErrorResponse, InstanceId};
use thiserror::Error;

/// Errors that can occur while handling a request in the worker
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkerError {
    /// No live instance with this id answers to this task.
    #[error("Unknown instance: {instance_id} (task: {task})")]
    UnknownInstance {
        instance_id: InstanceId,
        task: String,
    },

    #[error("Instance limit reached: {max} live instances")]
    CapacityExceeded { max: usize },

    /// Failure reported by the ML backend, passed through verbatim.
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DecodeError),
}

impl WorkerError {
    /// Wire-level category of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::UnknownInstance { .. } => ErrorKind::UnknownInstance,
            WorkerError::CapacityExceeded { .. } => ErrorKind::InitFailed,
            WorkerError::Backend(e) => e.kind(),
            WorkerError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(self.kind(), self.to_string());
        match self {
            WorkerError::Backend(BackendError::Inference { detail: Some(d), .. }) => {
                response.with_stack(d.clone())
            }
            _ => response,
        }
    }
}

impl From<WorkerError> for ErrorResponse {
    fn from(e: WorkerError) -> Self {
        e.to_error_response()
    }
}

/// Errors from the ML backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("Unsupported task: {0}")]
    UnsupportedTask(String),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Inference itself failed. `detail` carries backend diagnostics, if any.
    #[error("Inference failed: {message}")]
    Inference {
        message: String,
        detail: Option<String>,
    },
}

impl BackendError {
    pub fn inference(message: impl Into<String>) -> Self {
        BackendError::Inference {
            message: message.into(),
            detail: None,
        }
    }

    /// Construction failures surface as `init_failed`, the rest as
    /// `pipeline_failed`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::UnsupportedTask(_) | BackendError::ModelLoad(_) => ErrorKind::InitFailed,
            BackendError::InvalidInput(_) | BackendError::Inference { .. } => {
                ErrorKind::PipelineFailed
            }
        }
    }
}
