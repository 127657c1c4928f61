//! Outbound Ports (Driven Ports)
//!
//! What the worker needs from the ML backend. Model loading, inference and
//! post-processing all live behind these traits.

use async_trait::async_trait;
use geoai_types::TaskDescriptor;
use serde_json::Value;

use crate::error::BackendError;

/// A configured, ready-to-run pipeline (Driven Port)
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Run inference. The output is returned to the caller verbatim.
    async fn run(&self, input: Value) -> Result<Value, BackendError>;

    /// Free model resources. Called once when the instance is disposed or
    /// the worker shuts down.
    fn release(&self) {}
}

/// Builds pipelines for task combinations (Driven Port)
#[async_trait]
pub trait PipelineFactory: Send + Sync {
    async fn create_pipeline(
        &self,
        tasks: &[TaskDescriptor],
        config: &Value,
        model: Option<&str>,
    ) -> Result<Box<dyn Pipeline>, BackendError>;
}
