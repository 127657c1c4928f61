//! Inbound Ports (Driving Ports)
//!
//! The operations the worker offers to whoever decodes requests.

use async_trait::async_trait;
use geoai_types::{
    CallRequest, CallResponse, DisposeRequest, DisposeResponse, InitRequest, InitResponse,
    InstanceId,
};

use crate::error::WorkerError;

/// Pipeline session API (Driving Port)
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Create a pipeline instance for the requested tasks.
    async fn handle_init(&self, request: InitRequest) -> Result<InitResponse, WorkerError>;

    /// Run inference on an existing instance.
    async fn handle_call(&self, request: CallRequest) -> Result<CallResponse, WorkerError>;

    /// Remove an instance. Absent instances are reported, not rejected.
    fn handle_dispose(&self, request: DisposeRequest) -> Result<DisposeResponse, WorkerError>;

    fn instance_count(&self) -> usize;

    fn contains(&self, instance_id: &InstanceId) -> bool;

    /// Release every live instance. Returns how many were released.
    fn release_all(&self) -> usize;
}
