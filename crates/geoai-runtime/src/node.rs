//! A caller connected to an in-process worker.

use geoai_dispatch::InferenceClient;
use geoai_worker::{PipelineFactory, PipelineSessionManager, WorkerRuntime};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{RuntimeConfig, RuntimeError};

pub struct WorkerNode {
    client: InferenceClient,
    worker: JoinHandle<u64>,
}

impl WorkerNode {
    /// Spawn a worker serving `factory` and connect a client to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(config: &RuntimeConfig, factory: F) -> Result<Self, RuntimeError>
    where
        F: PipelineFactory + 'static,
    {
        config.worker.validate()?;

        // `connect` validates the dispatcher config before anything is spawned.
        let (caller, worker) = config.dispatcher.channel_pair();
        let client = InferenceClient::connect(caller, config.dispatcher.clone())?;
        let session = Arc::new(PipelineSessionManager::new(factory, config.worker.clone()));
        let worker = Arc::new(WorkerRuntime::new(session)).spawn(worker);

        info!(
            max_instances = config.worker.max_instances,
            channel_capacity = config.dispatcher.channel_capacity,
            "Worker node started"
        );
        Ok(Self { client, worker })
    }

    pub fn client(&self) -> &InferenceClient {
        &self.client
    }

    /// Terminate the client and wait for the worker to release its
    /// instances. Returns the number of messages the worker received.
    pub async fn shutdown(self) -> u64 {
        let Self { client, worker } = self;
        drop(client);
        match worker.await {
            Ok(received) => {
                info!(received, "Worker node stopped");
                received
            }
            Err(e) => {
                error!(error = %e, "Worker task failed");
                0
            }
        }
    }
}
