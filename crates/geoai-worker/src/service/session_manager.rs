//! Pipeline Session Manager
//!
//! Owns the registry of live pipeline instances. Each instance moves through
//! `Ready` (after a successful `init`) to `Disposed` (record removed). A
//! failed `init` never creates a record, and a rejected `call` never mutates
//! one.

use async_trait::async_trait;
use geoai_telemetry::PIPELINE_INSTANCES;
use geoai_types::{
    task_key, CallRequest, CallResponse, DisposeRequest, DisposeResponse, InitRequest,
    InitResponse, InstanceId,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{InstanceRecord, WorkerConfig};
use crate::error::WorkerError;
use crate::ports::{Pipeline, PipelineFactory, SessionApi};

pub struct PipelineSessionManager<F: PipelineFactory> {
    factory: F,
    config: WorkerConfig,
    instances: RwLock<HashMap<InstanceId, Arc<InstanceRecord>>>,
}

impl<F: PipelineFactory> PipelineSessionManager<F> {
    pub fn new(factory: F, config: WorkerConfig) -> Self {
        Self {
            factory,
            config,
            instances: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Look up a live instance.
    pub fn instance(&self, instance_id: &InstanceId) -> Option<Arc<InstanceRecord>> {
        self.instances.read().get(instance_id).cloned()
    }

    fn at_capacity(&self) -> bool {
        self.instances.read().len() >= self.config.max_instances
    }
}

#[async_trait]
impl<F: PipelineFactory> SessionApi for PipelineSessionManager<F> {
    async fn handle_init(&self, request: InitRequest) -> Result<InitResponse, WorkerError> {
        let task = task_key(&request.tasks);
        if self.at_capacity() {
            warn!(task = %task, max = self.config.max_instances, "Instance limit reached");
            return Err(WorkerError::CapacityExceeded {
                max: self.config.max_instances,
            });
        }

        let started = Instant::now();
        let pipeline: Arc<dyn Pipeline> = self
            .factory
            .create_pipeline(&request.tasks, &request.config, request.model.as_deref())
            .await
            .map_err(|e| {
                warn!(task = %task, error = %e, "Pipeline construction failed");
                WorkerError::Backend(e)
            })?
            .into();

        let instance_id = InstanceId::generate();
        let record = InstanceRecord::new(
            instance_id.clone(),
            task.clone(),
            request.model,
            Arc::clone(&pipeline),
        );

        {
            let mut instances = self.instances.write();
            // Another init may have filled the last slot while this one was
            // loading its model.
            if instances.len() >= self.config.max_instances {
                drop(instances);
                pipeline.release();
                return Err(WorkerError::CapacityExceeded {
                    max: self.config.max_instances,
                });
            }
            instances.insert(instance_id.clone(), Arc::new(record));
        }
        PIPELINE_INSTANCES.inc();

        info!(
            instance_id = %instance_id,
            task = %task,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline instance ready"
        );

        Ok(InitResponse { instance_id, task })
    }

    async fn handle_call(&self, request: CallRequest) -> Result<CallResponse, WorkerError> {
        let record = self
            .instance(&request.instance_id)
            .filter(|r| r.answers(&request.task))
            .ok_or_else(|| WorkerError::UnknownInstance {
                instance_id: request.instance_id.clone(),
                task: request.task.clone(),
            })?;

        let calls = record.record_call();
        let started = Instant::now();
        let output = record.pipeline().run(request.input).await?;

        debug!(
            instance_id = %record.instance_id,
            task = %record.task,
            calls,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline call completed"
        );

        Ok(CallResponse { output })
    }

    fn handle_dispose(&self, request: DisposeRequest) -> Result<DisposeResponse, WorkerError> {
        let removed = self.instances.write().remove(&request.instance_id);

        let released = match removed {
            Some(record) => {
                record.release();
                PIPELINE_INSTANCES.dec();
                info!(
                    instance_id = %record.instance_id,
                    task = %record.task,
                    calls = record.calls(),
                    created_at = %record.created_at,
                    "Pipeline instance disposed"
                );
                true
            }
            None => {
                debug!(instance_id = %request.instance_id, "Dispose for unknown instance");
                false
            }
        };

        Ok(DisposeResponse {
            instance_id: request.instance_id,
            released,
        })
    }

    fn instance_count(&self) -> usize {
        self.instances.read().len()
    }

    fn contains(&self, instance_id: &InstanceId) -> bool {
        self.instances.read().contains_key(instance_id)
    }

    fn release_all(&self) -> usize {
        let drained: Vec<_> = self.instances.write().drain().map(|(_, r)| r).collect();
        for record in &drained {
            record.release();
            PIPELINE_INSTANCES.dec();
        }
        if !drained.is_empty() {
            info!(released = drained.len(), "Released all pipeline instances");
        }
        drained.len()
    }
}
