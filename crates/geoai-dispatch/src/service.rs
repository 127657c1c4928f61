//! Inference client: typed operations on top of the dispatcher.
//!
//! Turns "create a pipeline / run it / release it" into requests and checks
//! that each answer is the variant the operation expects.

use crate::domain::config::DispatcherConfig;
use crate::domain::error::DispatchError;
use crate::ipc::dispatcher::Dispatcher;
use geoai_channel::CallerEndpoint;
use geoai_types::{
    task_key, CallRequest, DisposeRequest, InitRequest, InstanceId, Request, Response,
    TaskDescriptor,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// A pipeline instance created in the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineHandle {
    pub instance_id: InstanceId,
    /// Task key the instance answers to (task names joined with `+`).
    pub task: String,
}

/// Caller-side handle to one worker.
pub struct InferenceClient {
    dispatcher: Arc<Dispatcher>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl InferenceClient {
    /// Start listening on `endpoint` and return a ready client.
    pub fn connect(
        endpoint: CallerEndpoint,
        config: DispatcherConfig,
    ) -> Result<Self, crate::domain::config::ConfigError> {
        config.validate()?;
        let (poster, receiver) = endpoint.into_parts();
        let dispatcher = Dispatcher::new(Arc::new(poster), config);
        let listener = dispatcher.spawn_listener(receiver);
        Ok(Self {
            dispatcher,
            listener: Mutex::new(Some(listener)),
        })
    }

    /// Create a pipeline instance for `tasks`.
    ///
    /// Bounded by the configured init timeout, since model loading dominates.
    #[instrument(skip(self, tasks, config), fields(task = %task_key(&tasks)))]
    pub async fn initialize(
        &self,
        tasks: Vec<TaskDescriptor>,
        config: Value,
        model: Option<String>,
    ) -> Result<PipelineHandle, DispatchError> {
        let timeout = self.dispatcher.config().init_timeout;
        let request = Request::Init(InitRequest {
            tasks,
            config,
            model,
        });

        match self.dispatcher.send(request, Some(timeout)).await? {
            Response::Init(r) => {
                info!(instance_id = %r.instance_id, task = %r.task, "Pipeline instance created");
                Ok(PipelineHandle {
                    instance_id: r.instance_id,
                    task: r.task,
                })
            }
            other => Err(unexpected("init", &other)),
        }
    }

    /// Run inference on an instance with the default timeout.
    pub async fn run(
        &self,
        task: &str,
        instance_id: &InstanceId,
        input: Value,
    ) -> Result<Value, DispatchError> {
        self.run_with_timeout(task, instance_id, input, None).await
    }

    /// Run inference on an instance; `timeout` overrides the default bound.
    pub async fn run_with_timeout(
        &self,
        task: &str,
        instance_id: &InstanceId,
        input: Value,
        timeout: Option<Duration>,
    ) -> Result<Value, DispatchError> {
        let request = Request::Call(CallRequest {
            task: task.to_string(),
            instance_id: instance_id.clone(),
            input,
        });

        match self.dispatcher.send(request, timeout).await? {
            Response::Call(r) => Ok(r.output),
            other => Err(unexpected("call", &other)),
        }
    }

    /// Release an instance. Returns `false` if the worker did not know it.
    pub async fn dispose(&self, instance_id: &InstanceId) -> Result<bool, DispatchError> {
        let request = Request::Dispose(DisposeRequest {
            instance_id: instance_id.clone(),
        });

        match self.dispatcher.send(request, None).await? {
            Response::Dispose(r) => {
                debug!(instance_id = %r.instance_id, released = r.released, "Dispose answered");
                Ok(r.released)
            }
            other => Err(unexpected("dispose", &other)),
        }
    }

    /// Liveness check. Returns the number of live instances in the worker.
    pub async fn ping(&self) -> Result<usize, DispatchError> {
        match self.dispatcher.send(Request::Ping, None).await? {
            Response::Pong(p) => Ok(p.instances),
            other => Err(unexpected("ping", &other)),
        }
    }

    /// Stop the listener, close the channel and reject all pending requests.
    ///
    /// Returns the number of requests rejected. Idempotent.
    pub fn terminate(&self) -> usize {
        let drained = self.dispatcher.terminate();
        if let Some(listener) = self.listener.lock().take() {
            listener.abort();
        }
        drained
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

impl Drop for InferenceClient {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn unexpected(operation: &str, response: &Response) -> DispatchError {
    DispatchError::UnexpectedResponse(format!(
        "{operation} answered with {}",
        response.message_type()
    ))
}
