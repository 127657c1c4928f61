//! Static pipeline factory.
//!
//! Maps task keys (`"building-detection"`, `"object-detection+mask-generation"`)
//! to constructor closures, so an application can plug its backends in
//! without writing a factory of its own.

use async_trait::async_trait;
use geoai_types::{task_key, TaskDescriptor};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::BackendError;
use crate::ports::{Pipeline, PipelineFactory};

type Constructor = Arc<
    dyn Fn(&[TaskDescriptor], &Value, Option<&str>) -> Result<Box<dyn Pipeline>, BackendError>
        + Send
        + Sync,
>;

#[derive(Default, Clone)]
pub struct StaticPipelineFactory {
    constructors: HashMap<String, Constructor>,
}

impl StaticPipelineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `task` (a task key) and return the factory.
    pub fn with_pipeline<C>(mut self, task: impl Into<String>, constructor: C) -> Self
    where
        C: Fn(&[TaskDescriptor], &Value, Option<&str>) -> Result<Box<dyn Pipeline>, BackendError>
            + Send
            + Sync
            + 'static,
    {
        self.register(task, constructor);
        self
    }

    pub fn register<C>(&mut self, task: impl Into<String>, constructor: C)
    where
        C: Fn(&[TaskDescriptor], &Value, Option<&str>) -> Result<Box<dyn Pipeline>, BackendError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(task.into(), Arc::new(constructor));
    }

    pub fn supports(&self, task: &str) -> bool {
        self.constructors.contains_key(task)
    }
}

#[async_trait]
impl PipelineFactory for StaticPipelineFactory {
    async fn create_pipeline(
        &self,
        tasks: &[TaskDescriptor],
        config: &Value,
        model: Option<&str>,
    ) -> Result<Box<dyn Pipeline>, BackendError> {
        let key = task_key(tasks);
        let constructor = self
            .constructors
            .get(&key)
            .ok_or_else(|| BackendError::UnsupportedTask(key.clone()))?;
        debug!(task = %key, model, "Constructing pipeline");
        constructor(tasks, config, model)
    }
}

/// A pipeline backed by a plain function.
pub struct FnPipeline<F> {
    run: F,
    on_release: Option<Box<dyn Fn() + Send + Sync>>,
}

impl<F> FnPipeline<F>
where
    F: Fn(Value) -> Result<Value, BackendError> + Send + Sync + 'static,
{
    pub fn new(run: F) -> Self {
        Self {
            run,
            on_release: None,
        }
    }

    /// Hook invoked when the instance is released.
    pub fn on_release(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    pub fn boxed(self) -> Box<dyn Pipeline> {
        Box::new(self)
    }
}

#[async_trait]
impl<F> Pipeline for FnPipeline<F>
where
    F: Fn(Value) -> Result<Value, BackendError> + Send + Sync + 'static,
{
    async fn run(&self, input: Value) -> Result<Value, BackendError> {
        (self.run)(input)
    }

    fn release(&self) {
        if let Some(hook) = &self.on_release {
            hook();
        }
    }
}
