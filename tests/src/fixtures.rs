//! Test fixtures: demo backends and a caller wired to a live worker.

use async_trait::async_trait;
use geoai_dispatch::{DispatcherConfig, InferenceClient};
use geoai_worker::{
    BackendError, FnPipeline, Pipeline, PipelineSessionManager, StaticPipelineFactory,
    WorkerConfig, WorkerRuntime,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub type DemoSession = PipelineSessionManager<StaticPipelineFactory>;

/// Building footprints for a polygon: one feature per input ring.
pub struct BuildingDetection {
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl Pipeline for BuildingDetection {
    async fn run(&self, input: Value) -> Result<Value, BackendError> {
        let polygon = input
            .get("polygon")
            .and_then(Value::as_array)
            .ok_or_else(|| BackendError::InvalidInput("expected a `polygon` array".into()))?;

        Ok(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [polygon] },
                "properties": { "class": "building", "confidence": 0.92 }
            }]
        }))
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Echoes its input after a fixed delay.
pub struct SlowEcho {
    pub delay: Duration,
}

#[async_trait]
impl Pipeline for SlowEcho {
    async fn run(&self, input: Value) -> Result<Value, BackendError> {
        tokio::time::sleep(self.delay).await;
        Ok(input)
    }
}

/// Factory serving `building-detection`, `slow-echo` (50 ms) and
/// `object-detection+mask-generation`. `released` counts released
/// building-detection instances.
pub fn demo_factory(released: Arc<AtomicUsize>) -> StaticPipelineFactory {
    StaticPipelineFactory::new()
        .with_pipeline("building-detection", move |_, _, _| {
            Ok(Box::new(BuildingDetection {
                released: Arc::clone(&released),
            }) as Box<dyn Pipeline>)
        })
        .with_pipeline("slow-echo", |_, _, _| {
            Ok(Box::new(SlowEcho {
                delay: Duration::from_millis(50),
            }) as Box<dyn Pipeline>)
        })
        .with_pipeline("object-detection+mask-generation", |tasks, _, model| {
            let stages: Vec<String> = tasks.iter().map(|t| t.task.clone()).collect();
            let model = model.map(str::to_string);
            Ok(FnPipeline::new(move |_| Ok(json!({ "stages": stages, "model": model }))).boxed())
        })
}

/// A client connected to a worker running on the same runtime.
pub struct Harness {
    pub client: InferenceClient,
    pub session: Arc<DemoSession>,
    pub worker: JoinHandle<u64>,
    pub released: Arc<AtomicUsize>,
}

impl Harness {
    pub fn start(config: DispatcherConfig) -> Self {
        Self::start_with(config, WorkerConfig::default())
    }

    pub fn start_with(config: DispatcherConfig, worker_config: WorkerConfig) -> Self {
        let released = Arc::new(AtomicUsize::new(0));
        let session = Arc::new(PipelineSessionManager::new(
            demo_factory(Arc::clone(&released)),
            worker_config,
        ));
        let (caller, worker) = config.channel_pair();
        let runtime = Arc::new(WorkerRuntime::new(Arc::clone(&session)));
        let worker = runtime.spawn(worker);
        let client = InferenceClient::connect(caller, config).expect("valid dispatcher config");

        Self {
            client,
            session,
            worker,
            released,
        }
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// A small square in lon/lat.
pub fn sample_polygon() -> Value {
    json!([
        [-122.42, 37.77],
        [-122.41, 37.77],
        [-122.41, 37.78],
        [-122.42, 37.78],
        [-122.42, 37.77]
    ])
}
