//! Bundled demo backend.
//!
//! Stands in for a real model: `building-detection` answers every polygon
//! with a single feature covering it, so the control plane can be exercised
//! without model weights.

use async_trait::async_trait;
use geoai_worker::{BackendError, Pipeline, StaticPipelineFactory};
use serde_json::{json, Value};

struct FootprintPipeline {
    model: Option<String>,
}

#[async_trait]
impl Pipeline for FootprintPipeline {
    async fn run(&self, input: Value) -> Result<Value, BackendError> {
        let polygon = input
            .get("polygon")
            .filter(|p| p.is_array())
            .ok_or_else(|| BackendError::InvalidInput("expected a `polygon` array".into()))?;

        Ok(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [polygon] },
                "properties": { "class": "building", "model": self.model }
            }]
        }))
    }
}

/// Factory serving the demo `building-detection` task.
pub fn demo_factory() -> StaticPipelineFactory {
    StaticPipelineFactory::new().with_pipeline("building-detection", |_, _, model| {
        Ok(Box::new(FootprintPipeline {
            model: model.map(str::to_string),
        }) as Box<dyn Pipeline>)
    })
}

/// A small square in lon/lat, used when no input is given.
pub fn sample_input() -> Value {
    json!({
        "polygon": [
            [-122.42, 37.77],
            [-122.41, 37.77],
            [-122.41, 37.78],
            [-122.42, 37.78],
            [-122.42, 37.77]
        ]
    })
}
