//! Prometheus metrics for the worker control plane.
//!
//! All metrics follow the naming convention: `geoai_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: requests dispatched by outcome, worker messages handled
//! - **Gauge**: in-flight requests, live pipeline instances
//! - **Histogram**: request round-trip duration

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CALLER SIDE (dispatcher)
    // =========================================================================

    /// Requests settled, by operation and outcome
    pub static ref DISPATCH_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("geoai_dispatch_requests_total", "Requests settled by the dispatcher"),
        &["operation", "outcome"]  // outcome: success/remote_error/timeout/drained/send_failed
    ).expect("metric creation failed");

    /// Requests currently awaiting a response
    pub static ref PENDING_REQUESTS: IntGauge = IntGauge::new(
        "geoai_dispatch_pending_requests",
        "Requests registered in the correlation table"
    ).expect("metric creation failed");

    /// Round-trip time from send to settlement
    pub static ref DISPATCH_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "geoai_dispatch_request_duration_seconds",
            "Time from request send to settlement"
        ).buckets(exponential_buckets(0.001, 2.0, 16).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // WORKER SIDE (session manager)
    // =========================================================================

    /// Messages handled by the worker, by type and outcome
    pub static ref WORKER_MESSAGES: IntCounterVec = IntCounterVec::new(
        Opts::new("geoai_worker_messages_total", "Messages handled by the worker"),
        &["type", "outcome"]  // outcome: success/failure/dropped
    ).expect("metric creation failed");

    /// Live pipeline instances
    pub static ref PIPELINE_INSTANCES: IntGauge = IntGauge::new(
        "geoai_worker_pipeline_instances",
        "Pipeline instances registered in the worker"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless; already registered collectors
/// are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(DISPATCH_REQUESTS.clone()),
        Box::new(PENDING_REQUESTS.clone()),
        Box::new(DISPATCH_DURATION.clone()),
        Box::new(WORKER_MESSAGES.clone()),
        Box::new(PIPELINE_INSTANCES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
