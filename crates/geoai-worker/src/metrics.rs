//! Worker message counters.
//!
//! Local atomics for cheap inspection in tests and diagnostics; every record
//! is mirrored into the shared Prometheus registry (`geoai_worker_messages_total`).

use geoai_telemetry::WORKER_MESSAGES;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for the worker message loop
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    /// Total messages received
    pub messages_received: AtomicU64,
    /// Messages answered with a success response
    pub messages_succeeded: AtomicU64,
    /// Messages answered with an error response
    pub messages_failed: AtomicU64,
    /// Messages dropped without an answer (no recoverable id)
    pub messages_dropped: AtomicU64,
    /// Cumulative handling time in nanoseconds
    pub handle_time_ns: AtomicU64,
}

impl WorkerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an answered message of `message_type`.
    pub fn record_handled(&self, message_type: &str, success: bool, duration: Duration) {
        let outcome = if success {
            self.messages_succeeded.fetch_add(1, Ordering::Relaxed);
            "success"
        } else {
            self.messages_failed.fetch_add(1, Ordering::Relaxed);
            "failure"
        };
        self.handle_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        WORKER_MESSAGES
            .with_label_values(&[message_type, outcome])
            .inc();
    }

    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
        WORKER_MESSAGES.with_label_values(&["unknown", "dropped"]).inc();
    }

    /// Average handling time per answered message.
    pub fn avg_handle_time(&self) -> Duration {
        let answered = self.messages_succeeded.load(Ordering::Relaxed)
            + self.messages_failed.load(Ordering::Relaxed);
        if answered == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.handle_time_ns.load(Ordering::Relaxed) / answered)
    }
}
