//! Pipeline instance records.
//!
//! A record is created by a successful `init` and lives until `dispose` or
//! worker teardown. The pipeline it holds is shared out as an `Arc` so a call
//! can run it without keeping the registry locked.

use crate::ports::Pipeline;
use chrono::{DateTime, Utc};
use geoai_types::InstanceId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct InstanceRecord {
    pub instance_id: InstanceId,
    /// Task key the instance was configured for.
    pub task: String,
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
    calls: AtomicU64,
    pipeline: Arc<dyn Pipeline>,
}

impl InstanceRecord {
    pub fn new(
        instance_id: InstanceId,
        task: impl Into<String>,
        model: Option<String>,
        pipeline: Arc<dyn Pipeline>,
    ) -> Self {
        Self {
            instance_id,
            task: task.into(),
            model,
            created_at: Utc::now(),
            calls: AtomicU64::new(0),
            pipeline,
        }
    }

    /// Whether this instance serves `task`.
    pub fn answers(&self, task: &str) -> bool {
        self.task == task
    }

    pub fn pipeline(&self) -> Arc<dyn Pipeline> {
        Arc::clone(&self.pipeline)
    }

    /// Count a call; returns the new total.
    pub fn record_call(&self) -> u64 {
        self.calls.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Let the backend free model resources.
    pub fn release(&self) {
        self.pipeline.release();
    }
}

impl fmt::Debug for InstanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRecord")
            .field("instance_id", &self.instance_id)
            .field("task", &self.task)
            .field("model", &self.model)
            .field("created_at", &self.created_at)
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}
