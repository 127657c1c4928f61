//! Correlation Table - maps in-flight request identifiers to the callers
//! waiting on them.
//!
//! Flow:
//! 1. Dispatcher allocates a `RequestId` and calls `register()` to get a
//!    oneshot receiver
//! 2. Dispatcher spawns a timer and hands its `AbortHandle` to `arm_timeout()`
//! 3. Dispatcher posts the envelope and awaits the receiver
//! 4. The listener calls `settle()` when the response arrives, or the timer
//!    calls `expire()`, or a channel failure calls `drain_all()`
//!
//! Whichever of these removes the entry first settles it. Removal is a single
//! atomic map operation, so every entry is settled exactly once and the losers
//! become no-ops.

use crate::domain::error::DispatchError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use geoai_telemetry::{DISPATCH_DURATION, DISPATCH_REQUESTS, PENDING_REQUESTS};
use geoai_types::{RequestId, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// What a waiting caller eventually receives.
pub type Completion = Result<Response, DispatchError>;

/// A request waiting for its response.
struct PendingEntry {
    /// Resolves or rejects the caller.
    sender: oneshot::Sender<Completion>,
    /// Operation name (for logging and the timeout error)
    operation: &'static str,
    created_at: Instant,
    timeout: Duration,
    /// Armed timer; aborted when the entry is settled some other way.
    timer: Option<AbortHandle>,
}

/// Statistics for the correlation table
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests resolved with a successful response
    pub total_completed: AtomicU64,
    /// Total requests rejected with a worker-reported error
    pub total_failed: AtomicU64,
    /// Total requests expired by their timer
    pub total_timeouts: AtomicU64,
    /// Total requests rejected by a channel failure or termination
    pub total_drained: AtomicU64,
    /// Responses that matched no pending request
    pub total_unknown: AtomicU64,
    /// Settled requests whose caller had already gone away
    pub total_abandoned: AtomicU64,
}

impl PendingStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Sole authority over in-flight request identifiers.
pub struct CorrelationTable {
    pending: DashMap<RequestId, PendingEntry>,
    stats: PendingStats,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            stats: PendingStats::default(),
        }
    }

    /// Register a pending request and get the receiver its completion will
    /// be delivered on.
    ///
    /// Fails with [`DispatchError::DuplicateId`] if `id` is already in flight;
    /// the existing entry is left untouched.
    pub fn register(
        &self,
        id: RequestId,
        operation: &'static str,
        timeout: Duration,
    ) -> Result<oneshot::Receiver<Completion>, DispatchError> {
        let (tx, rx) = oneshot::channel();

        match self.pending.entry(id) {
            Entry::Occupied(_) => {
                warn!(request_id = %id, operation, "Duplicate request id rejected");
                return Err(DispatchError::DuplicateId(id));
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingEntry {
                    sender: tx,
                    operation,
                    created_at: Instant::now(),
                    timeout,
                    timer: None,
                });
            }
        }

        PendingStats::bump(&self.stats.total_registered);
        PENDING_REQUESTS.inc();

        debug!(
            request_id = %id,
            operation,
            timeout_ms = timeout.as_millis() as u64,
            "Registered pending request"
        );

        Ok(rx)
    }

    /// Attach the timer that will expire `id`.
    ///
    /// If the entry is already gone (settled before the timer was attached),
    /// the timer is aborted on the spot.
    pub fn arm_timeout(&self, id: RequestId, timer: AbortHandle) {
        match self.pending.get_mut(&id) {
            Some(mut entry) => entry.timer = Some(timer),
            None => timer.abort(),
        }
    }

    /// Settle a pending request with a response or an error.
    ///
    /// Returns `false` (and logs a warning) when `id` is not pending: the
    /// request already timed out, was already settled, or never existed.
    pub fn settle(&self, id: RequestId, result: Completion) -> bool {
        let Some(entry) = self.take(id) else {
            PendingStats::bump(&self.stats.total_unknown);
            warn!(request_id = %id, "Response for unknown or expired request id");
            return false;
        };

        if let Some(timer) = &entry.timer {
            timer.abort();
        }
        self.deliver(id, entry, result);
        true
    }

    /// Reject `id` with a timeout. Called by the request's own timer.
    ///
    /// A no-op if the real response got there first.
    pub fn expire(&self, id: RequestId) -> bool {
        let Some(entry) = self.take(id) else {
            debug!(request_id = %id, "Timer fired for already settled request");
            return false;
        };

        warn!(
            request_id = %id,
            operation = entry.operation,
            timeout_ms = entry.timeout.as_millis() as u64,
            "Request timed out"
        );

        let error = DispatchError::Timeout {
            operation: entry.operation.to_string(),
            timeout: entry.timeout,
        };
        // The timer is the task running this call; nothing to abort.
        self.deliver(id, entry, Err(error));
        true
    }

    /// Reject every pending request with `reason` and clear the table.
    ///
    /// Returns the number of requests rejected.
    pub fn drain_all(&self, reason: DispatchError) -> usize {
        let ids: Vec<RequestId> = self.pending.iter().map(|e| *e.key()).collect();
        let mut drained = 0;

        for id in ids {
            // Entries settled concurrently since the snapshot are skipped.
            if let Some(entry) = self.take(id) {
                if let Some(timer) = &entry.timer {
                    timer.abort();
                }
                self.deliver(id, entry, Err(reason.clone()));
                drained += 1;
            }
        }

        if drained > 0 {
            warn!(drained, reason = %reason, "Drained pending requests");
        }
        drained
    }

    /// Get number of currently pending requests
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a request is pending
    pub fn is_pending(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }

    fn take(&self, id: RequestId) -> Option<PendingEntry> {
        let (_, entry) = self.pending.remove(&id)?;
        PENDING_REQUESTS.dec();
        Some(entry)
    }

    fn deliver(&self, id: RequestId, entry: PendingEntry, result: Completion) {
        let elapsed = entry.created_at.elapsed();
        let outcome = match &result {
            Ok(_) => {
                PendingStats::bump(&self.stats.total_completed);
                "success"
            }
            Err(e) => {
                match e {
                    DispatchError::Timeout { .. } => {
                        PendingStats::bump(&self.stats.total_timeouts)
                    }
                    DispatchError::ChannelClosed(_) | DispatchError::Terminated => {
                        PendingStats::bump(&self.stats.total_drained)
                    }
                    _ => PendingStats::bump(&self.stats.total_failed),
                }
                e.outcome()
            }
        };

        DISPATCH_REQUESTS
            .with_label_values(&[entry.operation, outcome])
            .inc();
        DISPATCH_DURATION
            .with_label_values(&[entry.operation])
            .observe(elapsed.as_secs_f64());

        if entry.sender.send(result).is_err() {
            // The caller dropped its future before the outcome arrived.
            PendingStats::bump(&self.stats.total_abandoned);
            debug!(
                request_id = %id,
                operation = entry.operation,
                "Pending request receiver dropped"
            );
            return;
        }

        debug!(
            request_id = %id,
            operation = entry.operation,
            outcome,
            elapsed_ms = elapsed.as_millis() as u64,
            "Settled pending request"
        );
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}
