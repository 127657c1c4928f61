//! Dispatcher: the caller-side entry point for correlated requests.
//!
//! Each dispatcher owns one channel, one [`CorrelationTable`] and one
//! identifier generator. Nothing is global, so independent dispatchers (one
//! per worker, one per test) never observe each other.

use crate::domain::config::DispatcherConfig;
use crate::domain::error::DispatchError;
use crate::domain::pending::{Completion, CorrelationTable, PendingStats};
use geoai_channel::{ChannelEvent, EventReceiver, MessagePoster};
use geoai_types::{codec, Request, RequestIdGenerator, Response};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Issues requests over a channel and settles them from its responses.
pub struct Dispatcher {
    table: Arc<CorrelationTable>,
    ids: RequestIdGenerator,
    poster: Arc<dyn MessagePoster>,
    config: DispatcherConfig,
    /// Why the channel became unusable; `None` while it is open.
    closed: Mutex<Option<String>>,
    terminated: AtomicBool,
}

impl Dispatcher {
    pub fn new(poster: Arc<dyn MessagePoster>, config: DispatcherConfig) -> Arc<Self> {
        Arc::new(Self {
            table: Arc::new(CorrelationTable::new()),
            ids: RequestIdGenerator::new(),
            poster,
            config,
            closed: Mutex::new(None),
            terminated: AtomicBool::new(false),
        })
    }

    /// Send a request and wait for its response.
    ///
    /// The wait is bounded by `timeout` (or the configured default). Fails
    /// immediately with [`DispatchError::ChannelClosed`] once the channel is
    /// unusable.
    pub async fn send(
        &self,
        request: Request,
        timeout: Option<Duration>,
    ) -> Result<Response, DispatchError> {
        if let Some(reason) = self.closed_reason() {
            return Err(DispatchError::ChannelClosed(reason));
        }

        let operation = request.operation();
        let timeout = timeout.unwrap_or(self.config.default_timeout);
        let id = self.ids.next_id();

        let mut rx = self.table.register(id, operation, timeout)?;

        let table = Arc::clone(&self.table);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            table.expire(id);
        });
        self.table.arm_timeout(id, timer.abort_handle());

        // A full queue makes `post` wait. The timer, a drain or `terminate`
        // can settle the request meanwhile, and that ends the wait.
        let wire = codec::encode(id, operation, request.to_payload());
        let posted = tokio::select! {
            biased;
            completion = &mut rx => {
                debug!(request_id = %id, operation, "Settled before it could be posted");
                return flatten(completion);
            }
            posted = self.poster.post(wire) => posted,
        };

        match posted {
            Ok(()) => {
                debug!(request_id = %id, operation, "Sent request");
                // The channel may have failed between the check above and
                // registration; the drain would then have missed this entry.
                if let Some(reason) = self.closed_reason() {
                    if self.table.is_pending(id) {
                        self.table.settle(id, Err(DispatchError::ChannelClosed(reason)));
                    }
                }
            }
            Err(e) => {
                warn!(request_id = %id, operation, error = %e, "Failed to post request");
                self.table.settle(id, Err(DispatchError::Send(e.to_string())));
                self.fail_channel(format!("post failed: {e}"));
            }
        }

        flatten(rx.await)
    }

    /// Route one channel event.
    ///
    /// Returns `false` once the channel has failed and the listener should stop.
    pub fn handle_event(&self, event: ChannelEvent) -> bool {
        match event {
            ChannelEvent::Message(wire) => {
                self.handle_message(&wire);
                true
            }
            ChannelEvent::Error(reason) => {
                error!(reason = %reason, "Channel reported failure");
                self.fail_channel(reason);
                false
            }
        }
    }

    /// Decode a response and settle the request it answers.
    ///
    /// Undecodable messages cannot be correlated; they are logged and dropped.
    pub fn handle_message(&self, wire: &str) {
        let envelope = match codec::decode(wire) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable message from worker");
                return;
            }
        };

        let id = envelope.id;
        let completion: Completion = match envelope.into_response() {
            Ok(Response::Error(e)) => Err(DispatchError::from(e)),
            Ok(response) => Ok(response),
            Err(e) => Err(DispatchError::UnexpectedResponse(e.to_string())),
        };
        self.table.settle(id, completion);
    }

    /// Run the receive loop until the channel ends or fails.
    ///
    /// End of stream is a channel failure: whatever is still pending can no
    /// longer be answered.
    pub async fn listen<R: EventReceiver>(&self, mut receiver: R) {
        while let Some(event) = receiver.recv().await {
            if !self.handle_event(event) {
                return;
            }
        }
        debug!("Worker side of channel ended");
        self.fail_channel("worker disconnected");
    }

    /// Spawn [`Dispatcher::listen`] on the runtime.
    pub fn spawn_listener<R>(self: &Arc<Self>, receiver: R) -> JoinHandle<()>
    where
        R: EventReceiver + 'static,
    {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move { dispatcher.listen(receiver).await })
    }

    /// Mark the channel unusable and reject everything pending.
    ///
    /// Returns the number of requests rejected.
    pub fn fail_channel(&self, reason: impl Into<String>) -> usize {
        let reason = reason.into();
        let reason = self.mark_closed(reason);
        self.poster.close();
        self.table.drain_all(DispatchError::ChannelClosed(reason))
    }

    /// Close the channel and reject everything pending with
    /// [`DispatchError::Terminated`]. Idempotent.
    pub fn terminate(&self) -> usize {
        if self.terminated.swap(true, Ordering::SeqCst) {
            debug!("Dispatcher already terminated");
            return 0;
        }
        self.mark_closed("dispatcher terminated".to_string());
        self.poster.close();
        let drained = self.table.drain_all(DispatchError::Terminated);
        debug!(drained, "Dispatcher terminated");
        drained
    }

    pub fn is_closed(&self) -> bool {
        self.closed.lock().is_some()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    pub fn pending_count(&self) -> usize {
        self.table.pending_count()
    }

    pub fn stats(&self) -> &PendingStats {
        self.table.stats()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    fn closed_reason(&self) -> Option<String> {
        self.closed.lock().clone()
    }

    /// First reason wins; returns the reason in effect.
    fn mark_closed(&self, reason: String) -> String {
        self.closed.lock().get_or_insert(reason).clone()
    }
}

fn flatten(completion: Result<Completion, oneshot::error::RecvError>) -> Completion {
    // Only an entry dropped without being settled closes the oneshot.
    completion.unwrap_or_else(|_| {
        Err(DispatchError::ChannelClosed(
            "completion dropped".to_string(),
        ))
    })
}
