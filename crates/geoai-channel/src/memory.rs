//! # In-Memory Channel
//!
//! A channel pair built on bounded `tokio::sync::mpsc` queues. Suitable for a
//! worker running as tokio tasks in the same process; other deployments
//! implement the traits in [`crate::transport`] over their own transport.

use crate::events::ChannelEvent;
use crate::transport::{ChannelError, EventReceiver, MessagePoster, MessageReceiver};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// Create a connected caller/worker endpoint pair.
pub fn channel_pair(capacity: usize) -> (CallerEndpoint, WorkerEndpoint) {
    let capacity = capacity.max(1);
    let (to_worker_tx, to_worker_rx) = mpsc::channel(capacity);
    let (to_caller_tx, to_caller_rx) = mpsc::channel(capacity);

    let caller = CallerEndpoint {
        poster: CallerPoster {
            tx: Mutex::new(Some(to_worker_tx)),
            posted: AtomicU64::new(0),
        },
        receiver: CallerReceiver(to_caller_rx),
    };
    let worker = WorkerEndpoint {
        poster: WorkerPoster {
            tx: Mutex::new(Some(to_caller_tx)),
            failure: Mutex::new(None),
            posted: AtomicU64::new(0),
        },
        receiver: WorkerReceiver(to_worker_rx),
    };
    (caller, worker)
}

/// Caller side of a channel.
pub struct CallerEndpoint {
    pub poster: CallerPoster,
    pub receiver: CallerReceiver,
}

impl CallerEndpoint {
    pub fn into_parts(self) -> (CallerPoster, CallerReceiver) {
        (self.poster, self.receiver)
    }
}

/// Worker side of a channel.
pub struct WorkerEndpoint {
    pub poster: WorkerPoster,
    pub receiver: WorkerReceiver,
}

impl WorkerEndpoint {
    pub fn into_parts(self) -> (WorkerPoster, WorkerReceiver) {
        (self.poster, self.receiver)
    }
}

/// Posts requests from the caller to the worker.
pub struct CallerPoster {
    tx: Mutex<Option<mpsc::Sender<String>>>,
    posted: AtomicU64,
}

impl CallerPoster {
    /// Total messages posted.
    pub fn messages_posted(&self) -> u64 {
        self.posted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessagePoster for CallerPoster {
    async fn post(&self, wire: String) -> Result<(), ChannelError> {
        // Clone out of the lock; never hold it across the send.
        let tx = self.tx.lock().clone().ok_or(ChannelError::Closed)?;
        tx.send(wire).await.map_err(|_| ChannelError::Closed)?;
        self.posted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn close(&self) {
        if self.tx.lock().take().is_some() {
            debug!("Caller side of channel closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.lock().as_ref().map_or(true, mpsc::Sender::is_closed)
    }
}

/// Receives worker events on the caller side.
pub struct CallerReceiver(mpsc::Receiver<ChannelEvent>);

#[async_trait]
impl EventReceiver for CallerReceiver {
    async fn recv(&mut self) -> Option<ChannelEvent> {
        self.0.recv().await
    }
}

/// Posts responses (and transport failures) from the worker to the caller.
pub struct WorkerPoster {
    tx: Mutex<Option<mpsc::Sender<ChannelEvent>>>,
    /// Reason given to [`WorkerPoster::fail`], once it has been called.
    failure: Mutex<Option<String>>,
    posted: AtomicU64,
}

impl WorkerPoster {
    /// Report a transport-level failure to the caller and close the channel.
    ///
    /// A channel fails once; later calls return [`ChannelError::Failed`] with
    /// the first reason.
    pub async fn fail(&self, reason: impl Into<String>) -> Result<(), ChannelError> {
        let reason = reason.into();
        let tx = {
            let mut failure = self.failure.lock();
            if let Some(first) = failure.as_ref() {
                return Err(ChannelError::Failed(first.clone()));
            }
            let tx = self.tx.lock().take().ok_or(ChannelError::Closed)?;
            *failure = Some(reason.clone());
            tx
        };
        tx.send(ChannelEvent::Error(reason))
            .await
            .map_err(|_| ChannelError::Closed)
    }

    fn closed_error(&self) -> ChannelError {
        match self.failure.lock().as_ref() {
            Some(reason) => ChannelError::Failed(reason.clone()),
            None => ChannelError::Closed,
        }
    }

    /// Total messages posted.
    pub fn messages_posted(&self) -> u64 {
        self.posted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessagePoster for WorkerPoster {
    async fn post(&self, wire: String) -> Result<(), ChannelError> {
        let tx = self.tx.lock().clone();
        let tx = tx.ok_or_else(|| self.closed_error())?;
        tx.send(ChannelEvent::Message(wire))
            .await
            .map_err(|_| ChannelError::Closed)?;
        self.posted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn close(&self) {
        if self.tx.lock().take().is_some() {
            debug!("Worker side of channel closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.tx.lock().as_ref().map_or(true, mpsc::Sender::is_closed)
    }
}

/// Receives caller requests on the worker side.
pub struct WorkerReceiver(mpsc::Receiver<String>);

#[async_trait]
impl MessageReceiver for WorkerReceiver {
    async fn recv(&mut self) -> Option<String> {
        self.0.recv().await
    }
}
