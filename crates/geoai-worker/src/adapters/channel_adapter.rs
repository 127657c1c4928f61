//! Channel adapter: the worker's message loop.
//!
//! Receives wire messages from the caller, handles each one to completion and
//! posts the answer back. The loop ends when the caller closes its side; every
//! live instance is then released.

use geoai_channel::{MessagePoster, MessageReceiver, WorkerEndpoint};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::handler::MessageHandler;
use crate::ports::SessionApi;

/// Drives a [`SessionApi`] from a channel.
pub struct WorkerRuntime<S: SessionApi> {
    handler: MessageHandler<S>,
}

impl<S: SessionApi + 'static> WorkerRuntime<S> {
    pub fn new(session: Arc<S>) -> Self {
        Self {
            handler: MessageHandler::new(session),
        }
    }

    /// Serve `endpoint` until the caller goes away.
    ///
    /// Returns the number of messages received.
    pub async fn run(&self, endpoint: WorkerEndpoint) -> u64 {
        let (poster, receiver) = endpoint.into_parts();
        self.serve(&poster, receiver).await
    }

    /// Serve any poster/receiver pair until the receiver ends or posting fails.
    pub async fn serve<P, R>(&self, poster: &P, mut receiver: R) -> u64
    where
        P: MessagePoster,
        R: MessageReceiver,
    {
        info!("Worker started");
        let mut received = 0u64;

        while let Some(wire) = receiver.recv().await {
            received += 1;
            let Some(reply) = self.handler.handle(&wire).await else {
                continue;
            };
            if let Err(e) = poster.post(reply).await {
                warn!(error = %e, "Caller stopped listening, shutting down");
                break;
            }
        }

        debug!(received, "Worker message loop ended");
        poster.close();
        let released = self.handler.session().release_all();
        info!(received, released, "Worker stopped");
        received
    }

    /// Spawn [`WorkerRuntime::run`] on the runtime.
    pub fn spawn(self: Arc<Self>, endpoint: WorkerEndpoint) -> JoinHandle<u64> {
        tokio::spawn(async move { self.run(endpoint).await })
    }

    pub fn handler(&self) -> &MessageHandler<S> {
        &self.handler
    }

    pub fn session(&self) -> &Arc<S> {
        self.handler.session()
    }
}
