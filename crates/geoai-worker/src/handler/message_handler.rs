//! Decode a request, route it to the session API, encode the answer.
//!
//! Every answered request carries the id it arrived with. A message whose id
//! cannot be recovered cannot be answered and is dropped.

use geoai_types::{codec, DecodeError, Envelope, Pong, Request, RequestId, Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::WorkerError;
use crate::metrics::WorkerMetrics;
use crate::ports::SessionApi;

pub struct MessageHandler<S: SessionApi> {
    session: Arc<S>,
    metrics: WorkerMetrics,
}

impl<S: SessionApi> MessageHandler<S> {
    pub fn new(session: Arc<S>) -> Self {
        Self {
            session,
            metrics: WorkerMetrics::new(),
        }
    }

    /// Handle one wire message; returns the response wire text, if any.
    pub async fn handle(&self, wire: &str) -> Option<String> {
        self.metrics.record_received();
        let started = Instant::now();

        let envelope = match codec::decode(wire) {
            Ok(envelope) => envelope,
            Err(e) => match codec::recover_id(wire) {
                Some(id) => {
                    warn!(request_id = %id, error = %e, "Rejecting malformed request");
                    return Some(self.answer(id, "invalid", Err(e.into()), started));
                }
                None => {
                    warn!(error = %e, "Dropping message without a usable id");
                    self.metrics.record_dropped();
                    return None;
                }
            },
        };

        let id = envelope.id;
        let message_type = envelope.message_type.clone();
        let result = if envelope.is_response() {
            warn!(request_id = %id, message_type = %message_type, "Response sent to worker");
            Err(DecodeError::UnexpectedResponse(message_type.clone()).into())
        } else {
            match envelope.into_request() {
                Ok(request) => self.route(id, request).await,
                Err(e) => {
                    warn!(request_id = %id, message_type = %message_type, error = %e, "Invalid request payload");
                    Err(e.into())
                }
            }
        };

        Some(self.answer(id, &message_type, result, started))
    }

    async fn route(&self, id: RequestId, request: Request) -> Result<Response, WorkerError> {
        debug!(request_id = %id, operation = request.operation(), "Handling request");
        match request {
            Request::Init(r) => self.session.handle_init(r).await.map(Response::Init),
            Request::Call(r) => self.session.handle_call(r).await.map(Response::Call),
            Request::Dispose(r) => self.session.handle_dispose(r).map(Response::Dispose),
            Request::Ping => Ok(Response::Pong(Pong {
                instances: self.session.instance_count(),
            })),
        }
    }

    fn answer(
        &self,
        id: RequestId,
        message_type: &str,
        result: Result<Response, WorkerError>,
        started: Instant,
    ) -> String {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                debug!(request_id = %id, kind = %e.kind(), error = %e, "Request failed");
                Response::Error(e.to_error_response())
            }
        };
        self.metrics
            .record_handled(message_type, response.is_success(), started.elapsed());
        Envelope::response(id, &response).to_wire()
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    pub fn metrics(&self) -> &WorkerMetrics {
        &self.metrics
    }
}
