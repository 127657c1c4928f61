//! # GeoAI Worker
//!
//! Worker side of the boundary: owns every live pipeline instance and answers
//! `init`, `call`, `dispose` and `ping` requests arriving over a channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    WORKER (geoai-worker)                │
//! ├─────────────────────────────────────────────────────────┤
//! │  WorkerRuntime (adapters)   receive → handle → post     │
//! │        │                                                │
//! │  MessageHandler (handler)   decode → route → encode     │
//! │        │                                                │
//! │  PipelineSessionManager     instance registry           │
//! │        │                                                │
//! │  PipelineFactory / Pipeline (ports)  ML backend         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are handled one at a time, to completion. Anything that arrives
//! meanwhile waits in the channel.
//!
//! ## Usage
//!
//! ```ignore
//! use geoai_worker::{FnPipeline, PipelineSessionManager, StaticPipelineFactory, WorkerConfig, WorkerRuntime};
//!
//! let factory = StaticPipelineFactory::new().with_pipeline("building-detection", |_, _, _| {
//!     Ok(Box::new(FnPipeline::new(|input| Ok(input))))
//! });
//! let session = Arc::new(PipelineSessionManager::new(factory, WorkerConfig::default()));
//! let runtime = Arc::new(WorkerRuntime::new(session));
//! runtime.spawn(worker_endpoint);
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{FnPipeline, StaticPipelineFactory, WorkerRuntime};
pub use domain::{InstanceRecord, WorkerConfig};
pub use error::{BackendError, WorkerError};
pub use handler::MessageHandler;
pub use metrics::WorkerMetrics;
pub use ports::{Pipeline, PipelineFactory, SessionApi};
pub use service::PipelineSessionManager;
