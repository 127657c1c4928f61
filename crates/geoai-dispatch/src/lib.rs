//! GeoAI Dispatch - caller side of the worker boundary.
//!
//! Issues correlated requests to a pipeline worker over a channel and settles
//! each one exactly once: with the worker's response, with a timeout, or with
//! a channel failure.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    CALLER (geoai-dispatch)                │
//! ├───────────────────────────────────────────────────────────┤
//! │   InferenceClient  initialize / run / dispose / ping      │
//! │          │                                                │
//! │   ┌──────┴─────────────────────────────┐                  │
//! │   │             Dispatcher             │                  │
//! │   │  id generator · timers · listener  │                  │
//! │   └──────┬─────────────────────────────┘                  │
//! │          │                                                │
//! │   ┌──────┴─────────────────────────────┐                  │
//! │   │         Correlation Table          │                  │
//! │   │   RequestId → pending completion   │                  │
//! │   └────────────────────────────────────┘                  │
//! └──────────┼────────────────────────────────────────────────┘
//!            │  wire envelopes
//!       Channel (geoai-channel)
//!            │
//!      Worker (geoai-worker)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use geoai_channel::channel_pair;
//! use geoai_dispatch::{DispatcherConfig, InferenceClient};
//! use geoai_types::TaskDescriptor;
//!
//! let (caller, worker) = channel_pair(64);
//! // hand `worker` to a geoai_worker::WorkerRuntime
//! let client = InferenceClient::connect(caller, DispatcherConfig::default())?;
//! let handle = client
//!     .initialize(vec![TaskDescriptor::new("building-detection")], config, None)
//!     .await?;
//! let output = client.run(&handle.task, &handle.instance_id, input).await?;
//! client.terminate();
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod ipc;
pub mod service;

pub use domain::config::{ConfigError, DispatcherConfig};
pub use domain::error::DispatchError;
pub use domain::pending::{CorrelationTable, PendingStats};
pub use ipc::dispatcher::Dispatcher;
pub use service::{InferenceClient, PipelineHandle};
