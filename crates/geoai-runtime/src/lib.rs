//! # GeoAI Runtime
//!
//! Wires the caller side and the worker side together in one process.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment ([`RuntimeConfig::from_env`])
//! 2. Install telemetry (logging + metrics)
//! 3. Build the session manager over a pipeline factory
//! 4. Spawn the worker loop on its end of a fresh channel
//! 5. Connect an [`InferenceClient`](geoai_dispatch::InferenceClient) to the other end

pub mod config;
pub mod demo;
pub mod node;

pub use config::{RuntimeConfig, RuntimeError};
pub use node::WorkerNode;
