//! Adapters (hexagonal architecture)
//!
//! - `channel_adapter`: drives the session manager from a channel endpoint
//! - `static_factory`: in-process backend registry keyed by task

pub mod channel_adapter;
pub mod static_factory;

pub use channel_adapter::WorkerRuntime;
pub use static_factory::{FnPipeline, StaticPipelineFactory};
