//! Domain layer: instance records and worker configuration.

pub mod config;
pub mod instance;

pub use config::{ConfigError, WorkerConfig};
pub use instance::InstanceRecord;
