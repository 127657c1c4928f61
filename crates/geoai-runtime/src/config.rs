//! Runtime configuration: one section per component.

use geoai_dispatch::DispatcherConfig;
use geoai_telemetry::TelemetryConfig;
use geoai_worker::WorkerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Dispatcher config: {0}")]
    Dispatcher(#[from] geoai_dispatch::ConfigError),

    #[error("Worker config: {0}")]
    Worker(#[from] geoai_worker::domain::ConfigError),

    #[error("Telemetry: {0}")]
    Telemetry(#[from] geoai_telemetry::TelemetryError),
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub telemetry: TelemetryConfig,
    pub dispatcher: DispatcherConfig,
    pub worker: WorkerConfig,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self {
            telemetry: TelemetryConfig::from_env(),
            dispatcher: DispatcherConfig::from_env(),
            worker: WorkerConfig::from_env(),
        }
    }

    pub fn validate(&self) -> Result<(), RuntimeError> {
        self.telemetry.validate()?;
        self.dispatcher.validate()?;
        self.worker.validate()?;
        Ok(())
    }
}
