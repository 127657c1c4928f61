//! Worker configuration

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid config: max_instances must be greater than zero")]
    ZeroInstances,
}

/// Worker configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Live pipeline instances allowed at once; `init` beyond this fails.
    pub max_instances: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { max_instances: 16 }
    }
}

impl WorkerConfig {
    /// Defaults overridden by `GEOAI_MAX_INSTANCES`, if set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_instances: env::var("GEOAI_MAX_INSTANCES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_instances),
        }
    }

    pub fn with_max_instances(mut self, max_instances: usize) -> Self {
        self.max_instances = max_instances;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_instances == 0 {
            return Err(ConfigError::ZeroInstances);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(WorkerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_instances_rejected() {
        let config = WorkerConfig::default().with_max_instances(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroInstances));
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: WorkerConfig = serde_json::from_str(r#"{"max_instances":4}"#).unwrap();
        assert_eq!(config.max_instances, 4);
    }
}
