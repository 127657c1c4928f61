//! Dispatcher configuration.
//!
//! All timeouts have defaults and can be overridden from the environment:
//!
//! - `GEOAI_REQUEST_TIMEOUT_MS`: default bound for `call`, `dispose`, `ping`
//! - `GEOAI_INIT_TIMEOUT_MS`: bound for `init` (model loading is slow)
//! - `GEOAI_CHANNEL_CAPACITY`: messages buffered per channel direction

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid config: {field} must be greater than zero")]
    Zero { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Bound applied when a request does not carry its own timeout.
    pub default_timeout: Duration,
    /// Bound applied to `init` requests.
    pub init_timeout: Duration,
    /// Messages buffered per direction by [`DispatcherConfig::channel_pair`].
    pub channel_capacity: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            init_timeout: Duration::from_secs(120),
            channel_capacity: geoai_channel::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl DispatcherConfig {
    /// Defaults overridden by whatever is set in the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_timeout: env_millis("GEOAI_REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.default_timeout),
            init_timeout: env_millis("GEOAI_INIT_TIMEOUT_MS").unwrap_or(defaults.init_timeout),
            channel_capacity: env::var("GEOAI_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.channel_capacity),
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Create a caller/worker channel pair sized by this configuration.
    pub fn channel_pair(
        &self,
    ) -> (geoai_channel::CallerEndpoint, geoai_channel::WorkerEndpoint) {
        geoai_channel::channel_pair(self.channel_capacity)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout.is_zero() {
            return Err(ConfigError::Zero {
                field: "default_timeout",
            });
        }
        if self.init_timeout.is_zero() {
            return Err(ConfigError::Zero {
                field: "init_timeout",
            });
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "channel_capacity",
            });
        }
        Ok(())
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}
