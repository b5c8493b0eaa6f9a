//! Execution engine tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Retry budget and token refresh settings
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Applied when a request does not carry its own `max_retries`
    #[serde(default = "default_max_retries")]
    pub default_max_retries: u32,

    /// Refresh tokens expiring within this many seconds
    #[serde(default = "default_refresh_buffer")]
    pub refresh_buffer_secs: u64,

    /// Upper bound for one token endpoint call
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout_secs: u64,
}

impl EngineConfig {
    pub fn refresh_buffer(&self) -> Duration {
        Duration::from_secs(self.refresh_buffer_secs)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_max_retries > 10 {
            return Err(ValidationError::MaxRetriesTooLarge);
        }
        if self.refresh_timeout_secs == 0 || self.refresh_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("token refresh"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_retries: default_max_retries(),
            refresh_buffer_secs: default_refresh_buffer(),
            refresh_timeout_secs: default_refresh_timeout(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_refresh_buffer() -> u64 {
    300
}

fn default_refresh_timeout() -> u64 {
    15
}
