//! Worker process configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Settings for the `publish-worker` consume loop.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Redis list the publish requests are popped from
    #[serde(default = "default_queue_key")]
    pub queue_key: String,

    /// Redis channel lifecycle events are published on
    #[serde(default = "default_events_channel")]
    pub events_channel: String,

    /// BRPOP block time in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Maximum number of jobs executing at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl WorkerConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("WORKER__QUEUE_KEY"));
        }
        if self.events_channel.trim().is_empty() {
            return Err(ValidationError::MissingRequired("WORKER__EVENTS_CHANNEL"));
        }
        if self.poll_timeout_secs == 0 || self.poll_timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout("worker poll"));
        }
        if self.concurrency == 0 || self.concurrency > 256 {
            return Err(ValidationError::InvalidConcurrency);
        }
        Ok(())
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
            queue_key: default_queue_key(),
            events_channel: default_events_channel(),
            poll_timeout_secs: default_poll_timeout(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_log_level() -> String {
    "info,publish_orchestrator=debug,sqlx=warn".to_string()
}

fn default_queue_key() -> String {
    "publish:requests".to_string()
}

fn default_events_channel() -> String {
    "publish:events".to_string()
}

fn default_poll_timeout() -> u64 {
    5
}

fn default_concurrency() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WorkerConfig::default();
        assert_eq!(config.queue_key, "publish:requests");
        assert_eq!(config.events_channel, "publish:events");
        assert_eq!(config.poll_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn is_production_follows_environment() {
        let mut config = WorkerConfig::default();
        assert!(!config.is_production());
        config.environment = Environment::Production;
        assert!(config.is_production());
    }

    #[test]
    fn blank_queue_key_is_rejected() {
        let config = WorkerConfig {
            queue_key: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("WORKER__QUEUE_KEY"))
        ));
    }

    #[test]
    fn poll_timeout_is_bounded() {
        let config = WorkerConfig {
            poll_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WorkerConfig {
            poll_timeout_secs: 120,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = WorkerConfig {
            concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidConcurrency)));
    }
}
