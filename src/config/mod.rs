//! Worker configuration
//!
//! Loaded from environment variables with the `config` and `dotenvy` crates.
//! Variables use the `PUBLISHER` prefix and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use publish_orchestrator::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Consuming {}", config.worker.queue_key);
//! ```

mod database;
mod engine;
mod error;
mod media;
mod oauth;
mod platforms;
mod redis;
mod worker;

pub use database::DatabaseConfig;
pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use media::MediaConfig;
pub use oauth::{OAuthClientConfig, OAuthConfig};
pub use platforms::PlatformsConfig;
pub use redis::RedisConfig;
pub use worker::{Environment, WorkerConfig};

use serde::Deserialize;

/// Root configuration for the `publish-worker` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub worker: WorkerConfig,

    pub database: DatabaseConfig,

    pub redis: RedisConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub platforms: PlatformsConfig,

    #[serde(default)]
    pub oauth: OAuthConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// Reads `.env` if present, then every `PUBLISHER__*` variable:
    ///
    /// - `PUBLISHER__DATABASE__URL=...` -> `database.url`
    /// - `PUBLISHER__OAUTH__YOUTUBE__CLIENT_ID=...` -> `oauth.youtube.client_id`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required values are missing or cannot be
    /// parsed into their expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PUBLISHER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    ///
    /// Production requires HTTPS token endpoints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.worker.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.engine.validate()?;
        self.platforms.validate()?;
        self.oauth.validate(self.is_production())?;
        self.media.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.worker.is_production()
    }
}
