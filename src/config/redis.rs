//! Redis configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Redis connection used for the request queue and event channel
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        Ok(())
    }
}
