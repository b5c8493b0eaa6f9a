//! Platform API endpoints

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::platforms::{
    DEFAULT_GRAPH_API_BASE, DEFAULT_LINKEDIN_API_BASE, DEFAULT_YOUTUBE_API_BASE,
};

use super::error::ValidationError;

/// Base URLs for the platform APIs and the shared HTTP timeout.
///
/// Overriding a base URL points a strategy at a sandbox or a local stub.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformsConfig {
    #[serde(default = "default_youtube_base")]
    pub youtube_base_url: String,

    #[serde(default = "default_linkedin_base")]
    pub linkedin_base_url: String,

    /// Graph API base shared by Instagram and Facebook
    #[serde(default = "default_graph_base")]
    pub graph_base_url: String,

    /// Per-request timeout for platform and token endpoint calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PlatformsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_url("PLATFORMS__YOUTUBE_BASE_URL", &self.youtube_base_url)?;
        check_url("PLATFORMS__LINKEDIN_BASE_URL", &self.linkedin_base_url)?;
        check_url("PLATFORMS__GRAPH_BASE_URL", &self.graph_base_url)?;
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout("platform requests"));
        }
        Ok(())
    }
}

pub(super) fn check_url(name: &'static str, url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::MissingRequired(name));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::InvalidUrl(name));
    }
    Ok(())
}

impl Default for PlatformsConfig {
    fn default() -> Self {
        Self {
            youtube_base_url: default_youtube_base(),
            linkedin_base_url: default_linkedin_base(),
            graph_base_url: default_graph_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_youtube_base() -> String {
    DEFAULT_YOUTUBE_API_BASE.to_string()
}

fn default_linkedin_base() -> String {
    DEFAULT_LINKEDIN_API_BASE.to_string()
}

fn default_graph_base() -> String {
    DEFAULT_GRAPH_API_BASE.to_string()
}

// Uploads stream whole video files.
fn default_request_timeout() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_apis() {
        let config = PlatformsConfig::default();
        assert_eq!(config.youtube_base_url, "https://www.googleapis.com");
        assert_eq!(config.linkedin_base_url, "https://api.linkedin.com");
        assert!(config.graph_base_url.starts_with("https://graph.facebook.com/"));
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn local_stub_url_is_accepted() {
        let config = PlatformsConfig {
            linkedin_base_url: "http://127.0.0.1:9000".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn schemeless_url_is_rejected() {
        let config = PlatformsConfig {
            graph_base_url: "graph.facebook.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidUrl("PLATFORMS__GRAPH_BASE_URL"))
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = PlatformsConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
