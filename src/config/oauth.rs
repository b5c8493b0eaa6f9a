//! OAuth client registrations

use secrecy::SecretString;
use serde::Deserialize;

use crate::domain::publishing::Platform;

use super::error::ValidationError;
use super::platforms::check_url;

/// Client credentials for each platform's token endpoint.
///
/// A platform without credentials can still publish with stored tokens
/// but any refresh for it fails as a configuration error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthConfig {
    pub youtube: Option<OAuthClientConfig>,
    pub linkedin: Option<OAuthClientConfig>,
    pub instagram: Option<OAuthClientConfig>,
    pub facebook: Option<OAuthClientConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthClientConfig {
    /// Defaults to the platform's public token endpoint
    pub token_url: Option<String>,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl OAuthConfig {
    pub fn client(&self, platform: Platform) -> Option<&OAuthClientConfig> {
        match platform {
            Platform::Youtube => self.youtube.as_ref(),
            Platform::Linkedin => self.linkedin.as_ref(),
            Platform::Instagram => self.instagram.as_ref(),
            Platform::Facebook => self.facebook.as_ref(),
        }
    }

    /// Platforms with credentials, paired with the token URL to use.
    pub fn configured(&self) -> Vec<(Platform, &OAuthClientConfig, String)> {
        Platform::ALL
            .iter()
            .filter_map(|&p| self.client(p).map(|c| (p, c, c.token_url_for(p))))
            .collect()
    }

    pub fn validate(&self, require_https: bool) -> Result<(), ValidationError> {
        for (platform, client, token_url) in self.configured() {
            if client.client_id.trim().is_empty() {
                return Err(ValidationError::MissingRequired(client_id_key(platform)));
            }
            check_url("OAUTH token_url", &token_url)?;
            if require_https && !token_url.starts_with("https://") {
                return Err(ValidationError::MustBeHttps("OAuth token URL"));
            }
        }
        Ok(())
    }
}

impl OAuthClientConfig {
    pub fn token_url_for(&self, platform: Platform) -> String {
        self.token_url
            .clone()
            .unwrap_or_else(|| default_token_url(platform).to_string())
    }
}

fn default_token_url(platform: Platform) -> &'static str {
    match platform {
        Platform::Youtube => "https://oauth2.googleapis.com/token",
        Platform::Linkedin => "https://www.linkedin.com/oauth/v2/accessToken",
        Platform::Instagram | Platform::Facebook => {
            "https://graph.facebook.com/v19.0/oauth/access_token"
        }
    }
}

fn client_id_key(platform: Platform) -> &'static str {
    match platform {
        Platform::Youtube => "OAUTH__YOUTUBE__CLIENT_ID",
        Platform::Linkedin => "OAUTH__LINKEDIN__CLIENT_ID",
        Platform::Instagram => "OAUTH__INSTAGRAM__CLIENT_ID",
        Platform::Facebook => "OAUTH__FACEBOOK__CLIENT_ID",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token_url: Option<&str>) -> OAuthClientConfig {
        OAuthClientConfig {
            token_url: token_url.map(str::to_string),
            client_id: "client-1".to_string(),
            client_secret: SecretString::new("shh".to_string()),
        }
    }

    #[test]
    fn empty_config_is_valid() {
        let config = OAuthConfig::default();
        assert!(config.configured().is_empty());
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn token_url_falls_back_to_platform_default() {
        let config = OAuthConfig {
            youtube: Some(client(None)),
            ..Default::default()
        };
        let configured = config.configured();
        assert_eq!(configured.len(), 1);
        assert_eq!(configured[0].0, Platform::Youtube);
        assert_eq!(configured[0].2, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn explicit_token_url_wins() {
        let config = OAuthConfig {
            linkedin: Some(client(Some("http://localhost:8089/token"))),
            ..Default::default()
        };
        assert_eq!(config.configured()[0].2, "http://localhost:8089/token");
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn plain_http_token_url_is_rejected_when_https_required() {
        let config = OAuthConfig {
            facebook: Some(client(Some("http://localhost:8089/token"))),
            ..Default::default()
        };
        assert!(matches!(config.validate(true), Err(ValidationError::MustBeHttps(_))));
    }

    #[test]
    fn blank_client_id_is_rejected() {
        let mut c = client(None);
        c.client_id = String::new();
        let config = OAuthConfig {
            instagram: Some(c),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(false),
            Err(ValidationError::MissingRequired("OAUTH__INSTAGRAM__CLIENT_ID"))
        ));
    }

    #[test]
    fn debug_output_hides_client_secret() {
        let debug = format!("{:?}", client(None));
        assert!(!debug.contains("shh"));
    }
}
