//! HTTP OAuth token client.
//!
//! Performs the `refresh_token` grant against each platform's token
//! endpoint with a form-encoded POST. Client credentials are configured
//! per platform; a platform without credentials cannot refresh.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::publishing::Platform;
use crate::ports::{OAuthTokenClient, TokenEndpointError, TokenGrant};

/// Lifetime assumed when the endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Token endpoint and client credentials for one platform.
#[derive(Debug, Clone)]
pub struct OAuthClientCredentials {
    pub token_url: String,
    pub client_id: String,
    client_secret: SecretString,
}

impl OAuthClientCredentials {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret,
        }
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

pub struct HttpOAuthTokenClient {
    client: Client,
    credentials: HashMap<Platform, OAuthClientCredentials>,
}

impl HttpOAuthTokenClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            credentials: HashMap::new(),
        }
    }

    pub fn with_credentials(
        mut self,
        platform: Platform,
        credentials: OAuthClientCredentials,
    ) -> Self {
        self.credentials.insert(platform, credentials);
        self
    }

    fn classify(status: StatusCode, body: String) -> TokenEndpointError {
        match status.as_u16() {
            429 => TokenEndpointError::RateLimited { body },
            400..=499 => TokenEndpointError::Rejected {
                status: status.as_u16(),
                body,
            },
            code => TokenEndpointError::Unavailable { status: code, body },
        }
    }
}

#[async_trait]
impl OAuthTokenClient for HttpOAuthTokenClient {
    async fn refresh(
        &self,
        platform: Platform,
        refresh_token: &SecretString,
    ) -> Result<TokenGrant, TokenEndpointError> {
        let credentials = self
            .credentials
            .get(&platform)
            .ok_or(TokenEndpointError::NotConfigured(platform))?;

        let request = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token: refresh_token.expose_secret(),
            client_id: &credentials.client_id,
            client_secret: credentials.client_secret.expose_secret(),
        };

        let response = self
            .client
            .post(&credentials.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| TokenEndpointError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                platform = %platform,
                status = status.as_u16(),
                "Token endpoint returned error"
            );
            return Err(Self::classify(status, body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| TokenEndpointError::MalformedResponse(e.to_string()))?;

        Ok(TokenGrant {
            access_token: SecretString::new(token.access_token),
            expires_in_secs: token.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            refresh_token: token.refresh_token.map(SecretString::new),
        })
    }
}
