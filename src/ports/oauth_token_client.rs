//! OAuthTokenClient port - the platform token endpoints.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::domain::publishing::{FailureKind, Platform};

/// Tokens issued by a successful `refresh_token` grant.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: SecretString,
    pub expires_in_secs: u64,

    /// Present only when the provider rotates refresh tokens.
    pub refresh_token: Option<SecretString>,
}

#[derive(Debug, Clone, Error)]
pub enum TokenEndpointError {
    #[error("token endpoint rejected the grant ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("token endpoint rate limited the refresh: {body}")]
    RateLimited { body: String },

    #[error("token endpoint unavailable ({status}): {body}")]
    Unavailable { status: u16, body: String },

    #[error("token endpoint unreachable: {0}")]
    Network(String),

    #[error("token refresh timed out after {0}s")]
    Timeout(u64),

    #[error("no OAuth client configured for {0}")]
    NotConfigured(Platform),

    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}

impl TokenEndpointError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TokenEndpointError::Rejected { .. } => FailureKind::Auth,
            TokenEndpointError::RateLimited { .. } => FailureKind::RateLimited,
            TokenEndpointError::Unavailable { .. }
            | TokenEndpointError::Network(_)
            | TokenEndpointError::Timeout(_)
            | TokenEndpointError::MalformedResponse(_) => FailureKind::TransientNetwork,
            TokenEndpointError::NotConfigured(_) => FailureKind::Configuration,
        }
    }
}

#[async_trait]
pub trait OAuthTokenClient: Send + Sync {
    /// Exchange a refresh token for a new access token.
    async fn refresh(
        &self,
        platform: Platform,
        refresh_token: &SecretString,
    ) -> Result<TokenGrant, TokenEndpointError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_grant_is_auth() {
        let err = TokenEndpointError::Rejected { status: 400, body: "invalid_grant".into() };
        assert_eq!(err.kind(), FailureKind::Auth);
        assert!(!err.kind().is_retryable());
    }

    #[test]
    fn outages_are_retryable() {
        assert!(TokenEndpointError::Timeout(10).kind().is_retryable());
        assert!(TokenEndpointError::RateLimited { body: String::new() }.kind().is_retryable());
        assert!(TokenEndpointError::Unavailable { status: 503, body: String::new() }
            .kind()
            .is_retryable());
    }
}
