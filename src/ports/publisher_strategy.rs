//! PublisherStrategy port - one implementation per platform.
//!
//! Strategies translate a publish context into platform API calls. Expected
//! platform outcomes (quota exhausted, content rejected by policy) come back
//! as a failed `PublishResult`; `PlatformError` is reserved for conditions
//! the strategy could not interpret.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::domain::account::ConnectedAccount;
use crate::domain::publishing::{FailureKind, Platform, PublishRequestEvent, PublishResult};

/// Everything a strategy needs for one publish call.
#[derive(Debug, Clone)]
pub struct PublishContext {
    pub request: PublishRequestEvent,
    pub account: ConnectedAccount,
    pub access_token: SecretString,
}

impl PublishContext {
    pub fn new(
        request: PublishRequestEvent,
        account: ConnectedAccount,
        access_token: SecretString,
    ) -> Self {
        Self {
            request,
            account,
            access_token,
        }
    }

    pub fn post_type(&self) -> &str {
        self.request.effective_post_type()
    }
}

/// Unexpected strategy failures.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Dependency unavailable: {0}")]
    Dependency(String),

    #[error("Unexpected response (status {status}): {message}")]
    UnexpectedResponse { status: u16, message: String },

    #[error("Strategy misconfigured: {0}")]
    Internal(String),
}

impl PlatformError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PlatformError::Network(_)
            | PlatformError::Timeout(_)
            | PlatformError::Dependency(_)
            | PlatformError::UnexpectedResponse { .. } => FailureKind::TransientNetwork,
            PlatformError::Internal(_) => FailureKind::Configuration,
        }
    }
}

/// Publishes content to one platform.
#[async_trait]
pub trait PublisherStrategy: Send + Sync {
    /// Platform this strategy serves; used as the registry key.
    fn platform(&self) -> Platform;

    async fn publish(&self, context: &PublishContext) -> Result<PublishResult, PlatformError>;
}
