//! PublishRequestSource port - where inbound publish requests come from.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::publishing::PublishRequestEvent;

#[async_trait]
pub trait PublishRequestSource: Send + Sync {
    /// Wait for the next request.
    ///
    /// Returns `None` when no request arrived within the source's poll
    /// window, so the caller can check for shutdown.
    async fn next_request(&self) -> Result<Option<PublishRequestEvent>, DomainError>;
}
