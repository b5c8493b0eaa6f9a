//! ContentItemReader port - read access to content owned elsewhere.

use async_trait::async_trait;

use crate::domain::content::ContentItem;
use crate::domain::foundation::{ContentItemId, DomainError};

#[async_trait]
pub trait ContentItemReader: Send + Sync {
    /// Returns `None` if the content item does not exist.
    async fn get(&self, id: &ContentItemId) -> Result<Option<ContentItem>, DomainError>;
}
