//! PublishedPost repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PublishJobId};
use crate::domain::publishing::PublishedPost;

/// Stores success records. At most one row per publish job.
#[async_trait]
pub trait PublishedPostRepository: Send + Sync {
    /// Insert the success record for a job.
    ///
    /// # Errors
    ///
    /// - `DuplicateKey` if the job already has a published post
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, post: &PublishedPost) -> Result<(), DomainError>;

    async fn find_by_job_id(
        &self,
        job_id: &PublishJobId,
    ) -> Result<Option<PublishedPost>, DomainError>;
}
