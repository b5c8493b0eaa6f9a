//! PublishJob repository port.
//!
//! # Design
//!
//! - **Idempotency**: `idempotency_key` is unique when present; a second
//!   insert with the same key fails with `DuplicateKey`
//! - **Terminal rows**: `update` only writes while the stored row is still
//!   Pending, so a stale copy can never overwrite a finished job

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PublishJobId};
use crate::domain::publishing::PublishJob;

/// Repository port for PublishJob persistence.
#[async_trait]
pub trait PublishJobRepository: Send + Sync {
    /// Insert a new job.
    ///
    /// # Errors
    ///
    /// - `DuplicateKey` if another job already holds the idempotency key
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, job: &PublishJob) -> Result<(), DomainError>;

    /// Overwrite the mutable fields of a job whose stored row is Pending.
    ///
    /// Returns `false` without writing when the stored row is already
    /// terminal.
    ///
    /// # Errors
    ///
    /// - `PublishJobNotFound` if the job doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, job: &PublishJob) -> Result<bool, DomainError>;

    async fn find_by_id(&self, id: &PublishJobId) -> Result<Option<PublishJob>, DomainError>;

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<PublishJob>, DomainError>;
}
