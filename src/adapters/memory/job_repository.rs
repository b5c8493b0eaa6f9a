//! In-memory PublishJob repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PublishJobId};
use crate::domain::publishing::PublishJob;
use crate::ports::PublishJobRepository;

/// In-memory job store enforcing idempotency-key uniqueness.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublishJobRepository {
    jobs: Arc<RwLock<HashMap<PublishJobId, PublishJob>>>,
    updates: Arc<AtomicUsize>,
}

impl InMemoryPublishJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<PublishJob> {
        self.jobs.read().await.values().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Number of successful `update` calls so far.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublishJobRepository for InMemoryPublishJobRepository {
    async fn insert(&self, job: &PublishJob) -> Result<(), DomainError> {
        let mut jobs = self.jobs.write().await;

        if jobs.contains_key(&job.id) {
            return Err(DomainError::new(
                ErrorCode::DuplicateKey,
                format!("Publish job {} already exists", job.id),
            ));
        }
        if let Some(key) = &job.idempotency_key {
            if jobs.values().any(|j| j.idempotency_key.as_ref() == Some(key)) {
                return Err(DomainError::new(
                    ErrorCode::DuplicateKey,
                    format!("Idempotency key '{}' already in use", key),
                )
                .with_detail("idempotency_key", key.clone()));
            }
        }

        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn update(&self, job: &PublishJob) -> Result<bool, DomainError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&job.id) {
            Some(existing) if existing.is_terminal() => Ok(false),
            Some(existing) => {
                *existing = job.clone();
                self.updates.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            None => Err(DomainError::new(
                ErrorCode::PublishJobNotFound,
                format!("Publish job {} not found", job.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &PublishJobId) -> Result<Option<PublishJob>, DomainError> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<PublishJob>, DomainError> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .find(|j| j.idempotency_key.as_deref() == Some(key))
            .cloned())
    }
}
