//! In-memory PublishedPost repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PublishJobId};
use crate::domain::publishing::PublishedPost;
use crate::ports::PublishedPostRepository;

/// Keyed by job id, so a second post for the same job is a duplicate.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPublishedPostRepository {
    posts: Arc<RwLock<HashMap<PublishJobId, PublishedPost>>>,
}

impl InMemoryPublishedPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.posts.read().await.len()
    }
}

#[async_trait]
impl PublishedPostRepository for InMemoryPublishedPostRepository {
    async fn insert(&self, post: &PublishedPost) -> Result<(), DomainError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.publish_job_id) {
            return Err(DomainError::new(
                ErrorCode::DuplicateKey,
                format!("Publish job {} already has a published post", post.publish_job_id),
            ));
        }
        posts.insert(post.publish_job_id, post.clone());
        Ok(())
    }

    async fn find_by_job_id(
        &self,
        job_id: &PublishJobId,
    ) -> Result<Option<PublishedPost>, DomainError> {
        Ok(self.posts.read().await.get(job_id).cloned())
    }
}
