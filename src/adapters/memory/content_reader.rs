//! In-memory ContentItem reader.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::content::ContentItem;
use crate::domain::foundation::{ContentItemId, DomainError};
use crate::ports::ContentItemReader;

#[derive(Debug, Clone, Default)]
pub struct InMemoryContentItemReader {
    items: Arc<RwLock<HashMap<ContentItemId, ContentItem>>>,
}

impl InMemoryContentItemReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, item: ContentItem) {
        self.items.write().await.insert(item.id, item);
    }
}

#[async_trait]
impl ContentItemReader for InMemoryContentItemReader {
    async fn get(&self, id: &ContentItemId) -> Result<Option<ContentItem>, DomainError> {
        Ok(self.items.read().await.get(id).cloned())
    }
}
