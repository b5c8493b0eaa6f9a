//! In-memory media storage.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{MediaError, MediaStorage};

#[derive(Debug, Clone, Default)]
pub struct InMemoryMediaStorage {
    blobs: Arc<RwLock<HashMap<String, (Vec<u8>, String)>>>,
}

impl InMemoryMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(
        &self,
        path: impl Into<String>,
        bytes: Vec<u8>,
        content_type: impl Into<String>,
    ) {
        self.blobs
            .write()
            .await
            .insert(path.into(), (bytes, content_type.into()));
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn download(&self, path: &str) -> Result<Vec<u8>, MediaError> {
        self.blobs
            .read()
            .await
            .get(path)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| MediaError::NotFound(path.to_string()))
    }

    async fn content_type(&self, path: &str) -> Result<String, MediaError> {
        self.blobs
            .read()
            .await
            .get(path)
            .map(|(_, content_type)| content_type.clone())
            .ok_or_else(|| MediaError::NotFound(path.to_string()))
    }
}
