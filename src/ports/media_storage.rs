//! MediaStorage port - read access to uploaded media blobs.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::publishing::FailureKind;

#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error("Media not found: {0}")]
    NotFound(String),

    #[error("Invalid media path: {0}")]
    InvalidPath(String),

    #[error("Media read failed: {0}")]
    Io(String),
}

impl MediaError {
    /// Missing or malformed paths will never succeed; IO errors might.
    pub fn kind(&self) -> FailureKind {
        match self {
            MediaError::NotFound(_) | MediaError::InvalidPath(_) => FailureKind::Configuration,
            MediaError::Io(_) => FailureKind::TransientNetwork,
        }
    }
}

/// Port for reading media referenced by content items.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Load the full media body.
    async fn download(&self, path: &str) -> Result<Vec<u8>, MediaError>;

    /// MIME type of the media at `path`.
    async fn content_type(&self, path: &str) -> Result<String, MediaError>;
}
