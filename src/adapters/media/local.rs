//! Local filesystem media storage.
//!
//! Media paths are relative to a root directory:
//!
//! ```text
//! {root}/{media_path}
//! ```
//!
//! Absolute paths and `..` components are rejected so a content item cannot
//! point outside the root.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::ports::{MediaError, MediaStorage};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, media_path: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(media_path);
        let safe = !media_path.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(MediaError::InvalidPath(media_path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn content_type_for(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("mp4") | Some("m4v") => "video/mp4",
            Some("mov") => "video/quicktime",
            Some("webm") => "video/webm",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            _ => DEFAULT_CONTENT_TYPE,
        }
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn download(&self, media_path: &str) -> Result<Vec<u8>, MediaError> {
        let path = self.resolve(media_path)?;
        fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => MediaError::NotFound(media_path.to_string()),
            _ => MediaError::Io(e.to_string()),
        })
    }

    async fn content_type(&self, media_path: &str) -> Result<String, MediaError> {
        let path = self.resolve(media_path)?;
        match fs::try_exists(&path).await {
            Ok(true) => Ok(Self::content_type_for(&path).to_string()),
            Ok(false) => Err(MediaError::NotFound(media_path.to_string())),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::publishing::FailureKind;
    use tempfile::TempDir;

    async fn storage_with(file: &str, bytes: &[u8]) -> (TempDir, LocalMediaStorage) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, bytes).await.unwrap();
        let storage = LocalMediaStorage::new(dir.path());
        (dir, storage)
    }

    #[tokio::test]
    async fn downloads_file_under_root() {
        let (_dir, storage) = storage_with("user-1/clip.mp4", b"abc").await;

        assert_eq!(storage.download("user-1/clip.mp4").await.unwrap(), b"abc".to_vec());
        assert_eq!(storage.content_type("user-1/clip.mp4").await.unwrap(), "video/mp4");
    }

    #[tokio::test]
    async fn unknown_extension_is_octet_stream() {
        let (_dir, storage) = storage_with("blob.bin", b"x").await;
        assert_eq!(storage.content_type("blob.bin").await.unwrap(), DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_dir, storage) = storage_with("a.png", b"x").await;

        let err = storage.download("b.png").await.unwrap_err();

        assert!(matches!(err, MediaError::NotFound(_)));
        assert_eq!(err.kind(), FailureKind::Configuration);
        assert!(storage.content_type("b.png").await.is_err());
    }

    #[tokio::test]
    async fn escaping_paths_are_rejected() {
        let (_dir, storage) = storage_with("a.png", b"x").await;

        for path in ["../etc/passwd", "/etc/passwd", "a/../../b", ""] {
            assert!(matches!(
                storage.download(path).await,
                Err(MediaError::InvalidPath(_))
            ));
        }
    }
}
