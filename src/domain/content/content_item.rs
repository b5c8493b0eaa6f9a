//! ContentItem - the material a publish job pushes to a platform.
//!
//! Owned by the content service. Strategies only read it.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContentItemId, Timestamp, UserId};

/// Text and media for one post.
///
/// `media_path` points into media storage (video uploads); `media_url` is a
/// publicly reachable URL, which Instagram requires for image containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentItemId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    pub media_path: Option<String>,
    pub media_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: Timestamp,
}

impl ContentItem {
    pub fn new(user_id: UserId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: ContentItemId::new(),
            user_id,
            title: title.into(),
            body: body.into(),
            media_path: None,
            media_url: None,
            tags: Vec::new(),
            created_at: Timestamp::now(),
        }
    }

    pub fn with_media_path(mut self, path: impl Into<String>) -> Self {
        self.media_path = Some(path.into());
        self
    }

    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Title followed by body, for platforms with a single text field.
    ///
    /// Blank parts are skipped.
    pub fn caption(&self) -> String {
        [self.title.trim(), self.body.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
