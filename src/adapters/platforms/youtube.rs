//! YouTube publisher.
//!
//! Uses the resumable upload protocol: a metadata POST opens an upload
//! session whose URL comes back in `Location`, then the media bytes are
//! PUT to that URL in a single request.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::domain::content::ContentItem;
use crate::domain::publishing::{FailureKind, Platform, PublishResult};
use crate::ports::{
    ContentItemReader, MediaStorage, PlatformError, PublishContext, PublisherStrategy,
};

use super::http::{
    failure_from_response, load_content, media_failure, missing_content, read_json, send,
};

pub const DEFAULT_YOUTUBE_API_BASE: &str = "https://www.googleapis.com";

const SHORT_POST_TYPE: &str = "SHORT";

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
}

pub struct YouTubePublisher {
    client: Client,
    api_base: String,
    content: Arc<dyn ContentItemReader>,
    media: Arc<dyn MediaStorage>,
}

impl YouTubePublisher {
    pub fn new(
        client: Client,
        content: Arc<dyn ContentItemReader>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            client,
            api_base: DEFAULT_YOUTUBE_API_BASE.to_string(),
            content,
            media,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status",
            self.api_base
        )
    }

    fn metadata(item: &ContentItem, post_type: &str) -> serde_json::Value {
        let mut title = item.title.trim().to_string();
        if post_type.eq_ignore_ascii_case(SHORT_POST_TYPE) && !title.contains("#Shorts") {
            title.push_str(" #Shorts");
        }
        json!({
            "snippet": {
                "title": title,
                "description": item.body,
                "tags": item.tags,
            },
            "status": {
                "privacyStatus": "public",
            },
        })
    }

    fn permalink(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }
}

#[async_trait]
impl PublisherStrategy for YouTubePublisher {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn publish(&self, context: &PublishContext) -> Result<PublishResult, PlatformError> {
        let request = &context.request;
        let Some(item) = load_content(self.content.as_ref(), &request.content_item_id).await? else {
            return Ok(missing_content(&request.content_item_id));
        };
        let Some(media_path) = item.media_path.as_deref() else {
            return Ok(PublishResult::failed(
                FailureKind::Configuration,
                format!("content item {} has no video to upload", item.id),
            ));
        };

        let content_type = match self.media.content_type(media_path).await {
            Ok(content_type) => content_type,
            Err(err) => return Ok(media_failure(err)),
        };
        let bytes = match self.media.download(media_path).await {
            Ok(bytes) => bytes,
            Err(err) => return Ok(media_failure(err)),
        };

        let token = context.access_token.expose_secret();
        let session = send(
            self.client
                .post(self.upload_url())
                .bearer_auth(token)
                .header("X-Upload-Content-Type", content_type.as_str())
                .header("X-Upload-Content-Length", bytes.len().to_string())
                .json(&Self::metadata(&item, context.post_type())),
        )
        .await?;
        if !session.status().is_success() {
            return failure_from_response(Platform::Youtube, "upload session", session).await;
        }

        let upload_url = session
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| PlatformError::UnexpectedResponse {
                status: session.status().as_u16(),
                message: "upload session response has no Location header".to_string(),
            })?;

        tracing::debug!(
            content_item_id = %item.id,
            bytes = bytes.len(),
            "Uploading video to resumable session"
        );
        let upload = send(
            self.client
                .put(&upload_url)
                .bearer_auth(token)
                .header(CONTENT_TYPE, content_type)
                .body(bytes),
        )
        .await?;
        if !upload.status().is_success() {
            return failure_from_response(Platform::Youtube, "video upload", upload).await;
        }

        let video: VideoResource = read_json(upload).await?;
        Ok(PublishResult::published(&video.id, Self::permalink(&video.id)))
    }
}
