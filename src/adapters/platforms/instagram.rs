//! Instagram publisher (Graph API, business accounts).
//!
//! Two-step publish: create a media container from a public media URL,
//! then publish the container. The permalink needs a third lookup; the
//! post is already live at that point, so a failed lookup falls back to
//! the profile URL instead of failing the job.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::domain::publishing::{FailureKind, Platform, PublishResult};
use crate::ports::{ContentItemReader, PlatformError, PublishContext, PublisherStrategy};

use super::http::{failure_from_response, load_content, missing_content, read_json, send};

pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

const REEL_POST_TYPE: &str = "REEL";

#[derive(Debug, Deserialize)]
struct GraphId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Permalink {
    permalink: String,
}

pub struct InstagramPublisher {
    client: Client,
    graph_base: String,
    content: Arc<dyn ContentItemReader>,
}

impl InstagramPublisher {
    pub fn new(client: Client, content: Arc<dyn ContentItemReader>) -> Self {
        Self {
            client,
            graph_base: DEFAULT_GRAPH_API_BASE.to_string(),
            content,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.graph_base = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn lookup_permalink(&self, media_id: &str, token: &str) -> Option<String> {
        let response = self
            .client
            .get(format!("{}/{}", self.graph_base, media_id))
            .query(&[("fields", "permalink")])
            .bearer_auth(token)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<Permalink>().await.ok().map(|p| p.permalink)
    }
}

#[async_trait]
impl PublisherStrategy for InstagramPublisher {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn publish(&self, context: &PublishContext) -> Result<PublishResult, PlatformError> {
        let request = &context.request;
        let Some(item) = load_content(self.content.as_ref(), &request.content_item_id).await? else {
            return Ok(missing_content(&request.content_item_id));
        };
        let Some(media_url) = item.media_url.as_deref() else {
            return Ok(PublishResult::failed(
                FailureKind::Configuration,
                format!("content item {} has no public media URL; Instagram requires one", item.id),
            ));
        };

        let ig_user = context.account.external_account_id.trim();
        let token = context.access_token.expose_secret();
        let caption = item.caption();

        let mut container_params = vec![("caption", caption.as_str())];
        if context.post_type().eq_ignore_ascii_case(REEL_POST_TYPE) {
            container_params.push(("media_type", "REELS"));
            container_params.push(("video_url", media_url));
        } else {
            container_params.push(("image_url", media_url));
        }

        let container = send(
            self.client
                .post(format!("{}/{}/media", self.graph_base, ig_user))
                .bearer_auth(token)
                .form(&container_params),
        )
        .await?;
        if !container.status().is_success() {
            return failure_from_response(Platform::Instagram, "media container", container).await;
        }
        let container: GraphId = read_json(container).await?;

        let published = send(
            self.client
                .post(format!("{}/{}/media_publish", self.graph_base, ig_user))
                .bearer_auth(token)
                .form(&[("creation_id", container.id.as_str())]),
        )
        .await?;
        if !published.status().is_success() {
            return failure_from_response(Platform::Instagram, "media_publish", published).await;
        }
        let media: GraphId = read_json(published).await?;

        let permalink = match self.lookup_permalink(&media.id, token).await {
            Some(link) => link,
            None => {
                tracing::warn!(media_id = %media.id, "Permalink lookup failed, using profile URL");
                format!("https://www.instagram.com/{}", ig_user)
            }
        };
        Ok(PublishResult::published(media.id, permalink))
    }
}
