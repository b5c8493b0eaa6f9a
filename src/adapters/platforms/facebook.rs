//! Facebook Page publisher.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::domain::publishing::{Platform, PublishResult};
use crate::ports::{ContentItemReader, PlatformError, PublishContext, PublisherStrategy};

use super::http::{failure_from_response, load_content, missing_content, read_json, send};
use super::instagram::DEFAULT_GRAPH_API_BASE;

#[derive(Debug, Deserialize)]
struct FeedPost {
    id: String,
}

/// Posts to a Page feed. The connected account's external id is the Page id
/// and its access token a Page token.
pub struct FacebookPublisher {
    client: Client,
    graph_base: String,
    content: Arc<dyn ContentItemReader>,
}

impl FacebookPublisher {
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
}

#[async_trait]
impl PublisherStrategy for FacebookPublisher {
    fn platform(&self) -> Platform {
        Platform::Facebook
    }

    async fn publish(&self, context: &PublishContext) -> Result<PublishResult, PlatformError> {
        let request = &context.request;
        let Some(item) = load_content(self.content.as_ref(), &request.content_item_id).await? else {
            return Ok(missing_content(&request.content_item_id));
        };

        let message = item.caption();
        let mut form = vec![("message", message.as_str())];
        if let Some(link) = item.media_url.as_deref() {
            form.push(("link", link));
        }

        let page_id = context.account.external_account_id.trim();
        let response = send(
            self.client
                .post(format!("{}/{}/feed", self.graph_base, page_id))
                .bearer_auth(context.access_token.expose_secret())
                .form(&form),
        )
        .await?;
        if !response.status().is_success() {
            return failure_from_response(Platform::Facebook, "page feed", response).await;
        }

        let post: FeedPost = read_json(response).await?;
        let permalink = format!("https://www.facebook.com/{}", post.id);
        Ok(PublishResult::published(post.id, permalink))
    }
}
