//! LinkedIn publisher.
//!
//! Creates a UGC post authored by the account's member or organization
//! URN. LinkedIn returns the new post URN in the `x-restli-id` header.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::domain::account::ConnectedAccount;
use crate::domain::content::ContentItem;
use crate::domain::publishing::{Platform, PublishResult};
use crate::ports::{ContentItemReader, PlatformError, PublishContext, PublisherStrategy};

use super::http::{failure_from_response, load_content, missing_content, read_json, send};

pub const DEFAULT_LINKEDIN_API_BASE: &str = "https://api.linkedin.com";

const RESTLI_ID_HEADER: &str = "x-restli-id";

#[derive(Debug, Deserialize)]
struct CreatedPost {
    #[serde(default)]
    id: Option<String>,
}

pub struct LinkedInPublisher {
    client: Client,
    api_base: String,
    content: Arc<dyn ContentItemReader>,
}

impl LinkedInPublisher {
    pub fn new(client: Client, content: Arc<dyn ContentItemReader>) -> Self {
        Self {
            client,
            api_base: DEFAULT_LINKEDIN_API_BASE.to_string(),
            content,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Author URN; bare member ids are expanded to person URNs.
    fn author_urn(account: &ConnectedAccount) -> String {
        let id = account.external_account_id.trim();
        if id.starts_with("urn:li:") {
            id.to_string()
        } else {
            format!("urn:li:person:{}", id)
        }
    }

    fn ugc_post(author: &str, item: &ContentItem) -> serde_json::Value {
        let mut share = json!({
            "shareCommentary": { "text": item.caption() },
            "shareMediaCategory": "NONE",
        });
        if let Some(url) = &item.media_url {
            share["shareMediaCategory"] = json!("ARTICLE");
            share["media"] = json!([{ "status": "READY", "originalUrl": url }]);
        }
        json!({
            "author": author,
            "lifecycleState": "PUBLISHED",
            "specificContent": { "com.linkedin.ugc.ShareContent": share },
            "visibility": { "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC" },
        })
    }

    fn permalink(post_urn: &str) -> String {
        format!("https://www.linkedin.com/feed/update/{}", post_urn)
    }
}

#[async_trait]
impl PublisherStrategy for LinkedInPublisher {
    fn platform(&self) -> Platform {
        Platform::Linkedin
    }

    async fn publish(&self, context: &PublishContext) -> Result<PublishResult, PlatformError> {
        let request = &context.request;
        let Some(item) = load_content(self.content.as_ref(), &request.content_item_id).await? else {
            return Ok(missing_content(&request.content_item_id));
        };

        let body = Self::ugc_post(&Self::author_urn(&context.account), &item);
        let response = send(
            self.client
                .post(format!("{}/v2/ugcPosts", self.api_base))
                .bearer_auth(context.access_token.expose_secret())
                .header("X-Restli-Protocol-Version", "2.0.0")
                .json(&body),
        )
        .await?;
        if !response.status().is_success() {
            return failure_from_response(Platform::Linkedin, "ugcPosts", response).await;
        }

        let status = response.status().as_u16();
        let header_id = response
            .headers()
            .get(RESTLI_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let post_id = match header_id {
            Some(id) => id,
            None => read_json::<CreatedPost>(response)
                .await?
                .id
                .ok_or_else(|| PlatformError::UnexpectedResponse {
                    status,
                    message: "ugcPosts response carried no post id".to_string(),
                })?,
        };

        Ok(PublishResult::published(&post_id, Self::permalink(&post_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryContentItemReader;
    use crate::domain::account::fixtures::account_expiring_in;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::publishing::{FailureKind, PublishRequestEvent};
    use secrecy::SecretString;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup(server: &MockServer) -> (LinkedInPublisher, PublishContext) {
        let content = InMemoryContentItemReader::new();
        let item = ContentItem::new(UserId::new("user-1").unwrap(), "Hiring", "Join us");
        content.insert(item.clone()).await;

        let mut account = account_expiring_in(Platform::Linkedin, 60);
        account.external_account_id = "abc123".to_string();
        let request = PublishRequestEvent::new(
            account.user_id.clone(),
            item.id,
            account.id,
            "LINKEDIN",
            Timestamp::now(),
        );
        let token = SecretString::new("li-token".to_string());
        let context = PublishContext::new(request, account, token);

        let publisher =
            LinkedInPublisher::new(Client::new(), Arc::new(content)).with_base_url(server.uri());
        (publisher, context)
    }

    #[tokio::test]
    async fn post_id_comes_from_restli_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .and(header("authorization", "Bearer li-token"))
            .and(header("x-restli-protocol-version", "2.0.0"))
            .and(body_partial_json(json!({
                "author": "urn:li:person:abc123",
                "lifecycleState": "PUBLISHED"
            })))
            .respond_with(
                ResponseTemplate::new(201).insert_header("x-restli-id", "urn:li:share:42"),
            )
            .expect(1)
            .mount(&server)
            .await;
        let (publisher, context) = setup(&server).await;

        let result = publisher.publish(&context).await.unwrap();

        assert_eq!(result.platform_post_id(), Some("urn:li:share:42"));
        assert_eq!(
            result.permalink(),
            Some("https://www.linkedin.com/feed/update/urn:li:share:42")
        );
    }

    #[tokio::test]
    async fn post_id_falls_back_to_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"id": "urn:li:ugcPost:7"})),
            )
            .mount(&server)
            .await;
        let (publisher, context) = setup(&server).await;

        let result = publisher.publish(&context).await.unwrap();

        assert_eq!(result.platform_post_id(), Some("urn:li:ugcPost:7"));
    }

    #[tokio::test]
    async fn expired_token_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("{\"serviceErrorCode\":65600}"),
            )
            .mount(&server)
            .await;
        let (publisher, context) = setup(&server).await;

        let result = publisher.publish(&context).await.unwrap();

        assert_eq!(result.failure_kind(), Some(FailureKind::Auth));
    }

    #[test]
    fn organization_urn_is_kept() {
        let mut account = account_expiring_in(Platform::Linkedin, 60);
        account.external_account_id = "urn:li:organization:9".to_string();
        assert_eq!(LinkedInPublisher::author_urn(&account), "urn:li:organization:9");
    }

    #[test]
    fn media_url_becomes_article_share() {
        let item = ContentItem::new(UserId::new("u").unwrap(), "T", "B")
            .with_media_url("https://x.test/a");
        let body = LinkedInPublisher::ugc_post("urn:li:person:1", &item);
        let share = &body["specificContent"]["com.linkedin.ugc.ShareContent"];
        assert_eq!(share["shareMediaCategory"], "ARTICLE");
        assert_eq!(share["media"][0]["originalUrl"], "https://x.test/a");
    }
}
