//! HTTP plumbing shared by the platform strategies.
//!
//! Status classification:
//!
//! | Response                         | Kind               |
//! |----------------------------------|--------------------|
//! | 429, or a quota/rate marker      | RateLimited        |
//! | 401, or Graph error code 190     | Auth               |
//! | 5xx                              | TransientNetwork   |
//! | other 4xx                        | PermanentPlatform  |

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::domain::content::ContentItem;
use crate::domain::foundation::ContentItemId;
use crate::domain::publishing::{FailureKind, Platform, PublishResult};
use crate::ports::{ContentItemReader, MediaError, PlatformError};

/// Longest slice of a response body copied into error messages.
const MAX_BODY_IN_MESSAGE: usize = 500;

/// Google API error reasons that mean "try again later".
const QUOTA_REASONS: [&str; 4] = [
    "quotaExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
];

/// Graph API error codes for application, user and page throttling.
const GRAPH_THROTTLE_CODES: [i64; 5] = [4, 17, 32, 613, 80001];

/// Graph API code for an invalid or expired access token.
const GRAPH_INVALID_TOKEN: i64 = 190;

/// Sends a request, mapping transport failures to `PlatformError`.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response, PlatformError> {
    request.send().await.map_err(transport_error)
}

pub(crate) fn transport_error(err: reqwest::Error) -> PlatformError {
    if err.is_timeout() {
        PlatformError::Timeout(err.to_string())
    } else {
        PlatformError::Network(err.to_string())
    }
}

/// Classifies a non-success status. `None` for statuses that are neither
/// client nor server errors.
pub(crate) fn classify_status(status: u16, body: &str) -> Option<FailureKind> {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let graph_code = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/code"))
        .and_then(|c| c.as_i64());

    if status == 429 || is_quota_error(parsed.as_ref(), graph_code) {
        return Some(FailureKind::RateLimited);
    }
    if status == 401 || graph_code == Some(GRAPH_INVALID_TOKEN) {
        return Some(FailureKind::Auth);
    }
    match status {
        500..=599 => Some(FailureKind::TransientNetwork),
        400..=499 => Some(FailureKind::PermanentPlatform),
        _ => None,
    }
}

fn is_quota_error(body: Option<&serde_json::Value>, graph_code: Option<i64>) -> bool {
    if graph_code.is_some_and(|c| GRAPH_THROTTLE_CODES.contains(&c)) {
        return true;
    }
    body.and_then(|v| v.pointer("/error/errors"))
        .and_then(|e| e.as_array())
        .map(|errors| {
            errors.iter().any(|e| {
                e.get("reason")
                    .and_then(|r| r.as_str())
                    .is_some_and(|r| QUOTA_REASONS.contains(&r))
            })
        })
        .unwrap_or(false)
}

/// Turns an error response into a failed `PublishResult`.
pub(crate) async fn failure_from_response(
    platform: Platform,
    step: &str,
    response: Response,
) -> Result<PublishResult, PlatformError> {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.chars().take(MAX_BODY_IN_MESSAGE).collect();

    match classify_status(status, &body) {
        Some(kind) => {
            tracing::warn!(
                platform = %platform,
                step,
                status,
                kind = %kind,
                "Platform rejected request"
            );
            Ok(PublishResult::failed(
                kind,
                format!("{} {} failed with status {}: {}", platform, step, status, excerpt),
            ))
        }
        None => Err(PlatformError::UnexpectedResponse {
            status,
            message: format!("{} {}: {}", platform, step, excerpt),
        }),
    }
}

/// Parses a success body, treating malformed JSON as unexpected.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, PlatformError> {
    let status = response.status().as_u16();
    response
        .json::<T>()
        .await
        .map_err(|e| PlatformError::UnexpectedResponse {
            status,
            message: format!("malformed response body: {}", e),
        })
}

/// Loads the content item for a request.
pub(crate) async fn load_content(
    reader: &dyn ContentItemReader,
    id: &ContentItemId,
) -> Result<Option<ContentItem>, PlatformError> {
    reader
        .get(id)
        .await
        .map_err(|e| PlatformError::Dependency(format!("content lookup failed: {}", e)))
}

pub(crate) fn missing_content(id: &ContentItemId) -> PublishResult {
    PublishResult::failed(FailureKind::Configuration, format!("content item {} not found", id))
}

pub(crate) fn media_failure(err: MediaError) -> PublishResult {
    PublishResult::failed(err.kind(), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_many_requests_is_rate_limited() {
        assert_eq!(classify_status(429, ""), Some(FailureKind::RateLimited));
    }

    #[test]
    fn youtube_quota_403_is_rate_limited() {
        let body = r#"{"error":{"code":403,"errors":[{"reason":"quotaExceeded"}]}}"#;
        assert_eq!(classify_status(403, body), Some(FailureKind::RateLimited));
    }

    #[test]
    fn graph_throttle_code_is_rate_limited() {
        let body = r#"{"error":{"message":"(#4) Application request limit reached","code":4}}"#;
        assert_eq!(classify_status(400, body), Some(FailureKind::RateLimited));
    }

    #[test]
    fn unauthorized_is_auth() {
        assert_eq!(classify_status(401, "nope"), Some(FailureKind::Auth));
        let body = r#"{"error":{"type":"OAuthException","code":190}}"#;
        assert_eq!(classify_status(400, body), Some(FailureKind::Auth));
    }

    #[test]
    fn server_errors_are_transient() {
        for status in [500, 502, 503, 504] {
            assert_eq!(classify_status(status, "<html>"), Some(FailureKind::TransientNetwork));
        }
    }

    #[test]
    fn other_client_errors_are_permanent() {
        for status in [400, 403, 404, 422] {
            assert_eq!(classify_status(status, "{}"), Some(FailureKind::PermanentPlatform));
        }
    }

    #[test]
    fn redirects_are_unclassified() {
        assert_eq!(classify_status(302, ""), None);
    }
}
