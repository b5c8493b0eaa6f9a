//! Outcome of a single platform publish call.

use serde::{Deserialize, Serialize};

use super::FailureKind;

/// Value returned by every publisher strategy.
///
/// Never partially filled: a success carries the platform post id and
/// permalink, a failure carries an error message and its classification.
/// The fields are private so the two constructors are the only way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    success: bool,
    platform_post_id: Option<String>,
    permalink: Option<String>,
    error_message: Option<String>,
    failure_kind: Option<FailureKind>,
}

impl PublishResult {
    /// The platform accepted the post.
    pub fn published(platform_post_id: impl Into<String>, permalink: impl Into<String>) -> Self {
        Self {
            success: true,
            platform_post_id: Some(platform_post_id.into()),
            permalink: Some(permalink.into()),
            error_message: None,
            failure_kind: None,
        }
    }

    /// The platform (or the strategy's own checks) rejected the post.
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            platform_post_id: None,
            permalink: None,
            error_message: Some(message.into()),
            failure_kind: Some(kind),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::failed(FailureKind::RateLimited, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::failed(FailureKind::PermanentPlatform, message)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn platform_post_id(&self) -> Option<&str> {
        self.platform_post_id.as_deref()
    }

    pub fn permalink(&self) -> Option<&str> {
        self.permalink.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure_kind
    }
}
