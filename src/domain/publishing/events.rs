//! Publishing events.
//!
//! Inbound:
//! - `PublishRequestEvent` - a scheduler (or retry re-submitter) asks for a publish
//!
//! Outbound, emitted in order `started → (succeeded | failed [→ retry_requested])`:
//! - `PublishStartedEvent`
//! - `PublishSucceededEvent`
//! - `PublishFailedEvent`
//! - `PublishRetryRequestedEvent`

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    domain_event, ConnectedAccountId, ContentItemId, EventId, PublishJobId, Timestamp, UserId,
};

use super::{FailureKind, PublishError, DEFAULT_POST_TYPE};

// ════════════════════════════════════════════════════════════════════════════
// PublishRequestEvent (inbound)
// ════════════════════════════════════════════════════════════════════════════

/// Request to push one content item to one connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequestEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub content_item_id: ContentItemId,
    pub connected_account_id: ConnectedAccountId,

    /// Platform key, resolved through the publisher registry.
    pub platform: String,

    pub scheduled_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,

    /// Retry attempt number; 0 for the first submission.
    #[serde(default)]
    pub attempt: u32,

    /// Overrides the configured retry budget for this job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl PublishRequestEvent {
    /// Creates a first-attempt request with no idempotency key.
    pub fn new(
        user_id: UserId,
        content_item_id: ContentItemId,
        connected_account_id: ConnectedAccountId,
        platform: impl Into<String>,
        scheduled_at: Timestamp,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            user_id,
            content_item_id,
            connected_account_id,
            platform: platform.into(),
            scheduled_at,
            post_type: None,
            idempotency_key: None,
            attempt: 0,
            max_retries: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn with_post_type(mut self, post_type: impl Into<String>) -> Self {
        self.post_type = Some(post_type.into());
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Post type with the default applied.
    pub fn effective_post_type(&self) -> &str {
        self.post_type.as_deref().unwrap_or(DEFAULT_POST_TYPE)
    }

    /// Rejects requests that cannot be turned into a job.
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.platform.trim().is_empty() {
            return Err(PublishError::invalid_request("platform", "must not be empty"));
        }
        if matches!(&self.idempotency_key, Some(key) if key.trim().is_empty()) {
            return Err(PublishError::invalid_request(
                "idempotency_key",
                "must not be blank when present",
            ));
        }
        if matches!(&self.post_type, Some(t) if t.trim().is_empty()) {
            return Err(PublishError::invalid_request(
                "post_type",
                "must not be blank when present",
            ));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PublishStartedEvent
// ════════════════════════════════════════════════════════════════════════════

/// Emitted before any external call is made for an execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishStartedEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub publish_job_id: PublishJobId,
    pub platform: String,
    pub started_at: Timestamp,
}

domain_event!(
    PublishStartedEvent,
    event_type = "publish.started.v1",
    aggregate_id = publish_job_id,
    aggregate_type = "PublishJob",
    occurred_at = started_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// PublishSucceededEvent
// ════════════════════════════════════════════════════════════════════════════

/// Emitted once the platform accepted the post and the success was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSucceededEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub publish_job_id: PublishJobId,
    pub platform: String,
    pub platform_post_id: String,
    pub permalink: String,
    pub published_at: Timestamp,
}

domain_event!(
    PublishSucceededEvent,
    event_type = "publish.succeeded.v1",
    aggregate_id = publish_job_id,
    aggregate_type = "PublishJob",
    occurred_at = published_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// PublishFailedEvent
// ════════════════════════════════════════════════════════════════════════════

/// Emitted when an execution ends in failure.
///
/// `error` carries the `[KIND]` prefix; `error_kind` and `retryable` repeat
/// the classification for consumers that do not parse messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishFailedEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub publish_job_id: PublishJobId,
    pub platform: String,
    pub error: String,
    pub error_kind: FailureKind,
    pub retryable: bool,
    pub failed_at: Timestamp,
}

domain_event!(
    PublishFailedEvent,
    event_type = "publish.failed.v1",
    aggregate_id = publish_job_id,
    aggregate_type = "PublishJob",
    occurred_at = failed_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// PublishRetryRequestedEvent
// ════════════════════════════════════════════════════════════════════════════

/// Emitted after a retryable failure while budget remains.
///
/// Carries everything an external re-submitter needs to publish the next
/// `PublishRequestEvent` (with `attempt = next_attempt`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRetryRequestedEvent {
    pub event_id: EventId,
    pub user_id: UserId,
    pub publish_job_id: PublishJobId,
    pub platform: String,
    pub reason: String,
    pub content_item_id: ContentItemId,
    pub connected_account_id: ConnectedAccountId,
    pub post_type: String,
    pub idempotency_key: Option<String>,
    pub next_attempt: u32,
    pub max_retries: u32,
    pub requested_at: Timestamp,
}

domain_event!(
    PublishRetryRequestedEvent,
    event_type = "publish.retry_requested.v1",
    aggregate_id = publish_job_id,
    aggregate_type = "PublishJob",
    occurred_at = requested_at,
    event_id = event_id
);

impl PublishRetryRequestedEvent {
    /// Builds the request for the next attempt.
    ///
    /// The idempotency key gets an `#attempt-N` suffix so the new attempt
    /// becomes its own job row instead of resolving to the failed one.
    pub fn next_request(&self, scheduled_at: Timestamp) -> PublishRequestEvent {
        let mut request = PublishRequestEvent::new(
            self.user_id.clone(),
            self.content_item_id,
            self.connected_account_id,
            self.platform.clone(),
            scheduled_at,
        )
        .with_post_type(self.post_type.clone())
        .with_attempt(self.next_attempt)
        .with_max_retries(self.max_retries);

        if let Some(key) = &self.idempotency_key {
            let base = key.split("#attempt-").next().unwrap_or(key);
            request =
                request.with_idempotency_key(format!("{}#attempt-{}", base, self.next_attempt));
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;

    fn request() -> PublishRequestEvent {
        PublishRequestEvent::new(
            UserId::new("user-1").unwrap(),
            ContentItemId::new(),
            ConnectedAccountId::new(),
            "YOUTUBE",
            Timestamp::now(),
        )
    }

    #[test]
    fn post_type_defaults_to_post() {
        assert_eq!(request().effective_post_type(), "POST");
        assert_eq!(request().with_post_type("SHORT").effective_post_type(), "SHORT");
    }

    #[test]
    fn validate_rejects_blank_platform() {
        let mut req = request();
        req.platform = "  ".to_string();
        assert!(matches!(req.validate(), Err(PublishError::InvalidRequest { .. })));
    }

    #[test]
    fn validate_rejects_blank_idempotency_key() {
        let req = request().with_idempotency_key("");
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_deserializes_without_optional_fields() {
        let json = serde_json::json!({
            "event_id": "evt-1",
            "user_id": "user-1",
            "content_item_id": ContentItemId::new(),
            "connected_account_id": ConnectedAccountId::new(),
            "platform": "LINKEDIN",
            "scheduled_at": "2024-05-01T10:00:00Z"
        });

        let req: PublishRequestEvent = serde_json::from_value(json).unwrap();

        assert_eq!(req.attempt, 0);
        assert_eq!(req.idempotency_key, None);
        assert_eq!(req.max_retries, None);
    }

    #[test]
    fn failed_event_envelope_has_versioned_type() {
        let event = PublishFailedEvent {
            event_id: EventId::new(),
            user_id: UserId::new("user-1").unwrap(),
            publish_job_id: PublishJobId::new(),
            platform: "FACEBOOK".to_string(),
            error: "[AUTH] revoked".to_string(),
            error_kind: FailureKind::Auth,
            retryable: false,
            failed_at: Timestamp::now(),
        };

        let envelope = event.to_envelope().unwrap();

        assert_eq!(envelope.event_type, "publish.failed.v1");
        assert_eq!(envelope.aggregate_type, "PublishJob");
        assert_eq!(envelope.payload["error_kind"], "AUTH");
    }

    #[test]
    fn next_request_bumps_attempt_and_key() {
        let retry = PublishRetryRequestedEvent {
            event_id: EventId::new(),
            user_id: UserId::new("user-1").unwrap(),
            publish_job_id: PublishJobId::new(),
            platform: "YOUTUBE".to_string(),
            reason: "[RATE_LIMITED] slow down".to_string(),
            content_item_id: ContentItemId::new(),
            connected_account_id: ConnectedAccountId::new(),
            post_type: "POST".to_string(),
            idempotency_key: Some("sched-42#attempt-1".to_string()),
            next_attempt: 2,
            max_retries: 3,
            requested_at: Timestamp::now(),
        };

        let next = retry.next_request(Timestamp::now());

        assert_eq!(next.attempt, 2);
        assert_eq!(next.max_retries, Some(3));
        assert_eq!(next.idempotency_key.as_deref(), Some("sched-42#attempt-2"));
        assert_eq!(next.content_item_id, retry.content_item_id);
    }
}
