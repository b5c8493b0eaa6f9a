//! PublishJob aggregate.
//!
//! The durable record of one publish attempt series. Identity fields are
//! fixed at creation; the only mutations are the start stamp and the two
//! terminal transitions, each of which is a no-op once the job is terminal
//! so redelivered events cannot corrupt a finished row.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ConnectedAccountId, ContentItemId, PublishJobId, StateMachine, Timestamp, UserId,
};

use super::{PublishJobStatus, PublishRequestEvent};

/// Post type used when the request does not name one.
pub const DEFAULT_POST_TYPE: &str = "POST";

/// Retry budget used when neither the request nor configuration sets one.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Publish job aggregate.
///
/// # Invariants
///
/// - `user_id`, `connected_account_id`, `content_item_id`, `platform` never change
/// - `status` only moves `Pending → Success | Failed`
/// - `finished_at` is set exactly when `status` is terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishJob {
    pub id: PublishJobId,
    pub user_id: UserId,
    pub connected_account_id: ConnectedAccountId,
    pub content_item_id: ContentItemId,
    pub platform: String,
    pub post_type: String,
    pub status: PublishJobStatus,
    pub max_retries: u32,
    pub current_retry_count: u32,
    pub idempotency_key: Option<String>,
    pub scheduled_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub last_error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PublishJob {
    /// Creates a new Pending job for a request.
    ///
    /// `default_max_retries` applies unless the request overrides it.
    pub fn from_request(request: &PublishRequestEvent, default_max_retries: u32) -> Self {
        let now = Timestamp::now();
        Self {
            id: PublishJobId::new(),
            user_id: request.user_id.clone(),
            connected_account_id: request.connected_account_id,
            content_item_id: request.content_item_id,
            platform: request.platform.trim().to_string(),
            post_type: request.effective_post_type().to_string(),
            status: PublishJobStatus::Pending,
            max_retries: request.max_retries.unwrap_or(default_max_retries),
            current_retry_count: request.attempt,
            idempotency_key: request.idempotency_key.clone(),
            scheduled_at: request.scheduled_at,
            started_at: None,
            finished_at: None,
            last_error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True if this job was created for the same logical request.
    ///
    /// Used to detect idempotency keys reused for different content.
    pub fn matches_request(&self, request: &PublishRequestEvent) -> bool {
        self.user_id == request.user_id
            && self.connected_account_id == request.connected_account_id
            && self.content_item_id == request.content_item_id
            && self.platform.eq_ignore_ascii_case(request.platform.trim())
            && self.post_type == request.effective_post_type()
    }

    /// Remaining attempts after this one.
    pub fn retry_budget(&self) -> u32 {
        self.max_retries.saturating_sub(self.current_retry_count)
    }

    pub fn has_retry_budget(&self) -> bool {
        self.current_retry_count < self.max_retries
    }

    /// Stamps `started_at` for the current execution.
    ///
    /// Keeps an existing stamp (redelivery of a Pending job) and ignores
    /// terminal jobs.
    pub fn mark_started(&mut self, now: Timestamp) -> bool {
        if self.is_terminal() || self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        self.updated_at = now;
        true
    }

    /// Records success. Returns `false` without touching the job if it is
    /// already terminal.
    pub fn mark_success(&mut self, now: Timestamp) -> bool {
        let Ok(next) = self.status.transition_to(PublishJobStatus::Success) else {
            return false;
        };
        self.status = next;
        self.started_at = Some(self.started_at.unwrap_or(now));
        self.finished_at = Some(now);
        self.last_error_message = None;
        self.updated_at = now;
        true
    }

    /// Records failure. Returns `false` without touching the job if it is
    /// already terminal.
    pub fn mark_failure(&mut self, error_message: impl Into<String>, now: Timestamp) -> bool {
        let Ok(next) = self.status.transition_to(PublishJobStatus::Failed) else {
            return false;
        };
        self.status = next;
        self.finished_at = Some(now);
        self.last_error_message = Some(error_message.into());
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

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
    fn new_job_starts_pending_with_defaults() {
        let job = PublishJob::from_request(&request(), DEFAULT_MAX_RETRIES);

        assert_eq!(job.status, PublishJobStatus::Pending);
        assert_eq!(job.post_type, "POST");
        assert_eq!(job.max_retries, 3);
        assert_eq!(job.current_retry_count, 0);
        assert!(job.started_at.is_none());
        assert!(job.finished_at.is_none());
    }

    #[test]
    fn request_overrides_budget_and_attempt() {
        let job = PublishJob::from_request(&request().with_attempt(2).with_max_retries(5), 3);
        assert_eq!(job.current_retry_count, 2);
        assert_eq!(job.max_retries, 5);
        assert_eq!(job.retry_budget(), 3);
    }

    #[test]
    fn mark_success_sets_terminal_fields() {
        let mut job = PublishJob::from_request(&request(), 3);
        job.last_error_message = Some("stale".to_string());
        let now = Timestamp::now();

        assert!(job.mark_success(now));

        assert_eq!(job.status, PublishJobStatus::Success);
        assert_eq!(job.finished_at, Some(now));
        assert_eq!(job.started_at, Some(now));
        assert_eq!(job.last_error_message, None);
    }

    #[test]
    fn mark_success_keeps_existing_start() {
        let mut job = PublishJob::from_request(&request(), 3);
        let started = Timestamp::now().plus_secs(-30);
        job.mark_started(started);

        job.mark_success(Timestamp::now());

        assert_eq!(job.started_at, Some(started));
    }

    #[test]
    fn mark_failure_records_message() {
        let mut job = PublishJob::from_request(&request(), 3);

        assert!(job.mark_failure("[AUTH] revoked", Timestamp::now()));

        assert_eq!(job.status, PublishJobStatus::Failed);
        assert_eq!(job.last_error_message.as_deref(), Some("[AUTH] revoked"));
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn success_then_failure_keeps_success() {
        let mut job = PublishJob::from_request(&request(), 3);
        let first = Timestamp::now();
        job.mark_success(first);

        assert!(!job.mark_failure("late", first.plus_secs(10)));

        assert_eq!(job.status, PublishJobStatus::Success);
        assert_eq!(job.finished_at, Some(first));
        assert_eq!(job.last_error_message, None);
    }

    #[test]
    fn failure_then_success_keeps_failure() {
        let mut job = PublishJob::from_request(&request(), 3);
        let first = Timestamp::now();
        job.mark_failure("boom", first);

        assert!(!job.mark_success(first.plus_secs(10)));

        assert_eq!(job.status, PublishJobStatus::Failed);
        assert_eq!(job.finished_at, Some(first));
        assert_eq!(job.last_error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn matches_request_detects_different_content() {
        let req = request();
        let job = PublishJob::from_request(&req, 3);
        assert!(job.matches_request(&req));

        let mut other = req.clone();
        other.content_item_id = ContentItemId::new();
        assert!(!job.matches_request(&other));
    }

    #[test]
    fn matches_request_detects_different_post_type() {
        let req = request();
        let job = PublishJob::from_request(&req, 3);

        assert!(job.matches_request(&req.clone().with_post_type("POST")));
        assert!(!job.matches_request(&req.with_post_type("SHORT")));
    }

    #[test]
    fn budget_is_exhausted_at_max() {
        let job = PublishJob::from_request(&request().with_attempt(3).with_max_retries(3), 3);
        assert!(!job.has_retry_budget());
        assert_eq!(job.retry_budget(), 0);
    }

    proptest! {
        #[test]
        fn first_terminal_transition_wins(ops in proptest::collection::vec(any::<bool>(), 1..8)) {
            let mut job = PublishJob::from_request(&request(), 3);
            let base = Timestamp::now();

            for (i, succeed) in ops.iter().enumerate() {
                let at = base.plus_secs(i as i64);
                if *succeed {
                    job.mark_success(at);
                } else {
                    job.mark_failure(format!("failure {}", i), at);
                }
            }

            let expected = if ops[0] {
                PublishJobStatus::Success
            } else {
                PublishJobStatus::Failed
            };
            prop_assert_eq!(job.status, expected);
            prop_assert_eq!(job.finished_at, Some(base));
        }
    }
}
