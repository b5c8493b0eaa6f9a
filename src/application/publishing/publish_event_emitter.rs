//! PublishEventEmitter - builds and publishes the job lifecycle events.

use std::sync::Arc;

use crate::domain::foundation::{EventId, SerializableDomainEvent, Timestamp};
use crate::domain::publishing::{
    FailureKind, PublishError, PublishFailedEvent, PublishJob, PublishRetryRequestedEvent,
    PublishStartedEvent, PublishSucceededEvent, PublishedPost,
};
use crate::ports::EventPublisher;

/// Wraps the `EventPublisher` port with one method per lifecycle event.
///
/// Envelopes carry the job id as correlation id and the job's user id.
#[derive(Clone)]
pub struct PublishEventEmitter {
    publisher: Arc<dyn EventPublisher>,
}

impl PublishEventEmitter {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    pub async fn started(&self, job: &PublishJob) -> Result<PublishStartedEvent, PublishError> {
        let event = PublishStartedEvent {
            event_id: EventId::new(),
            user_id: job.user_id.clone(),
            publish_job_id: job.id,
            platform: job.platform.clone(),
            started_at: job.started_at.unwrap_or_else(Timestamp::now),
        };
        self.emit(job, &event).await?;
        Ok(event)
    }

    pub async fn succeeded(
        &self,
        job: &PublishJob,
        post: &PublishedPost,
    ) -> Result<PublishSucceededEvent, PublishError> {
        let event = PublishSucceededEvent {
            event_id: EventId::new(),
            user_id: job.user_id.clone(),
            publish_job_id: job.id,
            platform: job.platform.clone(),
            platform_post_id: post.platform_post_id.clone(),
            permalink: post.permalink_url.clone(),
            published_at: post.published_at,
        };
        self.emit(job, &event).await?;
        Ok(event)
    }

    /// `error` must already carry its `[KIND]` tag.
    pub async fn failed(
        &self,
        job: &PublishJob,
        kind: FailureKind,
        error: &str,
    ) -> Result<PublishFailedEvent, PublishError> {
        let event = PublishFailedEvent {
            event_id: EventId::new(),
            user_id: job.user_id.clone(),
            publish_job_id: job.id,
            platform: job.platform.clone(),
            error: error.to_string(),
            error_kind: kind,
            retryable: kind.is_retryable(),
            failed_at: job.finished_at.unwrap_or_else(Timestamp::now),
        };
        self.emit(job, &event).await?;
        Ok(event)
    }

    /// Asks the re-submitter for attempt `current_retry_count + 1`.
    pub async fn retry_requested(
        &self,
        job: &PublishJob,
        reason: &str,
    ) -> Result<PublishRetryRequestedEvent, PublishError> {
        let event = PublishRetryRequestedEvent {
            event_id: EventId::new(),
            user_id: job.user_id.clone(),
            publish_job_id: job.id,
            platform: job.platform.clone(),
            reason: reason.to_string(),
            content_item_id: job.content_item_id,
            connected_account_id: job.connected_account_id,
            post_type: job.post_type.clone(),
            idempotency_key: job.idempotency_key.clone(),
            next_attempt: job.current_retry_count + 1,
            max_retries: job.max_retries,
            requested_at: Timestamp::now(),
        };
        self.emit(job, &event).await?;
        Ok(event)
    }

    async fn emit<E: SerializableDomainEvent>(
        &self,
        job: &PublishJob,
        event: &E,
    ) -> Result<(), PublishError> {
        let envelope = event
            .to_envelope()
            .map_err(PublishError::EventPublish)?
            .with_correlation_id(job.id.to_string())
            .with_user_id(job.user_id.to_string());

        self.publisher
            .publish(envelope)
            .await
            .map_err(PublishError::EventPublish)
    }
}
