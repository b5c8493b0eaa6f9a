//! PublishExecutionService - runs one publish request end to end.
//!
//! ```text
//! create_job ─► terminal? ─► AlreadyCompleted
//!     │
//!     ▼
//! mark_started ─► started event ─► account ─► token ─► strategy
//!                                                       │
//!                     ┌─────────────────────────────────┴───────┐
//!                     ▼                                         ▼
//!        mark_success + PublishedPost              mark_failure (tagged)
//!              succeeded event                failed event [+ retry_requested]
//! ```
//!
//! The service never retries on its own. A retryable failure with budget
//! left produces a `publish.retry_requested.v1` event for an external
//! re-submitter.

use std::str::FromStr;
use std::sync::Arc;

use crate::domain::publishing::{
    FailureKind, Platform, PublishError, PublishJob, PublishJobStatus, PublishRequestEvent,
    PublishResult, PublishedPost,
};
use crate::ports::{ConnectedAccountStore, PublishContext};

use super::{PublishEventEmitter, PublishJobService, PublisherRegistry, TokenRefresher};

/// What one `execute` call did.
#[derive(Debug, Clone)]
pub struct ExecutePublishResult {
    /// The job as persisted after this execution.
    pub job: PublishJob,
    pub outcome: ExecutionOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Published {
        post: PublishedPost,
    },
    Failed {
        kind: FailureKind,
        /// Tagged message, as stored in `last_error_message`.
        message: String,
        retry_requested: bool,
    },
    /// The idempotency key resolved to a finished job; nothing was done.
    AlreadyCompleted,
}

pub struct PublishExecutionService {
    jobs: Arc<PublishJobService>,
    accounts: Arc<dyn ConnectedAccountStore>,
    refresher: Arc<TokenRefresher>,
    registry: Arc<PublisherRegistry>,
    emitter: PublishEventEmitter,
}

impl PublishExecutionService {
    pub fn new(
        jobs: Arc<PublishJobService>,
        accounts: Arc<dyn ConnectedAccountStore>,
        refresher: Arc<TokenRefresher>,
        registry: Arc<PublisherRegistry>,
        emitter: PublishEventEmitter,
    ) -> Self {
        Self {
            jobs,
            accounts,
            refresher,
            registry,
            emitter,
        }
    }

    /// Executes one publish request.
    ///
    /// Platform, token and account problems end in a Failed job and are
    /// reported through `ExecutionOutcome::Failed`. `Err` is returned only
    /// when no job could be created, when the started event could not be
    /// published (the job stays Pending for redelivery), or when the final
    /// job state could not be persisted.
    #[tracing::instrument(
        name = "publish.execute",
        skip(self, request),
        fields(
            event_id = %request.event_id,
            platform = %request.platform,
            account_id = %request.connected_account_id,
            job_id = tracing::field::Empty,
        )
    )]
    pub async fn execute(
        &self,
        request: &PublishRequestEvent,
    ) -> Result<ExecutePublishResult, PublishError> {
        let job = self.jobs.create_job(request).await?;
        tracing::Span::current().record("job_id", tracing::field::display(job.id));

        if job.is_terminal() {
            tracing::info!(status = %job.status, "Duplicate delivery of a completed job, skipping");
            return Ok(ExecutePublishResult {
                job,
                outcome: ExecutionOutcome::AlreadyCompleted,
            });
        }

        let job = self.jobs.mark_started(job).await?;
        if job.is_terminal() {
            tracing::info!(status = %job.status, "Job finished by another delivery, skipping");
            return Ok(ExecutePublishResult {
                job,
                outcome: ExecutionOutcome::AlreadyCompleted,
            });
        }
        self.emitter.started(&job).await?;

        match self.attempt(&job, request).await {
            Ok(result) if result.is_success() => self.complete_success(job, result).await,
            Ok(result) => {
                let kind = result.failure_kind().unwrap_or(FailureKind::PermanentPlatform);
                let message = result
                    .error_message()
                    .unwrap_or("platform rejected the post")
                    .to_string();
                self.complete_failure(job, kind, &message).await
            }
            Err(err) => self.complete_failure(job, err.kind(), &err.to_string()).await,
        }
    }

    async fn attempt(
        &self,
        job: &PublishJob,
        request: &PublishRequestEvent,
    ) -> Result<PublishResult, PublishError> {
        let account = self
            .accounts
            .get(&job.connected_account_id)
            .await?
            .ok_or(PublishError::AccountNotFound(job.connected_account_id))?;

        if let Ok(platform) = Platform::from_str(&job.platform) {
            if platform != account.platform {
                return Err(PublishError::invalid_request(
                    "platform",
                    format!(
                        "job targets {} but connected account {} belongs to {}",
                        platform, account.id, account.platform
                    ),
                ));
            }
        }

        let token = self.refresher.ensure_valid_token(&account).await?;
        let strategy = self.registry.resolve(&job.platform)?;
        let context = PublishContext::new(request.clone(), account, token);

        strategy
            .publish(&context)
            .await
            .map_err(|err| PublishError::Platform {
                kind: err.kind(),
                message: err.to_string(),
            })
    }

    async fn complete_success(
        &self,
        job: PublishJob,
        result: PublishResult,
    ) -> Result<ExecutePublishResult, PublishError> {
        let (job, post) = match self.jobs.mark_success(job, &result).await {
            Ok(done) => done,
            Err(err) => {
                tracing::error!(
                    platform_post_id = result.platform_post_id().unwrap_or_default(),
                    error = %err,
                    "Platform accepted the post but the success could not be recorded"
                );
                return Err(err);
            }
        };

        let Some(post) = post else {
            return self.report_stored(job).await;
        };

        if let Err(err) = self.emitter.succeeded(&job, &post).await {
            tracing::error!(error = %err, "Failed to emit publish.succeeded");
        }

        tracing::info!(
            platform_post_id = %post.platform_post_id,
            permalink = %post.permalink_url,
            "Publish succeeded"
        );
        Ok(ExecutePublishResult {
            job,
            outcome: ExecutionOutcome::Published { post },
        })
    }

    async fn complete_failure(
        &self,
        job: PublishJob,
        kind: FailureKind,
        message: &str,
    ) -> Result<ExecutePublishResult, PublishError> {
        let tagged = kind.tag_message(message);
        let (job, recorded) = self.jobs.mark_failure(job, &tagged).await?;
        if !recorded {
            return self.report_stored(job).await;
        }

        if let Err(err) = self.emitter.failed(&job, kind, &tagged).await {
            tracing::error!(error = %err, "Failed to emit publish.failed");
        }

        let mut retry_requested = false;
        if kind.is_retryable() && job.has_retry_budget() {
            match self.emitter.retry_requested(&job, &tagged).await {
                Ok(_) => retry_requested = true,
                Err(err) => tracing::error!(error = %err, "Failed to emit publish.retry_requested"),
            }
        }

        tracing::warn!(
            kind = %kind,
            attempt = job.current_retry_count,
            max_retries = job.max_retries,
            retry_requested,
            error = %tagged,
            "Publish failed"
        );
        Ok(ExecutePublishResult {
            job,
            outcome: ExecutionOutcome::Failed {
                kind,
                message: tagged,
                retry_requested,
            },
        })
    }

    /// Closes an execution whose job another delivery finished after this
    /// one emitted `started`. The terminal event mirrors the stored state;
    /// retries are left to the delivery that recorded the outcome.
    async fn report_stored(&self, job: PublishJob) -> Result<ExecutePublishResult, PublishError> {
        tracing::info!(status = %job.status, "Job finished by another delivery");
        match job.status {
            PublishJobStatus::Success => {
                let Some(post) = self.jobs.published_post(&job).await? else {
                    return Ok(ExecutePublishResult {
                        job,
                        outcome: ExecutionOutcome::AlreadyCompleted,
                    });
                };
                if let Err(err) = self.emitter.succeeded(&job, &post).await {
                    tracing::error!(error = %err, "Failed to emit publish.succeeded");
                }
                Ok(ExecutePublishResult {
                    job,
                    outcome: ExecutionOutcome::Published { post },
                })
            }
            PublishJobStatus::Failed => {
                let message = job.last_error_message.clone().unwrap_or_default();
                let kind = FailureKind::split_tagged(&message)
                    .map(|(kind, _)| kind)
                    .unwrap_or(FailureKind::PermanentPlatform);
                if let Err(err) = self.emitter.failed(&job, kind, &message).await {
                    tracing::error!(error = %err, "Failed to emit publish.failed");
                }
                Ok(ExecutePublishResult {
                    job,
                    outcome: ExecutionOutcome::Failed {
                        kind,
                        message,
                        retry_requested: false,
                    },
                })
            }
            PublishJobStatus::Pending => Ok(ExecutePublishResult {
                job,
                outcome: ExecutionOutcome::AlreadyCompleted,
            }),
        }
    }
}
