//! PublishJobService - job creation and the terminal transitions.
//!
//! Creation is idempotent on the request's idempotency key. Terminal
//! transitions are checked against the stored row, so a finished job is
//! never rewritten, even from a stale Pending copy.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::publishing::{
    PublishError, PublishJob, PublishJobStatus, PublishRequestEvent, PublishResult, PublishedPost,
    DEFAULT_MAX_RETRIES,
};
use crate::ports::{PublishJobRepository, PublishedPostRepository};

pub struct PublishJobService {
    jobs: Arc<dyn PublishJobRepository>,
    posts: Arc<dyn PublishedPostRepository>,
    default_max_retries: u32,
}

impl PublishJobService {
    pub fn new(
        jobs: Arc<dyn PublishJobRepository>,
        posts: Arc<dyn PublishedPostRepository>,
    ) -> Self {
        Self {
            jobs,
            posts,
            default_max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Retry budget for requests that do not carry their own.
    pub fn with_default_max_retries(mut self, max_retries: u32) -> Self {
        self.default_max_retries = max_retries;
        self
    }

    /// Creates a Pending job, or returns the job already bound to the
    /// request's idempotency key.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` for malformed requests
    /// - `IdempotencyConflict` when the key belongs to a different request
    /// - `Repository` on persistence failure
    pub async fn create_job(
        &self,
        request: &PublishRequestEvent,
    ) -> Result<PublishJob, PublishError> {
        request.validate()?;

        if let Some(key) = &request.idempotency_key {
            if let Some(existing) = self.jobs.find_by_idempotency_key(key).await? {
                return Self::reuse(existing, request, key);
            }
        }

        let job = PublishJob::from_request(request, self.default_max_retries);
        match self.jobs.insert(&job).await {
            Ok(()) => {
                tracing::info!(
                    job_id = %job.id,
                    platform = %job.platform,
                    attempt = job.current_retry_count,
                    max_retries = job.max_retries,
                    "Publish job created"
                );
                Ok(job)
            }
            Err(err) if err.is_duplicate_key() => {
                // Lost an insert race on the key; the winner's row is authoritative.
                let Some(key) = &request.idempotency_key else {
                    return Err(err.into());
                };
                match self.jobs.find_by_idempotency_key(key).await? {
                    Some(winner) => Self::reuse(winner, request, key),
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    fn reuse(
        existing: PublishJob,
        request: &PublishRequestEvent,
        key: &str,
    ) -> Result<PublishJob, PublishError> {
        if !existing.matches_request(request) {
            tracing::warn!(
                job_id = %existing.id,
                idempotency_key = %key,
                "Idempotency key reused for a different request"
            );
            return Err(PublishError::IdempotencyConflict {
                key: key.to_string(),
                existing_job_id: existing.id,
            });
        }
        tracing::debug!(
            job_id = %existing.id,
            status = %existing.status,
            "Reusing job for idempotency key"
        );
        Ok(existing)
    }

    /// Stamps `started_at` on a Pending job that has not started yet.
    ///
    /// When the stored row already finished, the stored job is returned.
    pub async fn mark_started(&self, mut job: PublishJob) -> Result<PublishJob, PublishError> {
        if job.mark_started(Timestamp::now()) && !self.jobs.update(&job).await? {
            return self.stored(&job).await;
        }
        Ok(job)
    }

    /// Moves a Pending job to Success and stores its PublishedPost.
    ///
    /// Returns the post only when this call made the transition. When the
    /// stored job is already terminal, even if `job` is a stale Pending
    /// copy, the stored job comes back with `None` and no post is written.
    pub async fn mark_success(
        &self,
        job: PublishJob,
        result: &PublishResult,
    ) -> Result<(PublishJob, Option<PublishedPost>), PublishError> {
        if !result.is_success() {
            return Err(PublishError::invalid_request(
                "result",
                "mark_success requires a successful publish result",
            ));
        }

        let now = Timestamp::now();
        let mut candidate = job.clone();
        if !candidate.mark_success(now) {
            return Ok((job, None));
        }

        let stored = self.stored(&job).await?;
        if stored.is_terminal() {
            tracing::info!(job_id = %job.id, status = %stored.status, "Job already finished");
            return Ok((stored, None));
        }

        let Some(post) = PublishedPost::from_success(&candidate, result, now) else {
            return Ok((job, None));
        };
        let post = match self.posts.insert(&post).await {
            Ok(()) => post,
            Err(err) if err.is_duplicate_key() => {
                // An earlier delivery stopped between the two writes.
                tracing::warn!(job_id = %job.id, "Published post already recorded, completing job");
                self.posts.find_by_job_id(&job.id).await?.unwrap_or(post)
            }
            Err(err) => return Err(err.into()),
        };

        if !self.jobs.update(&candidate).await? {
            let stored = self.stored(&job).await?;
            if stored.status != PublishJobStatus::Success {
                tracing::error!(
                    job_id = %job.id,
                    status = %stored.status,
                    platform_post_id = %post.platform_post_id,
                    "Job finished elsewhere while its post was being recorded"
                );
            }
            return Ok((stored, None));
        }
        Ok((candidate, Some(post)))
    }

    /// Moves a Pending job to Failed with `error_message`.
    ///
    /// The flag is `true` only when this call recorded the failure;
    /// otherwise the stored terminal job comes back unchanged.
    pub async fn mark_failure(
        &self,
        mut job: PublishJob,
        error_message: &str,
    ) -> Result<(PublishJob, bool), PublishError> {
        if !job.mark_failure(error_message, Timestamp::now()) {
            return Ok((job, false));
        }
        if !self.jobs.update(&job).await? {
            tracing::info!(job_id = %job.id, "Job already finished, failure not recorded");
            return Ok((self.stored(&job).await?, false));
        }
        Ok((job, true))
    }

    /// The success record of a finished job, if any.
    pub async fn published_post(
        &self,
        job: &PublishJob,
    ) -> Result<Option<PublishedPost>, PublishError> {
        Ok(self.posts.find_by_job_id(&job.id).await?)
    }

    async fn stored(&self, job: &PublishJob) -> Result<PublishJob, PublishError> {
        self.jobs.find_by_id(&job.id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::PublishJobNotFound,
                format!("Publish job {} not found", job.id),
            )
            .into()
        })
    }
}
