//! PublishedPost - the single authoritative success record of a job.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConnectedAccountId, PublishJobId, PublishedPostId, Timestamp};

use super::{PublishJob, PublishResult};

/// Created only when a strategy reported success; at most one per job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: PublishedPostId,
    pub publish_job_id: PublishJobId,
    pub connected_account_id: ConnectedAccountId,
    pub platform: String,
    pub platform_post_id: String,
    pub permalink_url: String,
    pub published_at: Timestamp,
}

impl PublishedPost {
    /// Builds the record for a successful result.
    ///
    /// Returns `None` for a failed result.
    pub fn from_success(
        job: &PublishJob,
        result: &PublishResult,
        published_at: Timestamp,
    ) -> Option<Self> {
        if !result.is_success() {
            return None;
        }
        Some(Self {
            id: PublishedPostId::new(),
            publish_job_id: job.id,
            connected_account_id: job.connected_account_id,
            platform: job.platform.clone(),
            platform_post_id: result.platform_post_id()?.to_string(),
            permalink_url: result.permalink()?.to_string(),
            published_at,
        })
    }
}
