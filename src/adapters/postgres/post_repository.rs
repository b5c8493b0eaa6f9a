//! PostgreSQL implementation of PublishedPostRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    ConnectedAccountId, DomainError, ErrorCode, PublishJobId, PublishedPostId, Timestamp,
};
use crate::domain::publishing::PublishedPost;
use crate::ports::PublishedPostRepository;

use super::write_error;

/// Uniqueness on `publish_job_id` is enforced by the
/// `published_posts_publish_job_id_key` constraint.
pub struct PostgresPublishedPostRepository {
    pool: PgPool,
}

impl PostgresPublishedPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PublishedPostRow {
    id: Uuid,
    publish_job_id: Uuid,
    connected_account_id: Uuid,
    platform: String,
    platform_post_id: String,
    permalink_url: String,
    published_at: DateTime<Utc>,
}

impl From<PublishedPostRow> for PublishedPost {
    fn from(row: PublishedPostRow) -> Self {
        PublishedPost {
            id: PublishedPostId::from_uuid(row.id),
            publish_job_id: PublishJobId::from_uuid(row.publish_job_id),
            connected_account_id: ConnectedAccountId::from_uuid(row.connected_account_id),
            platform: row.platform,
            platform_post_id: row.platform_post_id,
            permalink_url: row.permalink_url,
            published_at: Timestamp::from_datetime(row.published_at),
        }
    }
}

#[async_trait]
impl PublishedPostRepository for PostgresPublishedPostRepository {
    async fn insert(&self, post: &PublishedPost) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO published_posts (
                id, publish_job_id, connected_account_id, platform,
                platform_post_id, permalink_url, published_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(post.publish_job_id.as_uuid())
        .bind(post.connected_account_id.as_uuid())
        .bind(&post.platform)
        .bind(&post.platform_post_id)
        .bind(&post.permalink_url)
        .bind(post.published_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "Failed to insert published post"))?;

        Ok(())
    }

    async fn find_by_job_id(
        &self,
        job_id: &PublishJobId,
    ) -> Result<Option<PublishedPost>, DomainError> {
        let row = sqlx::query_as::<_, PublishedPostRow>(
            r#"
            SELECT id, publish_job_id, connected_account_id, platform,
                   platform_post_id, permalink_url, published_at
            FROM published_posts
            WHERE publish_job_id = $1
            "#,
        )
        .bind(job_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to load published post: {}", e),
            )
        })?;

        Ok(row.map(PublishedPost::from))
    }
}
