//! PostgreSQL implementation of PublishJobRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    ConnectedAccountId, ContentItemId, DomainError, ErrorCode, PublishJobId, Timestamp, UserId,
};
use crate::domain::publishing::{PublishJob, PublishJobStatus};
use crate::ports::PublishJobRepository;

use super::{corrupt_row, write_error};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, connected_account_id, content_item_id, platform, post_type,
           status, max_retries, current_retry_count, idempotency_key, scheduled_at,
           started_at, finished_at, last_error_message, created_at, updated_at
    FROM publish_jobs
"#;

pub struct PostgresPublishJobRepository {
    pool: PgPool,
}

impl PostgresPublishJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        filter: &str,
        bind: QueryBind<'_>,
    ) -> Result<Option<PublishJob>, DomainError> {
        let sql = format!("{} WHERE {}", SELECT_COLUMNS, filter);
        let query = sqlx::query_as::<_, PublishJobRow>(&sql);
        let query = match bind {
            QueryBind::Id(id) => query.bind(id),
            QueryBind::Key(key) => query.bind(key),
        };
        let row = query.fetch_optional(&self.pool).await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to load publish job: {}", e))
        })?;
        row.map(PublishJob::try_from).transpose()
    }
}

enum QueryBind<'a> {
    Id(Uuid),
    Key(&'a str),
}

#[derive(Debug, sqlx::FromRow)]
struct PublishJobRow {
    id: Uuid,
    user_id: String,
    connected_account_id: Uuid,
    content_item_id: Uuid,
    platform: String,
    post_type: String,
    status: String,
    max_retries: i32,
    current_retry_count: i32,
    idempotency_key: Option<String>,
    scheduled_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    last_error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PublishJobRow> for PublishJob {
    type Error = DomainError;

    fn try_from(row: PublishJobRow) -> Result<Self, Self::Error> {
        Ok(PublishJob {
            id: PublishJobId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt_row("user_id", e))?,
            connected_account_id: ConnectedAccountId::from_uuid(row.connected_account_id),
            content_item_id: ContentItemId::from_uuid(row.content_item_id),
            platform: row.platform,
            post_type: row.post_type,
            status: row
                .status
                .parse::<PublishJobStatus>()
                .map_err(|e| corrupt_row("status", e))?,
            max_retries: u32::try_from(row.max_retries).map_err(|e| corrupt_row("max_retries", e))?,
            current_retry_count: u32::try_from(row.current_retry_count)
                .map_err(|e| corrupt_row("current_retry_count", e))?,
            idempotency_key: row.idempotency_key,
            scheduled_at: Timestamp::from_datetime(row.scheduled_at),
            started_at: row.started_at.map(Timestamp::from_datetime),
            finished_at: row.finished_at.map(Timestamp::from_datetime),
            last_error_message: row.last_error_message,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl PublishJobRepository for PostgresPublishJobRepository {
    async fn insert(&self, job: &PublishJob) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO publish_jobs (
                id, user_id, connected_account_id, content_item_id, platform, post_type,
                status, max_retries, current_retry_count, idempotency_key, scheduled_at,
                started_at, finished_at, last_error_message, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.user_id.as_str())
        .bind(job.connected_account_id.as_uuid())
        .bind(job.content_item_id.as_uuid())
        .bind(&job.platform)
        .bind(&job.post_type)
        .bind(job.status.as_str())
        .bind(job.max_retries as i32)
        .bind(job.current_retry_count as i32)
        .bind(&job.idempotency_key)
        .bind(job.scheduled_at.as_datetime())
        .bind(job.started_at.as_ref().map(|t| *t.as_datetime()))
        .bind(job.finished_at.as_ref().map(|t| *t.as_datetime()))
        .bind(&job.last_error_message)
        .bind(job.created_at.as_datetime())
        .bind(job.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "Failed to insert publish job"))?;

        Ok(())
    }

    async fn update(&self, job: &PublishJob) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE publish_jobs SET
                status = $2,
                started_at = $3,
                finished_at = $4,
                last_error_message = $5,
                updated_at = $6
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(job.status.as_str())
        .bind(job.started_at.as_ref().map(|t| *t.as_datetime()))
        .bind(job.finished_at.as_ref().map(|t| *t.as_datetime()))
        .bind(&job.last_error_message)
        .bind(job.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "Failed to update publish job"))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        match self.find_by_id(&job.id).await? {
            Some(_) => Ok(false),
            None => Err(DomainError::new(
                ErrorCode::PublishJobNotFound,
                format!("Publish job {} not found", job.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &PublishJobId) -> Result<Option<PublishJob>, DomainError> {
        self.find_one("id = $1", QueryBind::Id(*id.as_uuid())).await
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<PublishJob>, DomainError> {
        self.find_one("idempotency_key = $1", QueryBind::Key(key)).await
    }
}
