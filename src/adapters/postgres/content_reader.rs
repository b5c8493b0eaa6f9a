//! PostgreSQL implementation of ContentItemReader.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::content::ContentItem;
use crate::domain::foundation::{ContentItemId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::ContentItemReader;

use super::corrupt_row;

pub struct PostgresContentItemReader {
    pool: PgPool,
}

impl PostgresContentItemReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContentItemRow {
    id: Uuid,
    user_id: String,
    title: String,
    body: String,
    media_path: Option<String>,
    media_url: Option<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContentItemRow> for ContentItem {
    type Error = DomainError;

    fn try_from(row: ContentItemRow) -> Result<Self, Self::Error> {
        Ok(ContentItem {
            id: ContentItemId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt_row("user_id", e))?,
            title: row.title,
            body: row.body,
            media_path: row.media_path,
            media_url: row.media_url,
            tags: row.tags,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl ContentItemReader for PostgresContentItemReader {
    async fn get(&self, id: &ContentItemId) -> Result<Option<ContentItem>, DomainError> {
        let row = sqlx::query_as::<_, ContentItemRow>(
            r#"
            SELECT id, user_id, title, body, media_path, media_url, tags, created_at
            FROM content_items
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to load content item: {}", e),
            )
        })?;

        row.map(ContentItem::try_from).transpose()
    }
}
