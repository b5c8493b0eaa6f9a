//! PostgreSQL implementation of ConnectedAccountStore.
//!
//! `save` only writes the token columns; the rest of the row belongs to the
//! accounts service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::ConnectedAccount;
use crate::domain::foundation::{ConnectedAccountId, DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::publishing::Platform;
use crate::ports::ConnectedAccountStore;

use super::corrupt_row;

pub struct PostgresConnectedAccountStore {
    pool: PgPool,
}

impl PostgresConnectedAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConnectedAccountRow {
    id: Uuid,
    user_id: String,
    platform: String,
    external_account_id: String,
    display_name: Option<String>,
    access_token: String,
    refresh_token: Option<String>,
    token_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConnectedAccountRow> for ConnectedAccount {
    type Error = DomainError;

    fn try_from(row: ConnectedAccountRow) -> Result<Self, Self::Error> {
        Ok(ConnectedAccount {
            id: ConnectedAccountId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt_row("user_id", e))?,
            platform: row
                .platform
                .parse::<Platform>()
                .map_err(|e| corrupt_row("platform", e))?,
            external_account_id: row.external_account_id,
            display_name: row.display_name,
            access_token: SecretString::new(row.access_token),
            refresh_token: row.refresh_token.map(SecretString::new),
            token_expires_at: row.token_expires_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl ConnectedAccountStore for PostgresConnectedAccountStore {
    async fn get(&self, id: &ConnectedAccountId) -> Result<Option<ConnectedAccount>, DomainError> {
        let row = sqlx::query_as::<_, ConnectedAccountRow>(
            r#"
            SELECT id, user_id, platform, external_account_id, display_name,
                   access_token, refresh_token, token_expires_at, created_at, updated_at
            FROM connected_accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to load connected account: {}", e),
            )
        })?;

        row.map(ConnectedAccount::try_from).transpose()
    }

    async fn save(&self, account: &ConnectedAccount) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE connected_accounts SET
                access_token = $2,
                refresh_token = $3,
                token_expires_at = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.access_token.expose_secret())
        .bind(account.refresh_token.as_ref().map(|t| t.expose_secret().clone()))
        .bind(account.token_expires_at.as_ref().map(|t| *t.as_datetime()))
        .bind(account.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save connected account: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ConnectedAccountNotFound,
                format!("Connected account {} not found", account.id),
            ));
        }
        Ok(())
    }
}
