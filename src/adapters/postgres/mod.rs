//! PostgreSQL adapters.
//!
//! Tables are created by `migrations/0001_publish_orchestrator.sql`.

mod account_store;
mod content_reader;
mod job_repository;
mod post_repository;

pub use account_store::PostgresConnectedAccountStore;
pub use content_reader::PostgresContentItemReader;
pub use job_repository::PostgresPublishJobRepository;
pub use post_repository::PostgresPublishedPostRepository;

use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Unique constraints whose violation means "this row already exists".
const UNIQUE_CONSTRAINTS: &[&str] = &[
    "publish_jobs_pkey",
    "publish_jobs_idempotency_key_key",
    "published_posts_pkey",
    "published_posts_publish_job_id_key",
];

/// Maps a write failure, surfacing unique violations as `DuplicateKey`.
fn write_error(e: sqlx::Error, context: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if let Some(constraint) = db_err.constraint() {
            if UNIQUE_CONSTRAINTS.contains(&constraint) {
                return DomainError::new(
                    ErrorCode::DuplicateKey,
                    format!("{}: {} violated", context, constraint),
                )
                .with_detail("constraint", constraint);
            }
        }
    }
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn corrupt_row(column: &str, e: impl fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid value in column '{}': {}", column, e),
    )
}
