//! Redis list-backed request queue.
//!
//! Producers `LPUSH` JSON-encoded `PublishRequestEvent`s onto the queue key;
//! the worker takes them with `BRPOP`. BRPOP blocks the connection it runs
//! on, so the queue should get its own connection rather than sharing the
//! event publisher's.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::publishing::PublishRequestEvent;
use crate::ports::PublishRequestSource;

#[derive(Clone)]
pub struct RedisRequestQueue {
    conn: MultiplexedConnection,
    key: String,
    poll_timeout_secs: u64,
}

impl RedisRequestQueue {
    pub fn new(
        conn: MultiplexedConnection,
        key: impl Into<String>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            conn,
            key: key.into(),
            poll_timeout_secs,
        }
    }

    fn decode(payload: &str) -> Result<PublishRequestEvent, DomainError> {
        serde_json::from_str(payload).map_err(|e| {
            DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Malformed publish request: {}", e),
            )
        })
    }
}

#[async_trait]
impl PublishRequestSource for RedisRequestQueue {
    async fn next_request(&self) -> Result<Option<PublishRequestEvent>, DomainError> {
        let mut conn = self.conn.clone();
        let popped: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(&self.key)
            .arg(self.poll_timeout_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| {
                DomainError::new(ErrorCode::EventBusError, format!("Redis BRPOP failed: {}", e))
            })?;

        match popped {
            Some((_, payload)) => Self::decode(&payload).map(Some),
            None => Ok(None),
        }
    }
}
