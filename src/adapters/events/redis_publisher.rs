//! Redis Pub/Sub event publisher.
//!
//! Publishes each envelope as JSON on a single channel. Consumers route on
//! the envelope's `event_type`.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel: String,
}

impl RedisEventPublisher {
    pub fn new(conn: MultiplexedConnection, channel: impl Into<String>) -> Self {
        Self {
            conn,
            channel: channel.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::EventBusError,
                format!("Failed to serialize {}: {}", event.event_type, e),
            )
        })?;

        let mut conn = self.conn.clone();
        let receivers: i64 = conn
            .publish(&self.channel, payload)
            .await
            .map_err(|e: redis::RedisError| {
                DomainError::new(ErrorCode::EventBusError, format!("Redis PUBLISH failed: {}", e))
            })?;

        tracing::debug!(
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            channel = %self.channel,
            receivers,
            "Event published"
        );
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
