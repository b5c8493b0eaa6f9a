//! EventPublisher port - Interface for publishing lifecycle events.
//!
//! The engine only defines event schemas; the transport (Redis, a broker,
//! an in-memory bus in tests) lives behind this trait.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Implementations must ensure:
/// - Events are delivered at-least-once (consumers may receive duplicates)
/// - Events passed to `publish_all` keep their order
/// - Errors are propagated to the caller
///
/// # Example
///
/// ```ignore
/// let envelope = started_event.to_envelope()?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order.
    ///
    /// Adapters without batch support publish sequentially and stop at
    /// the first error.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventPublisher) {}
}
