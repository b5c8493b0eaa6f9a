//! In-memory event bus.
//!
//! Captures every published envelope in order so tests can assert on the
//! exact event sequence of an execution.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// In-memory event bus for tests and local runs.
///
/// Features:
/// - Ordered event capture for assertions
/// - Per-event-type failure injection
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.publish(envelope).await?;
///
/// assert_eq!(bus.event_types(), vec!["publish.started.v1"]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEventBus {
    published: RwLock<Vec<EventEnvelope>>,
    failing_types: RwLock<HashSet<String>>,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later publish of `event_type` fail.
    pub fn fail_on(&self, event_type: &str) {
        self.failing_types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event_type.to_string());
    }

    /// Removes all injected failures.
    pub fn clear_failures(&self) {
        self.failing_types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    // === Test Helpers ===

    /// Returns all published events in publish order.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event types in publish order.
    pub fn event_types(&self) -> Vec<String> {
        self.published_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns events for a specific aggregate.
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    /// Clears all published events.
    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type == event_type)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let fails = self
            .failing_types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&event.event_type);
        if fails {
            return Err(DomainError::new(
                ErrorCode::EventBusError,
                format!("Simulated publish failure for {}", event.event_type),
            ));
        }

        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
