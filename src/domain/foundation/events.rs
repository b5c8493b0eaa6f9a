//! Event infrastructure for lifecycle event publishing.
//!
//! - `EventId` - Unique identifier for events (deduplication)
//! - `EventMetadata` - Tracing and correlation context
//! - `EventEnvelope` - Transport wrapper for domain events
//! - `DomainEvent` - Trait that all outbound events implement
//! - `domain_event!` - Macro to simplify DomainEvent implementations

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::{DomainError, ErrorCode, Timestamp};

/// Trait that all domain events must implement.
///
/// Provides identification, routing, ordering and versioning. Implement it
/// with the `domain_event!` macro.
pub trait DomainEvent: Send + Sync {
    /// Returns the event type string (e.g., "publish.started.v1").
    fn event_type(&self) -> &'static str;

    /// Returns the ID of the aggregate that emitted this event.
    fn aggregate_id(&self) -> String;

    /// Returns the type of aggregate (e.g., "PublishJob").
    fn aggregate_type(&self) -> &'static str;

    /// Returns when the event occurred.
    fn occurred_at(&self) -> Timestamp;

    /// Returns the unique ID for this event instance.
    fn event_id(&self) -> EventId;
}

/// Extension trait that provides `to_envelope()` for serializable domain events.
///
/// Blanket-implemented for every `DomainEvent + Serialize`.
pub trait SerializableDomainEvent: DomainEvent + Serialize {
    /// Converts this domain event into an `EventEnvelope` for transport.
    fn to_envelope(&self) -> Result<EventEnvelope, DomainError> {
        EventEnvelope::from_event(self)
    }
}

impl<T: DomainEvent + Serialize> SerializableDomainEvent for T {}

/// Implements `DomainEvent` for a struct by naming the fields that carry
/// the aggregate id, the occurrence time and the event id.
///
/// ```ignore
/// domain_event!(
///     PublishStartedEvent,
///     event_type = "publish.started.v1",
///     aggregate_id = publish_job_id,
///     aggregate_type = "PublishJob",
///     occurred_at = started_at,
///     event_id = event_id
/// );
/// ```
#[macro_export]
macro_rules! domain_event {
    (
        $event_name:ident,
        event_type = $event_type:expr,
        aggregate_id = $agg_id_field:ident,
        aggregate_type = $agg_type:expr,
        occurred_at = $occurred_field:ident,
        event_id = $event_id_field:ident
    ) => {
        impl $crate::domain::foundation::DomainEvent for $event_name {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn aggregate_id(&self) -> String {
                self.$agg_id_field.to_string()
            }

            fn aggregate_type(&self) -> &'static str {
                $agg_type
            }

            fn occurred_at(&self) -> $crate::domain::foundation::Timestamp {
                self.$occurred_field
            }

            fn event_id(&self) -> $crate::domain::foundation::EventId {
                self.$event_id_field.clone()
            }
        }
    };
}

pub use domain_event;

/// Unique identifier for events (used for deduplication).
///
/// String-backed so ids minted by upstream producers (which may not be
/// UUIDs) survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an EventId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for tracing and correlation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// ID linking all events produced while handling one inbound request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// User on whose behalf the work was done.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Transport envelope for domain events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique ID for this event instance.
    pub event_id: EventId,

    /// Event type for routing (e.g., "publish.failed.v1").
    pub event_type: String,

    /// Schema version number (extracted from event_type).
    pub schema_version: u32,

    /// ID of the aggregate that emitted this event.
    pub aggregate_id: String,

    /// Type of aggregate.
    pub aggregate_type: String,

    /// When the event occurred.
    pub occurred_at: Timestamp,

    /// Event-specific payload as JSON.
    pub payload: JsonValue,

    /// Tracing and correlation metadata.
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Creates an envelope from a domain event, serializing it as the payload.
    pub fn from_event<T>(event: &T) -> Result<Self, DomainError>
    where
        T: DomainEvent + Serialize + ?Sized,
    {
        let event_type = event.event_type().to_string();
        let schema_version = Self::extract_version(&event_type);
        let payload = serde_json::to_value(event).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize {}: {}", event_type, e),
            )
        })?;

        Ok(Self {
            event_id: event.event_id(),
            event_type,
            schema_version,
            aggregate_id: event.aggregate_id(),
            aggregate_type: event.aggregate_type().to_string(),
            occurred_at: event.occurred_at(),
            payload,
            metadata: EventMetadata::default(),
        })
    }

    /// Extracts the version number from an event type string.
    ///
    /// `"publish.failed.v2"` → 2; no suffix → 1.
    pub(crate) fn extract_version(event_type: &str) -> u32 {
        event_type
            .rsplit_once(".v")
            .and_then(|(_, version_str)| version_str.parse::<u32>().ok())
            .unwrap_or(1)
    }

    /// Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    /// Add user ID for audit.
    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(id.into());
        self
    }

    /// Deserialize payload to a specific event type.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct SampleHappened {
        event_id: EventId,
        sample_id: String,
        happened_at: Timestamp,
    }

    domain_event!(
        SampleHappened,
        event_type = "sample.happened.v2",
        aggregate_id = sample_id,
        aggregate_type = "Sample",
        occurred_at = happened_at,
        event_id = event_id
    );

    #[test]
    fn event_id_generates_unique_values() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn event_id_serializes_transparently() {
        let id = EventId::from_string("test-id");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""test-id""#);
    }

    #[test]
    fn extract_version_reads_suffix() {
        assert_eq!(EventEnvelope::extract_version("publish.failed.v2"), 2);
        assert_eq!(EventEnvelope::extract_version("publish.failed.v10"), 10);
        assert_eq!(EventEnvelope::extract_version("legacy.event"), 1);
    }

    #[test]
    fn to_envelope_copies_event_identity() {
        let event = SampleHappened {
            event_id: EventId::from_string("evt-1"),
            sample_id: "agg-1".to_string(),
            happened_at: Timestamp::now(),
        };

        let envelope = event.to_envelope().unwrap();

        assert_eq!(envelope.event_id.as_str(), "evt-1");
        assert_eq!(envelope.event_type, "sample.happened.v2");
        assert_eq!(envelope.schema_version, 2);
        assert_eq!(envelope.aggregate_id, "agg-1");
        assert_eq!(envelope.aggregate_type, "Sample");
        assert_eq!(envelope.payload["sample_id"], "agg-1");
    }

    #[test]
    fn payload_round_trips() {
        let event = SampleHappened {
            event_id: EventId::new(),
            sample_id: "agg-2".to_string(),
            happened_at: Timestamp::now(),
        };

        let envelope = event.to_envelope().unwrap().with_user_id("user-9");
        let back: SampleHappened = envelope.payload_as().unwrap();

        assert_eq!(back.sample_id, "agg-2");
        assert_eq!(envelope.metadata.user_id.as_deref(), Some("user-9"));
    }
}
