//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and the event
//! infrastructure shared by the publishing domain.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{ConnectedAccountId, ContentItemId, PublishJobId, PublishedPostId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
