//! Publishing application services.
//!
//! - `PublishJobService` - idempotent job creation and terminal transitions
//! - `TokenRefresher` - per-account serialized OAuth refresh
//! - `PublisherRegistry` - platform key to strategy dispatch
//! - `PublishEventEmitter` - lifecycle event publishing
//! - `PublishExecutionService` - the orchestrator tying them together

mod publish_event_emitter;
mod publish_execution_service;
mod publish_job_service;
mod publisher_registry;
mod token_refresher;

pub use publish_event_emitter::PublishEventEmitter;
pub use publish_execution_service::{
    ExecutePublishResult, ExecutionOutcome, PublishExecutionService,
};
pub use publish_job_service::PublishJobService;
pub use publisher_registry::{PublisherRegistry, RegistryError};
pub use token_refresher::{
    TokenRefresher, DEFAULT_REFRESH_BUFFER_SECS, DEFAULT_REFRESH_TIMEOUT_SECS,
};
