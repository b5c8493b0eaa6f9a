//! Application layer - services that orchestrate domain operations
//! across ports.

pub mod publishing;

pub use publishing::{
    ExecutePublishResult, ExecutionOutcome, PublishEventEmitter, PublishExecutionService,
    PublishJobService, PublisherRegistry, RegistryError, TokenRefresher,
};
