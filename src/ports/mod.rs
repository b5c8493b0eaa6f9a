//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `PublishJobRepository` - Job rows and idempotency-key lookup
//! - `PublishedPostRepository` - Success records, one per job
//! - `ConnectedAccountStore` - Account tokens (read + token write-back)
//! - `ContentItemReader` - Read-only content access
//!
//! ## External Service Ports
//!
//! - `PublisherStrategy` - Per-platform publishing
//! - `OAuthTokenClient` - Platform token endpoints
//! - `MediaStorage` - Media blobs referenced by content
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Outbound lifecycle events
//! - `PublishRequestSource` - Inbound publish requests

mod connected_account_store;
mod content_item_reader;
mod event_publisher;
mod media_storage;
mod oauth_token_client;
mod publish_job_repository;
mod publish_request_source;
mod published_post_repository;
mod publisher_strategy;

pub use connected_account_store::ConnectedAccountStore;
pub use content_item_reader::ContentItemReader;
pub use event_publisher::EventPublisher;
pub use media_storage::{MediaError, MediaStorage};
pub use oauth_token_client::{OAuthTokenClient, TokenEndpointError, TokenGrant};
pub use publish_job_repository::PublishJobRepository;
pub use publish_request_source::PublishRequestSource;
pub use published_post_repository::PublishedPostRepository;
pub use publisher_strategy::{PlatformError, PublishContext, PublisherStrategy};
