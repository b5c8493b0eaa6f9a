//! In-memory adapters.
//!
//! Back every persistence port with a `HashMap` behind a tokio `RwLock`.
//! Used by the test suites and for running the worker without Postgres.

mod account_store;
mod content_reader;
mod job_repository;
mod post_repository;

pub use account_store::InMemoryConnectedAccountStore;
pub use content_reader::InMemoryContentItemReader;
pub use job_repository::InMemoryPublishJobRepository;
pub use post_repository::InMemoryPublishedPostRepository;
