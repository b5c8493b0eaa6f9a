//! Adapters - Implementations of port interfaces.
//!
//! - `events` - Lifecycle event publishers (in-memory, Redis)
//! - `media` - Media storage (local filesystem, in-memory)
//! - `memory` - In-memory repositories and stores
//! - `oauth` - HTTP OAuth token endpoint client
//! - `platforms` - One publisher strategy per platform
//! - `postgres` - PostgreSQL repositories and stores
//! - `redis` - Redis-backed publish request queue

pub mod events;
pub mod media;
pub mod memory;
pub mod oauth;
pub mod platforms;
pub mod postgres;
pub mod redis;

pub use events::{InMemoryEventBus, RedisEventPublisher};
