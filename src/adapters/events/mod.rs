//! Event bus adapters.
//!
//! - `InMemoryEventBus` - In-process capture for tests and local runs
//! - `RedisEventPublisher` - Redis Pub/Sub transport for the worker

mod in_memory;
mod redis_publisher;

pub use in_memory::InMemoryEventBus;
pub use redis_publisher::RedisEventPublisher;
