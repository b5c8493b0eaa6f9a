//! Redis adapters.

mod request_queue;

pub use request_queue::RedisRequestQueue;
