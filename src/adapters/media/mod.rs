//! Media storage adapters.
//!
//! - `LocalMediaStorage` - files under a root directory
//! - `InMemoryMediaStorage` - blobs in a map, for tests

mod in_memory;
mod local;

pub use in_memory::InMemoryMediaStorage;
pub use local::LocalMediaStorage;
