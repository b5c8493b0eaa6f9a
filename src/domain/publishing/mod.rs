//! Publishing domain module.
//!
//! # Module Structure
//!
//! - `job` - PublishJob aggregate
//! - `status` - PublishJobStatus state machine
//! - `platform` - Supported platforms
//! - `result` - PublishResult value object returned by strategies
//! - `failure` - FailureKind classification
//! - `published_post` - Success record
//! - `events` - Inbound request and outbound lifecycle events
//! - `errors` - PublishError taxonomy

mod errors;
mod events;
mod failure;
mod job;
mod platform;
mod published_post;
mod result;
mod status;

pub use errors::PublishError;
pub use events::{
    PublishFailedEvent, PublishRequestEvent, PublishRetryRequestedEvent, PublishStartedEvent,
    PublishSucceededEvent,
};
pub use failure::FailureKind;
pub use job::{PublishJob, DEFAULT_MAX_RETRIES, DEFAULT_POST_TYPE};
pub use platform::Platform;
pub use published_post::PublishedPost;
pub use result::PublishResult;
pub use status::PublishJobStatus;
