//! Platform publisher strategies.
//!
//! One `PublisherStrategy` per supported platform, all on a shared
//! `reqwest::Client`. Base URLs are overridable for tests and sandboxes.

mod facebook;
mod http;
mod instagram;
mod linkedin;
mod youtube;

pub use facebook::FacebookPublisher;
pub use instagram::{InstagramPublisher, DEFAULT_GRAPH_API_BASE};
pub use linkedin::{LinkedInPublisher, DEFAULT_LINKEDIN_API_BASE};
pub use youtube::{YouTubePublisher, DEFAULT_YOUTUBE_API_BASE};
