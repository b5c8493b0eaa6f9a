//! Content item domain module.

mod content_item;

pub use content_item::ContentItem;
