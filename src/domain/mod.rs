//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, events)
//! - `publishing` - Publish job lifecycle, results, failure taxonomy and events
//! - `account` - Connected platform accounts and their tokens
//! - `content` - Content items read by platform strategies

pub mod account;
pub mod content;
pub mod foundation;
pub mod publishing;
