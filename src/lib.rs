//! Publish Orchestrator - publish-job execution engine
//!
//! Takes "publish this content item to that connected account" requests,
//! records each as an idempotent job, keeps the account's OAuth token fresh,
//! dispatches to the platform strategy and reports the outcome as lifecycle
//! events. Retries are requested through events, never performed in-process.
//!
//! Layout follows ports and adapters:
//!
//! - `domain` - jobs, accounts, content, failure taxonomy, events
//! - `ports` - traits the application depends on
//! - `application` - job service, token refresher, registry, orchestrator
//! - `adapters` - PostgreSQL, Redis, HTTP and in-memory implementations
//! - `config` - environment-driven configuration
//! - `telemetry` - tracing subscriber setup

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
