//! Failure classification shared by strategies, the token refresher and
//! the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a publish attempt failed, from the retry logic's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Missing refresh token, unregistered platform, missing field.
    Configuration,

    /// The platform rejected our credentials (e.g. revoked consent).
    Auth,

    /// Rate limit or quota exceeded.
    RateLimited,

    /// Timeout, connection failure, 5xx.
    TransientNetwork,

    /// The platform rejected the content itself (policy violation etc).
    PermanentPlatform,
}

impl FailureKind {
    /// Whether another attempt can plausibly succeed without a human fixing
    /// something first.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::RateLimited | FailureKind::TransientNetwork)
    }

    /// Tag used as the message prefix in persisted errors and events.
    pub fn tag(&self) -> &'static str {
        match self {
            FailureKind::Configuration => "CONFIGURATION",
            FailureKind::Auth => "AUTH",
            FailureKind::RateLimited => "RATE_LIMITED",
            FailureKind::TransientNetwork => "TRANSIENT_NETWORK",
            FailureKind::PermanentPlatform => "PERMANENT_PLATFORM",
        }
    }

    /// Formats `message` as `[TAG] message`.
    ///
    /// A message that already carries a tag is returned unchanged.
    pub fn tag_message(&self, message: &str) -> String {
        if Self::split_tagged(message).is_some() {
            return message.to_string();
        }
        format!("[{}] {}", self.tag(), message)
    }

    /// Splits a `[TAG] message` string into its kind and message.
    pub fn split_tagged(message: &str) -> Option<(FailureKind, &str)> {
        let rest = message.strip_prefix('[')?;
        let (tag, tail) = rest.split_once(']')?;
        let kind = tag.parse().ok()?;
        Some((kind, tail.trim_start()))
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FailureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIGURATION" => Ok(FailureKind::Configuration),
            "AUTH" => Ok(FailureKind::Auth),
            "RATE_LIMITED" => Ok(FailureKind::RateLimited),
            "TRANSIENT_NETWORK" => Ok(FailureKind::TransientNetwork),
            "PERMANENT_PLATFORM" => Ok(FailureKind::PermanentPlatform),
            other => Err(format!("unknown failure kind '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limits_and_network_errors_are_retryable() {
        assert!(FailureKind::RateLimited.is_retryable());
        assert!(FailureKind::TransientNetwork.is_retryable());
        assert!(!FailureKind::Configuration.is_retryable());
        assert!(!FailureKind::Auth.is_retryable());
        assert!(!FailureKind::PermanentPlatform.is_retryable());
    }

    #[test]
    fn tag_message_prefixes_once() {
        let tagged = FailureKind::RateLimited.tag_message("quota exceeded");
        assert_eq!(tagged, "[RATE_LIMITED] quota exceeded");
        assert_eq!(FailureKind::Auth.tag_message(&tagged), tagged);
    }

    #[test]
    fn split_tagged_recovers_kind() {
        let (kind, message) = FailureKind::split_tagged("[PERMANENT_PLATFORM] policy").unwrap();
        assert_eq!(kind, FailureKind::PermanentPlatform);
        assert_eq!(message, "policy");
    }

    #[test]
    fn split_tagged_ignores_unknown_brackets() {
        assert!(FailureKind::split_tagged("[nope] hi").is_none());
        assert!(FailureKind::split_tagged("plain").is_none());
    }
}
