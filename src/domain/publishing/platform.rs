//! Supported publishing platforms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// External platform a connected account belongs to.
///
/// The wire/storage key is the upper-case name (`"YOUTUBE"`); parsing is
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Youtube,
    Linkedin,
    Instagram,
    Facebook,
}

impl Platform {
    /// Every supported platform, in registration order.
    pub const ALL: [Platform; 4] = [
        Platform::Youtube,
        Platform::Linkedin,
        Platform::Instagram,
        Platform::Facebook,
    ];

    /// Canonical platform key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "YOUTUBE",
            Platform::Linkedin => "LINKEDIN",
            Platform::Instagram => "INSTAGRAM",
            Platform::Facebook => "FACEBOOK",
        }
    }

    /// Normalizes an arbitrary key for lookups (trimmed, upper-case).
    pub fn normalize_key(key: &str) -> String {
        key.trim().to_ascii_uppercase()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::normalize_key(s).as_str() {
            "YOUTUBE" => Ok(Platform::Youtube),
            "LINKEDIN" => Ok(Platform::Linkedin),
            "INSTAGRAM" => Ok(Platform::Instagram),
            "FACEBOOK" => Ok(Platform::Facebook),
            _ => Err(ValidationError::invalid_format(
                "platform",
                format!("unsupported platform '{}'", s),
            )),
        }
    }
}
