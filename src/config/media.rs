//! Media storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Directory content items' `media_path` values are resolved against
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl MediaConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.root.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("MEDIA__ROOT"));
        }
        Ok(())
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { root: default_root() }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("./media")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_is_valid() {
        assert!(MediaConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_root_is_rejected() {
        let config = MediaConfig { root: PathBuf::new() };
        assert!(config.validate().is_err());
    }
}
