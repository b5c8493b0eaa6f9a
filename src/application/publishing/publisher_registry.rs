//! PublisherRegistry - resolves a platform key to its strategy.
//!
//! Built once at startup from the fixed strategy list. Lookups are
//! case-insensitive on the platform key.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::publishing::{Platform, PublishError};
use crate::ports::PublisherStrategy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("More than one publisher registered for platform {0}")]
    DuplicatePlatform(Platform),
}

pub struct PublisherRegistry {
    strategies: HashMap<&'static str, Arc<dyn PublisherStrategy>>,
}

impl PublisherRegistry {
    /// Builds the lookup table.
    ///
    /// # Errors
    ///
    /// `DuplicatePlatform` when two strategies claim the same platform.
    pub fn new(strategies: Vec<Arc<dyn PublisherStrategy>>) -> Result<Self, RegistryError> {
        let mut table: HashMap<&'static str, Arc<dyn PublisherStrategy>> = HashMap::new();
        for strategy in strategies {
            let platform = strategy.platform();
            if table.insert(platform.as_str(), strategy).is_some() {
                return Err(RegistryError::DuplicatePlatform(platform));
            }
        }
        Ok(Self { strategies: table })
    }

    /// Strategy for `platform_key`.
    ///
    /// # Errors
    ///
    /// `UnknownPlatform` with the key as given when nothing is registered.
    pub fn resolve(&self, platform_key: &str) -> Result<Arc<dyn PublisherStrategy>, PublishError> {
        self.strategies
            .get(Platform::normalize_key(platform_key).as_str())
            .cloned()
            .ok_or_else(|| PublishError::UnknownPlatform(platform_key.to_string()))
    }

    /// Registered platforms, in canonical order.
    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.strategies.contains_key(p.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
