//! In-memory ConnectedAccount store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::ConnectedAccount;
use crate::domain::foundation::{ConnectedAccountId, DomainError, ErrorCode};
use crate::ports::ConnectedAccountStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryConnectedAccountStore {
    accounts: Arc<RwLock<HashMap<ConnectedAccountId, ConnectedAccount>>>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryConnectedAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account (accounts are created by another service).
    pub async fn insert(&self, account: ConnectedAccount) {
        self.accounts.write().await.insert(account.id, account);
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectedAccountStore for InMemoryConnectedAccountStore {
    async fn get(&self, id: &ConnectedAccountId) -> Result<Option<ConnectedAccount>, DomainError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn save(&self, account: &ConnectedAccount) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&account.id) {
            Some(existing) => {
                *existing = account.clone();
                self.saves.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ConnectedAccountNotFound,
                format!("Connected account {} not found", account.id),
            )),
        }
    }
}
