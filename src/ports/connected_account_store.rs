//! ConnectedAccountStore port.
//!
//! Accounts are created by the accounts service. The engine reads them
//! and, through the token refresher, writes back refreshed tokens.

use async_trait::async_trait;

use crate::domain::account::ConnectedAccount;
use crate::domain::foundation::{ConnectedAccountId, DomainError};

#[async_trait]
pub trait ConnectedAccountStore: Send + Sync {
    /// Find an account by id.
    ///
    /// Returns `None` if it does not exist.
    async fn get(&self, id: &ConnectedAccountId) -> Result<Option<ConnectedAccount>, DomainError>;

    /// Persist the account's current token fields.
    ///
    /// # Errors
    ///
    /// - `ConnectedAccountNotFound` if the account doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn save(&self, account: &ConnectedAccount) -> Result<(), DomainError>;
}
