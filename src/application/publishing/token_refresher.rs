//! TokenRefresher - keeps connected-account access tokens usable.
//!
//! Double-checked locking per account: a fast validity check without any
//! lock, then a per-account async mutex, then a re-read from the store so a
//! task that waited behind another refresh reuses the fresh token instead of
//! spending the refresh token a second time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use secrecy::SecretString;

use crate::domain::account::ConnectedAccount;
use crate::domain::foundation::{ConnectedAccountId, Timestamp};
use crate::domain::publishing::PublishError;
use crate::ports::{ConnectedAccountStore, OAuthTokenClient, TokenEndpointError};

/// Default lead time before expiry at which a token is refreshed.
pub const DEFAULT_REFRESH_BUFFER_SECS: u64 = 300;

/// Default upper bound for one token endpoint call.
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 15;

type AccountLock = Arc<tokio::sync::Mutex<()>>;

pub struct TokenRefresher {
    accounts: Arc<dyn ConnectedAccountStore>,
    oauth: Arc<dyn OAuthTokenClient>,
    buffer: chrono::Duration,
    refresh_timeout: Duration,
    locks: Mutex<HashMap<ConnectedAccountId, AccountLock>>,
}

impl TokenRefresher {
    pub fn new(accounts: Arc<dyn ConnectedAccountStore>, oauth: Arc<dyn OAuthTokenClient>) -> Self {
        Self {
            accounts,
            oauth,
            buffer: chrono::Duration::seconds(DEFAULT_REFRESH_BUFFER_SECS as i64),
            refresh_timeout: Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
        self.buffer = chrono::Duration::seconds(buffer.as_secs() as i64);
        self
    }

    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Returns an access token that stays valid for at least the refresh
    /// buffer, refreshing and persisting a new one when needed.
    ///
    /// # Errors
    ///
    /// - `MissingRefreshToken` if a refresh is needed but none is stored
    /// - `RefreshFailed` if the token endpoint call failed or timed out
    /// - `AccountNotFound` if the account disappeared from the store
    /// - `Repository` if the refreshed token could not be saved
    pub async fn ensure_valid_token(
        &self,
        account: &ConnectedAccount,
    ) -> Result<SecretString, PublishError> {
        if !account.needs_refresh(self.buffer, Timestamp::now()) {
            return Ok(account.access_token.clone());
        }

        let lock = self.lock_for(&account.id);
        let result = {
            let _guard = lock.lock().await;
            self.refresh_locked(&account.id).await
        };
        self.release(&account.id, lock);
        result
    }

    async fn refresh_locked(
        &self,
        account_id: &ConnectedAccountId,
    ) -> Result<SecretString, PublishError> {
        let current = self
            .accounts
            .get(account_id)
            .await?
            .ok_or(PublishError::AccountNotFound(*account_id))?;

        let now = Timestamp::now();
        if !current.needs_refresh(self.buffer, now) {
            tracing::debug!(
                account_id = %account_id,
                "Reusing token refreshed by a concurrent caller"
            );
            return Ok(current.access_token.clone());
        }

        let refresh_token = match &current.refresh_token {
            Some(token) if current.has_refresh_token() => token.clone(),
            _ => return Err(PublishError::MissingRefreshToken(*account_id)),
        };

        let grant = match tokio::time::timeout(
            self.refresh_timeout,
            self.oauth.refresh(current.platform, &refresh_token),
        )
        .await
        {
            Ok(Ok(grant)) => grant,
            Ok(Err(err)) => return Err(Self::refresh_failed(account_id, err)),
            Err(_) => {
                let err = TokenEndpointError::Timeout(self.refresh_timeout.as_secs());
                return Err(Self::refresh_failed(account_id, err));
            }
        };

        let mut updated = current;
        updated.apply_token_grant(
            grant.access_token,
            grant.expires_in_secs,
            grant.refresh_token,
            now,
        );
        self.accounts.save(&updated).await?;

        tracing::info!(
            account_id = %account_id,
            platform = %updated.platform,
            expires_in_secs = grant.expires_in_secs,
            "Access token refreshed"
        );
        Ok(updated.access_token)
    }

    fn refresh_failed(account_id: &ConnectedAccountId, err: TokenEndpointError) -> PublishError {
        tracing::warn!(
            account_id = %account_id,
            kind = %err.kind(),
            error = %err,
            "Token refresh failed"
        );
        PublishError::RefreshFailed {
            account_id: *account_id,
            kind: err.kind(),
            body: err.to_string(),
        }
    }

    fn lock_for(&self, account_id: &ConnectedAccountId) -> AccountLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(*account_id).or_default().clone()
    }

    /// Drops the map entry once no other caller holds the account's lock.
    fn release(&self, account_id: &ConnectedAccountId, lock: AccountLock) {
        drop(lock);
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(account_id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(account_id);
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryConnectedAccountStore;
    use crate::domain::account::fixtures::account_expiring_in;
    use crate::domain::publishing::{FailureKind, Platform};
    use crate::ports::TokenGrant;
    use async_trait::async_trait;
    use secrecy::ExposeSecret;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockOAuthClient {
        calls: AtomicUsize,
        delay: Duration,
        expires_in_secs: u64,
        response: Result<(), TokenEndpointError>,
    }

    impl MockOAuthClient {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(0),
                expires_in_secs: 3600,
                response: Ok(()),
            }
        }

        fn slow(delay: Duration) -> Self {
            Self { delay, ..Self::ok() }
        }

        fn failing(err: TokenEndpointError) -> Self {
            Self {
                response: Err(err),
                ..Self::ok()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OAuthTokenClient for MockOAuthClient {
        async fn refresh(
            &self,
            _platform: Platform,
            _refresh_token: &SecretString,
        ) -> Result<TokenGrant, TokenEndpointError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.response.clone()?;
            Ok(TokenGrant {
                access_token: SecretString::new(format!("fresh-{}", n)),
                expires_in_secs: self.expires_in_secs,
                refresh_token: None,
            })
        }
    }

    async fn setup(
        account: ConnectedAccount,
        oauth: MockOAuthClient,
    ) -> (Arc<TokenRefresher>, InMemoryConnectedAccountStore, Arc<MockOAuthClient>) {
        let store = InMemoryConnectedAccountStore::new();
        store.insert(account).await;
        let oauth = Arc::new(oauth);
        let refresher = TokenRefresher::new(Arc::new(store.clone()), oauth.clone());
        (Arc::new(refresher), store, oauth)
    }

    #[tokio::test]
    async fn valid_token_is_returned_without_network_call() {
        let account = account_expiring_in(Platform::Youtube, 60);
        let (refresher, store, oauth) = setup(account.clone(), MockOAuthClient::ok()).await;

        let token = refresher.ensure_valid_token(&account).await.unwrap();

        assert_eq!(token.expose_secret(), "old-access");
        assert_eq!(oauth.calls(), 0);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn expiring_token_is_refreshed_and_persisted() {
        let account = account_expiring_in(Platform::Youtube, 2);
        let (refresher, store, oauth) = setup(account.clone(), MockOAuthClient::ok()).await;

        let token = refresher.ensure_valid_token(&account).await.unwrap();

        assert_eq!(token.expose_secret(), "fresh-1");
        assert_eq!(oauth.calls(), 1);
        let saved = store.get(&account.id).await.unwrap().unwrap();
        assert_eq!(saved.access_token.expose_secret(), "fresh-1");
        assert!(!saved.needs_refresh(chrono::Duration::minutes(5), Timestamp::now()));
    }

    #[tokio::test]
    async fn second_call_within_buffer_reuses_refreshed_token() {
        let account = account_expiring_in(Platform::Linkedin, -5);
        let (refresher, store, oauth) = setup(account.clone(), MockOAuthClient::ok()).await;

        refresher.ensure_valid_token(&account).await.unwrap();
        // Caller still holds the stale copy; the store has the fresh one.
        let token = refresher.ensure_valid_token(&account).await.unwrap();

        assert_eq!(token.expose_secret(), "fresh-1");
        assert_eq!(oauth.calls(), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let account = account_expiring_in(Platform::Instagram, -1);
        let (refresher, _, oauth) =
            setup(account.clone(), MockOAuthClient::slow(Duration::from_millis(50))).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let refresher = refresher.clone();
                let account = account.clone();
                tokio::spawn(async move { refresher.ensure_valid_token(&account).await })
            })
            .collect();

        for task in tasks {
            let token = task.await.unwrap().unwrap();
            assert_eq!(token.expose_secret(), "fresh-1");
        }
        assert_eq!(oauth.calls(), 1);
        assert_eq!(refresher.tracked_locks(), 0);
    }

    #[tokio::test]
    async fn huge_expires_in_is_capped_and_lock_released() {
        let account = account_expiring_in(Platform::Facebook, -1);
        let oauth = MockOAuthClient {
            expires_in_secs: u64::MAX,
            ..MockOAuthClient::ok()
        };
        let (refresher, store, oauth) = setup(account.clone(), oauth).await;

        refresher.ensure_valid_token(&account).await.unwrap();
        let token = refresher.ensure_valid_token(&account).await.unwrap();

        assert_eq!(token.expose_secret(), "fresh-1");
        assert_eq!(oauth.calls(), 1);
        assert_eq!(refresher.tracked_locks(), 0);
        let saved = store.get(&account.id).await.unwrap().unwrap();
        assert!(saved.token_expires_at.unwrap().is_after(&Timestamp::now()));
    }

    #[tokio::test]
    async fn missing_refresh_token_is_configuration_error() {
        let mut account = account_expiring_in(Platform::Facebook, -1);
        account.refresh_token = None;
        let (refresher, _, oauth) = setup(account.clone(), MockOAuthClient::ok()).await;

        let err = refresher.ensure_valid_token(&account).await.unwrap_err();

        assert!(matches!(err, PublishError::MissingRefreshToken(id) if id == account.id));
        assert_eq!(err.kind(), FailureKind::Configuration);
        assert_eq!(oauth.calls(), 0);
    }

    #[tokio::test]
    async fn rejected_grant_is_auth_failure_with_body() {
        let account = account_expiring_in(Platform::Youtube, -1);
        let oauth = MockOAuthClient::failing(TokenEndpointError::Rejected {
            status: 400,
            body: "{\"error\":\"invalid_grant\"}".to_string(),
        });
        let (refresher, store, _) = setup(account.clone(), oauth).await;

        let err = refresher.ensure_valid_token(&account).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::Auth);
        assert!(err.to_string().contains("invalid_grant"));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn hung_endpoint_times_out_as_transient() {
        let account = account_expiring_in(Platform::Youtube, -1);
        let oauth = MockOAuthClient::slow(Duration::from_secs(5));
        let (refresher, _, _) = setup(account.clone(), oauth).await;
        let refresher = Arc::try_unwrap(refresher)
            .ok()
            .unwrap()
            .with_refresh_timeout(Duration::from_millis(20));

        let err = refresher.ensure_valid_token(&account).await.unwrap_err();

        assert!(matches!(err, PublishError::RefreshFailed { .. }));
        assert_eq!(err.kind(), FailureKind::TransientNetwork);
    }

    #[tokio::test]
    async fn unknown_expiry_triggers_refresh() {
        let mut account = account_expiring_in(Platform::Youtube, 60);
        account.token_expires_at = None;
        let (refresher, _, oauth) = setup(account.clone(), MockOAuthClient::ok()).await;

        refresher.ensure_valid_token(&account).await.unwrap();

        assert_eq!(oauth.calls(), 1);
    }
}
