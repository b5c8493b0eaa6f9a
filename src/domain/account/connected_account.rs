//! ConnectedAccount - a user's OAuth credential set for one platform.
//!
//! Owned by the accounts service; this crate reads it and, through the
//! token refresher only, rewrites the token pair.

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{ConnectedAccountId, Timestamp, UserId};
use crate::domain::publishing::Platform;

/// Longest token lifetime accepted from a provider. Larger `expires_in`
/// values are capped to this.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 366 * 24 * 60 * 60;

/// Stored credentials and platform identifiers for one account.
///
/// Tokens are held as `SecretString` so they never appear in `Debug`
/// output or logs.
#[derive(Debug, Clone)]
pub struct ConnectedAccount {
    pub id: ConnectedAccountId,
    pub user_id: UserId,
    pub platform: Platform,

    /// Platform-side identity the post is made as: YouTube channel id,
    /// LinkedIn author URN, Instagram business user id, Facebook page id.
    pub external_account_id: String,

    pub display_name: Option<String>,
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,

    /// `None` means the expiry is unknown; treated as expired.
    pub token_expires_at: Option<Timestamp>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ConnectedAccount {
    /// True when the access token expires within `buffer` of `now` (or
    /// has no known expiry).
    pub fn needs_refresh(&self, buffer: Duration, now: Timestamp) -> bool {
        match self.token_expires_at {
            Some(expires_at) => {
                let horizon = Timestamp::from_datetime(*now.as_datetime() + buffer);
                !expires_at.is_after(&horizon)
            }
            None => true,
        }
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token
            .as_ref()
            .map(|t| !t.expose_secret().is_empty())
            .unwrap_or(false)
    }

    /// Stores a freshly issued token pair.
    ///
    /// The refresh token is only replaced when the provider rotated it.
    /// Lifetimes above `MAX_TOKEN_LIFETIME_SECS` are capped.
    pub fn apply_token_grant(
        &mut self,
        access_token: SecretString,
        expires_in_secs: u64,
        rotated_refresh_token: Option<SecretString>,
        now: Timestamp,
    ) {
        self.access_token = access_token;
        let lifetime = expires_in_secs.min(MAX_TOKEN_LIFETIME_SECS) as i64;
        self.token_expires_at = Some(now.plus_secs(lifetime));
        if let Some(refresh) = rotated_refresh_token {
            self.refresh_token = Some(refresh);
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Account whose token expires `expires_in_minutes` from now.
    pub fn account_expiring_in(platform: Platform, expires_in_minutes: i64) -> ConnectedAccount {
        let now = Timestamp::now();
        ConnectedAccount {
            id: ConnectedAccountId::new(),
            user_id: UserId::new("user-1").unwrap(),
            platform,
            external_account_id: "ext-1".to_string(),
            display_name: Some("Test Account".to_string()),
            access_token: SecretString::new("old-access".to_string()),
            refresh_token: Some(SecretString::new("refresh-1".to_string())),
            token_expires_at: Some(now.plus_minutes(expires_in_minutes)),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::account_expiring_in;
    use super::*;

    #[test]
    fn token_far_from_expiry_is_reused() {
        let account = account_expiring_in(Platform::Youtube, 60);
        assert!(!account.needs_refresh(Duration::minutes(5), Timestamp::now()));
    }

    #[test]
    fn token_inside_buffer_needs_refresh() {
        let account = account_expiring_in(Platform::Youtube, 4);
        assert!(account.needs_refresh(Duration::minutes(5), Timestamp::now()));
    }

    #[test]
    fn expired_token_needs_refresh() {
        let account = account_expiring_in(Platform::Youtube, -10);
        assert!(account.needs_refresh(Duration::minutes(5), Timestamp::now()));
    }

    #[test]
    fn unknown_expiry_needs_refresh() {
        let mut account = account_expiring_in(Platform::Linkedin, 60);
        account.token_expires_at = None;
        assert!(account.needs_refresh(Duration::minutes(5), Timestamp::now()));
    }

    #[test]
    fn blank_refresh_token_counts_as_missing() {
        let mut account = account_expiring_in(Platform::Facebook, 60);
        account.refresh_token = Some(SecretString::new(String::new()));
        assert!(!account.has_refresh_token());
        account.refresh_token = None;
        assert!(!account.has_refresh_token());
    }

    #[test]
    fn apply_token_grant_updates_pair() {
        let mut account = account_expiring_in(Platform::Youtube, -1);
        let now = Timestamp::now();

        account.apply_token_grant(SecretString::new("new-access".to_string()), 3600, None, now);

        assert_eq!(account.access_token.expose_secret(), "new-access");
        assert_eq!(account.token_expires_at, Some(now.plus_secs(3600)));
        assert_eq!(
            account.refresh_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("refresh-1")
        );
    }

    #[test]
    fn apply_token_grant_rotates_refresh_token() {
        let mut account = account_expiring_in(Platform::Linkedin, -1);

        account.apply_token_grant(
            SecretString::new("a".to_string()),
            60,
            Some(SecretString::new("refresh-2".to_string())),
            Timestamp::now(),
        );

        assert_eq!(
            account.refresh_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("refresh-2")
        );
    }

    #[test]
    fn oversized_lifetime_is_capped() {
        let now = Timestamp::now();
        for expires_in in [10_000_000_000_000, u64::MAX] {
            let mut account = account_expiring_in(Platform::Facebook, -1);

            account.apply_token_grant(SecretString::new("a".to_string()), expires_in, None, now);

            let expires_at = account.token_expires_at.unwrap();
            assert!(expires_at.is_after(&now));
            assert_eq!(expires_at, now.plus_secs(MAX_TOKEN_LIFETIME_SECS as i64));
        }
    }

    #[test]
    fn debug_output_hides_tokens() {
        let account = account_expiring_in(Platform::Youtube, 60);
        let debug = format!("{:?}", account);
        assert!(!debug.contains("old-access"));
        assert!(!debug.contains("refresh-1"));
    }
}
