//! Publishing error taxonomy.
//!
//! Every variant maps to a `FailureKind`, which decides whether a failed
//! execution may request a retry.

use thiserror::Error;

use crate::domain::foundation::{ConnectedAccountId, DomainError, PublishJobId};

use super::FailureKind;

/// Errors raised while creating or executing a publish job.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("Invalid publish request: {field} {message}")]
    InvalidRequest { field: String, message: String },

    #[error("Idempotency key '{key}' belongs to job {existing_job_id} of a different request")]
    IdempotencyConflict {
        key: String,
        existing_job_id: PublishJobId,
    },

    #[error("Connected account {0} not found")]
    AccountNotFound(ConnectedAccountId),

    #[error("Connected account {0} has no refresh token stored")]
    MissingRefreshToken(ConnectedAccountId),

    #[error("Token refresh failed for account {account_id}: {body}")]
    RefreshFailed {
        account_id: ConnectedAccountId,
        kind: FailureKind,
        body: String,
    },

    #[error("No publisher registered for platform '{0}'")]
    UnknownPlatform(String),

    #[error("Platform call failed: {message}")]
    Platform { kind: FailureKind, message: String },

    #[error("Persistence failure: {0}")]
    Repository(DomainError),

    #[error("Event publishing failed: {0}")]
    EventPublish(DomainError),
}

impl PublishError {
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        PublishError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classification used for the retry decision and message tagging.
    pub fn kind(&self) -> FailureKind {
        match self {
            PublishError::InvalidRequest { .. }
            | PublishError::IdempotencyConflict { .. }
            | PublishError::AccountNotFound(_)
            | PublishError::MissingRefreshToken(_)
            | PublishError::UnknownPlatform(_) => FailureKind::Configuration,
            PublishError::RefreshFailed { kind, .. } => *kind,
            PublishError::Platform { kind, .. } => *kind,
            PublishError::Repository(_) | PublishError::EventPublish(_) => {
                FailureKind::TransientNetwork
            }
        }
    }

    /// Message with its `[KIND]` tag, as persisted and emitted.
    pub fn tagged_message(&self) -> String {
        self.kind().tag_message(&self.to_string())
    }
}

impl From<DomainError> for PublishError {
    fn from(err: DomainError) -> Self {
        PublishError::Repository(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_fatal() {
        let errors = [
            PublishError::UnknownPlatform("MYSPACE".to_string()),
            PublishError::MissingRefreshToken(ConnectedAccountId::new()),
            PublishError::AccountNotFound(ConnectedAccountId::new()),
            PublishError::invalid_request("platform", "must not be empty"),
        ];
        for err in errors {
            assert_eq!(err.kind(), FailureKind::Configuration);
            assert!(!err.kind().is_retryable());
        }
    }

    #[test]
    fn refresh_failure_keeps_upstream_kind() {
        let err = PublishError::RefreshFailed {
            account_id: ConnectedAccountId::new(),
            kind: FailureKind::Auth,
            body: "{\"error\":\"invalid_grant\"}".to_string(),
        };
        assert_eq!(err.kind(), FailureKind::Auth);
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[test]
    fn tagged_message_carries_kind() {
        let err = PublishError::UnknownPlatform("MYSPACE".to_string());
        assert_eq!(
            err.tagged_message(),
            "[CONFIGURATION] No publisher registered for platform 'MYSPACE'"
        );
    }

    #[test]
    fn repository_errors_are_transient() {
        let err: PublishError = DomainError::database("connection reset").into();
        assert_eq!(err.kind(), FailureKind::TransientNetwork);
    }
}
