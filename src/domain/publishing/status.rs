//! Publish job status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a publish job.
///
/// `Pending` is the initial and only non-terminal state. A job row never
/// returns to `Pending`; a retry is a new execution, see
/// `PublishRetryRequestedEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishJobStatus {
    /// Created, awaiting the outcome of its execution.
    Pending,

    /// The platform accepted the content.
    Success,

    /// The execution failed; see `last_error_message`.
    Failed,
}

impl PublishJobStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishJobStatus::Pending => "PENDING",
            PublishJobStatus::Success => "SUCCESS",
            PublishJobStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for PublishJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublishJobStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PublishJobStatus::Pending),
            "SUCCESS" => Ok(PublishJobStatus::Success),
            "FAILED" => Ok(PublishJobStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown publish job status '{}'", other),
            )),
        }
    }
}

impl StateMachine for PublishJobStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PublishJobStatus::*;
        matches!((self, target), (Pending, Success) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PublishJobStatus::*;
        match self {
            Pending => vec![Success, Failed],
            Success => vec![],
            Failed => vec![],
        }
    }
}
