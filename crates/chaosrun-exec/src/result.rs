//! Request and outcome types for remote execution

use serde::{Serialize, Serializer};

use crate::error::ActivityFailed;

/// One command to run on one remote host
///
/// Fields are passed to `ssh` as-is. `command` is executed verbatim by the
/// remote shell and is never escaped, so it must not be built from
/// untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRequest {
    /// Hostname or IP address
    pub host: String,
    /// Remote login name
    pub username: String,
    /// Path to the private key handed to `ssh -i`
    pub key_path: String,
    /// Shell command run on the remote host
    pub command: String,
}

impl ExecutionRequest {
    /// Create a new request
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        key_path: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            key_path: key_path.into(),
            command: command.into(),
        }
    }

    /// Connection target in `username@host` form
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

/// Terminal state of one remote execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Exit status zero; holds stdout verbatim
    Success(String),
    /// Still running when the local wait window closed
    ///
    /// Expected for long-running stress workloads; not an error.
    TimedOut,
    /// Non-zero exit or local execution failure
    Failed(ActivityFailed),
}

impl ExecutionOutcome {
    /// Check if outcome is a failure
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, ExecutionOutcome::Failed(_))
    }

    /// Captured stdout, only present on success
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Success(output) => Some(output),
            _ => None,
        }
    }

    /// Collapse into the orchestrator contract
    ///
    /// `Success` yields its output, `TimedOut` yields nothing, and `Failed`
    /// is raised as the error.
    ///
    /// # Errors
    /// Returns the [`ActivityFailed`] carried by a `Failed` outcome
    pub fn into_result(self) -> Result<Option<String>, ActivityFailed> {
        match self {
            ExecutionOutcome::Success(output) => Ok(Some(output)),
            ExecutionOutcome::TimedOut => Ok(None),
            ExecutionOutcome::Failed(err) => Err(err),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum OutcomeRecord<'a> {
    Success { output: &'a str },
    TimedOut,
    Failed { reason: String, remote: bool },
}

impl Serialize for ExecutionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = match self {
            ExecutionOutcome::Success(output) => OutcomeRecord::Success { output },
            ExecutionOutcome::TimedOut => OutcomeRecord::TimedOut,
            ExecutionOutcome::Failed(err) => OutcomeRecord::Failed {
                reason: err.to_string(),
                remote: err.is_remote(),
            },
        };
        record.serialize(serializer)
    }
}
