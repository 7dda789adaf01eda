//! Error types for chaosrun-exec

use thiserror::Error;

/// Failure of a remote activity, reported to the chaos orchestrator
///
/// All failure paths collapse into this one kind. A timeout is not a
/// failure and never produces this error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivityFailed {
    /// The SSH client exited non-zero
    #[error("SSH execution failed: {stderr}")]
    RemoteCommand {
        /// Exit status code (-1 when terminated by a signal)
        status: i32,
        /// Captured stderr of the SSH client
        stderr: String,
    },

    /// The SSH client could not be started
    #[error("SSH operation failed: {0}")]
    Spawn(String),

    /// Communicating with or waiting on the SSH client failed
    #[error("SSH operation failed: {0}")]
    Io(String),
}

impl ActivityFailed {
    /// Whether the failure came from the remote side rather than the local client
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, ActivityFailed::RemoteCommand { .. })
    }
}
