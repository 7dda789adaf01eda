//! SSH command execution by shelling out to the system `ssh` client

use std::fmt;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, instrument};

use crate::error::ActivityFailed;
use crate::log::TracingLog;
use crate::result::{ExecutionOutcome, ExecutionRequest};
use crate::traits::{ActivityLog, RemoteRunner};

/// Default local wait window
///
/// Slightly longer than the usual remote stress duration, so a timeout is
/// the normal outcome of a stress run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40);

/// Default SSH client, resolved through `PATH`
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";

/// Configuration for [`SshRunner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshRunnerConfig {
    /// SSH client executable
    pub ssh_program: PathBuf,
    /// Wall-clock limit before the outcome becomes `TimedOut`
    pub timeout: Duration,
}

impl Default for SshRunnerConfig {
    fn default() -> Self {
        Self {
            ssh_program: PathBuf::from(DEFAULT_SSH_PROGRAM),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SshRunnerConfig {
    /// Set the SSH client executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.ssh_program = program.into();
        self
    }

    /// Set the wait window
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Build the `ssh` argument list for a request
///
/// Order is fixed: host-key check option, identity file, target, command.
/// Host-key verification is disabled so ephemeral hosts with unknown keys
/// are accepted without a prompt. The command is not escaped.
#[must_use]
pub fn ssh_args(request: &ExecutionRequest) -> Vec<String> {
    vec![
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-i".to_string(),
        request.key_path.clone(),
        request.target(),
        request.command.clone(),
    ]
}

/// Runs commands through the external `ssh` client
///
/// Each call spawns its own child process; the child is killed and reaped
/// when the call returns, including on timeout.
pub struct SshRunner {
    config: SshRunnerConfig,
    log: Arc<dyn ActivityLog>,
}

impl fmt::Debug for SshRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for SshRunner {
    fn default() -> Self {
        Self::new(SshRunnerConfig::default())
    }
}

impl SshRunner {
    /// Create a runner that logs through `tracing`
    #[must_use]
    pub fn new(config: SshRunnerConfig) -> Self {
        Self {
            config,
            log: Arc::new(TracingLog),
        }
    }

    /// Replace the activity log
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn ActivityLog>) -> Self {
        self.log = log;
        self
    }

    /// Get runner configuration
    pub fn config(&self) -> &SshRunnerConfig {
        &self.config
    }

    /// Spawn the client and collect its output
    async fn execute(&self, request: &ExecutionRequest) -> Result<Output, ActivityFailed> {
        let child = Command::new(&self.config.ssh_program)
            .args(ssh_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ActivityFailed::Spawn(e.to_string()))?;

        child
            .wait_with_output()
            .await
            .map_err(|e| ActivityFailed::Io(e.to_string()))
    }

    fn classify(&self, output: Output) -> ExecutionOutcome {
        if output.status.success() {
            // stdout must reach the caller unaltered, so no lossy decoding
            return match String::from_utf8(output.stdout) {
                Ok(stdout) => {
                    self.log.info(&format!("Output: {stdout}"));
                    ExecutionOutcome::Success(stdout)
                }
                Err(e) => {
                    let err = ActivityFailed::Io(format!("stdout is not valid UTF-8: {e}"));
                    self.log.error(&err.to_string());
                    ExecutionOutcome::Failed(err)
                }
            };
        }

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        self.log.error(&format!("SSH command failed: {stderr}"));
        ExecutionOutcome::Failed(ActivityFailed::RemoteCommand {
            status: output.status.code().unwrap_or(-1),
            stderr,
        })
    }
}

#[async_trait]
impl RemoteRunner for SshRunner {
    #[instrument(skip(self, request), fields(host = %request.host))]
    async fn run(&self, request: &ExecutionRequest) -> ExecutionOutcome {
        let start = Instant::now();

        self.log.info(&format!(
            "Connecting to {} to run: {}",
            request.host, request.command
        ));

        let outcome = match timeout(self.config.timeout, self.execute(request)).await {
            Ok(Ok(output)) => self.classify(output),
            Ok(Err(e)) => {
                self.log.error(&e.to_string());
                ExecutionOutcome::Failed(e)
            }
            Err(_) => {
                self.log.info("Command timed out as expected (stress workload ran)");
                ExecutionOutcome::TimedOut
            }
        };

        debug!(
            program = %self.config.ssh_program.display(),
            elapsed = ?start.elapsed(),
            failed = outcome.is_failed(),
            "ssh invocation finished"
        );

        outcome
    }

    fn runner_type(&self) -> &'static str {
        "ssh"
    }
}

/// Run one command with the default `ssh` client and wait window
///
/// Equivalent to `SshRunner::default().run(..)`.
pub async fn run_remote(
    host: &str,
    username: &str,
    key_path: &str,
    command: &str,
) -> ExecutionOutcome {
    let request = ExecutionRequest::new(host, username, key_path, command);
    SshRunner::default().run(&request).await
}
