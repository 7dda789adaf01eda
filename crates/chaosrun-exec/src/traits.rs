//! Runner and logging seams

use async_trait::async_trait;

use crate::result::{ExecutionOutcome, ExecutionRequest};

/// Executes a command on a remote host
///
/// Implementations never return an error directly: every failure is folded
/// into [`ExecutionOutcome::Failed`].
#[async_trait]
pub trait RemoteRunner: Send + Sync {
    /// Run the request to completion, timeout, or failure
    async fn run(&self, request: &ExecutionRequest) -> ExecutionOutcome;

    /// Short name of the runner implementation
    fn runner_type(&self) -> &'static str;
}

/// Logging collaborator for activity progress
pub trait ActivityLog: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}
