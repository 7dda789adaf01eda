//! chaosrun-exec: SSH command execution for chaos experiments
//!
//! Shells out to the system `ssh` client to run one command on one remote
//! host, bounded by a wall-clock timeout, and classifies the result as
//! success, benign timeout, or [`ActivityFailed`].

pub mod error;
pub mod log;
pub mod result;
pub mod ssh;
pub mod stress;
pub mod traits;

pub use error::ActivityFailed;
pub use log::TracingLog;
pub use result::{ExecutionOutcome, ExecutionRequest};
pub use ssh::{SshRunner, SshRunnerConfig, run_remote};
pub use stress::StressNg;
pub use traits::{ActivityLog, RemoteRunner};
