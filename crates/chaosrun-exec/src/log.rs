//! Default activity log backed by `tracing`

use tracing::{error, info};

use crate::traits::ActivityLog;

/// Forwards activity messages to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ActivityLog for TracingLog {
    fn info(&self, message: &str) {
        info!(target: "chaosrun::activity", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "chaosrun::activity", "{message}");
    }
}
