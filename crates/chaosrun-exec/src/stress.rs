//! `stress-ng` command builder

use std::fmt::Write;
use std::time::Duration;

/// Builds a `stress-ng` invocation for the remote host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StressNg {
    cpu: Option<u32>,
    vm: Option<(u32, String)>,
    io: Option<u32>,
    timeout: Option<Duration>,
    use_sudo: bool,
}

impl StressNg {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU stressor workers
    #[must_use]
    pub fn cpu(mut self, workers: u32) -> Self {
        self.cpu = Some(workers);
        self
    }

    /// Virtual memory workers, each allocating `bytes` (e.g. `256M`, `80%`)
    #[must_use]
    pub fn vm(mut self, workers: u32, bytes: impl Into<String>) -> Self {
        self.vm = Some((workers, bytes.into()));
        self
    }

    /// I/O sync workers
    #[must_use]
    pub fn io(mut self, workers: u32) -> Self {
        self.io = Some(workers);
        self
    }

    /// Remote run time, rendered in whole seconds
    #[must_use]
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Prefix the command with sudo
    #[must_use]
    pub fn with_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    /// Render the shell command string
    #[must_use]
    pub fn to_command(&self) -> String {
        let mut cmd = if self.use_sudo {
            String::from("sudo stress-ng")
        } else {
            String::from("stress-ng")
        };

        // write! into a String cannot fail
        if let Some(n) = self.cpu {
            let _ = write!(cmd, " --cpu {n}");
        }
        if let Some((n, bytes)) = &self.vm {
            let _ = write!(cmd, " --vm {n} --vm-bytes {bytes}");
        }
        if let Some(n) = self.io {
            let _ = write!(cmd, " --io {n}");
        }
        if let Some(t) = self.timeout {
            let _ = write!(cmd, " --timeout {}s", t.as_secs());
        }

        cmd
    }
}
