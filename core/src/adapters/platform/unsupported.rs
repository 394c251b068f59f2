//! Fallback for platforms without a process control implementation.
//!
//! Every operation fails immediately instead of pretending nothing is running.

use std::time::Duration;

use crate::domain::{ProcessRecord, SelfIdentity};
use crate::error::{Error, KillError, Result};
use crate::ports::ProcessControlPort;

pub struct UnsupportedProcessControl;

impl UnsupportedProcessControl {
    pub fn new(_command_timeout: Duration) -> Self {
        Self
    }

    fn platform() -> String {
        std::env::consts::OS.to_string()
    }
}

impl ProcessControlPort for UnsupportedProcessControl {
    async fn list(&self) -> Result<Vec<ProcessRecord>> {
        Err(Error::UnsupportedPlatform(Self::platform()))
    }

    async fn terminate_gracefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        Err(KillError::CommandFailed(format!(
            "cannot terminate process {} on {}",
            pid,
            Self::platform()
        )))
    }

    async fn terminate_forcefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        self.terminate_gracefully(pid).await
    }

    async fn is_alive(&self, _pid: u32) -> bool {
        true
    }

    fn self_identity(&self) -> SelfIdentity {
        SelfIdentity::current()
    }
}
