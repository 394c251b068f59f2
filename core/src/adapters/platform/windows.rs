//! Windows process control.
//!
//! Uses the following system commands:
//! - `tasklist /FO CSV /NH` to list processes
//! - `taskkill /PID xxx` for graceful termination
//! - `taskkill /PID xxx /F` for forced termination
//! - `tasklist /FI "PID eq xxx" /FO CSV /NH` to check if a process is running

use std::io;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use super::command::output_with_timeout;
use super::parse::{parse_tasklist_csv, tasklist_reports_alive};
use crate::domain::{ProcessRecord, SelfIdentity};
use crate::error::{Error, KillError, Result};
use crate::ports::ProcessControlPort;

/// Windows process control using `tasklist` and `taskkill`.
///
/// - `taskkill /PID xxx`: Request graceful termination (sends WM_CLOSE)
/// - `taskkill /PID xxx /F`: Force termination (TerminateProcess)
#[derive(Debug, Clone)]
pub struct WindowsProcessControl {
    command_timeout: Duration,
}

impl WindowsProcessControl {
    /// Create a new Windows process control with the given OS call timeout.
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }

    /// Terminate a process using taskkill
    ///
    /// # Arguments
    ///
    /// * `pid` - The process ID
    /// * `force` - Whether to use /F flag for forced termination
    async fn taskkill(&self, pid: u32, force: bool) -> std::result::Result<(), KillError> {
        debug!(pid = pid, force = force, "Executing taskkill");

        let mut cmd = Command::new("taskkill");
        cmd.arg("/PID").arg(pid.to_string());

        if force {
            cmd.arg("/F");
        }

        let output = output_with_timeout(&mut cmd, self.command_timeout)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::TimedOut => KillError::Timeout(pid),
                _ => KillError::IoError(e),
            })?;

        if output.status.success() {
            debug!(pid = pid, force = force, "taskkill succeeded");
            return Ok(());
        }

        // Check stderr and stdout for common error conditions
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let combined = format!("{} {}", stdout, stderr);

        if combined.contains("not found") || combined.contains("could not be found") {
            debug!(pid = pid, "Process not found");
            return Err(KillError::ProcessNotFound(pid));
        }

        // "The process has already been terminated" means it is gone
        if combined.contains("already been terminated") || combined.contains("has exited") {
            debug!(pid = pid, "Process already terminated");
            return Err(KillError::ProcessNotFound(pid));
        }

        if combined.contains("Access is denied") || combined.contains("access denied") {
            warn!(pid = pid, "Access denied to kill process");
            return Err(KillError::PermissionDenied(pid));
        }

        Err(KillError::CommandFailed(format!(
            "taskkill /PID {} {} failed: {}",
            pid,
            if force { "/F" } else { "" },
            combined.trim()
        )))
    }
}

impl Default for WindowsProcessControl {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ProcessControlPort for WindowsProcessControl {
    async fn list(&self) -> Result<Vec<ProcessRecord>> {
        let mut cmd = Command::new("tasklist");
        cmd.args(["/FO", "CSV", "/NH"]);

        let output = output_with_timeout(&mut cmd, self.command_timeout)
            .await
            .map_err(|e| Error::Enumeration(format!("Failed to run tasklist: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Enumeration(format!(
                "tasklist exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let records = parse_tasklist_csv(&stdout);
        debug!(count = records.len(), "Listed processes");
        Ok(records)
    }

    async fn terminate_gracefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        self.taskkill(pid, false).await
    }

    async fn terminate_forcefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        self.taskkill(pid, true).await
    }

    async fn is_alive(&self, pid: u32) -> bool {
        let mut cmd = Command::new("tasklist");
        cmd.args(["/FI", &format!("PID eq {}", pid), "/FO", "CSV", "/NH"]);

        match output_with_timeout(&mut cmd, self.command_timeout).await {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(pid = pid, status = %output.status, stderr = %stderr.trim(), "tasklist failed while checking process");
                }
                let running = tasklist_reports_alive(output.status.success(), &stdout, pid);
                debug!(pid = pid, running = running, "Process running check");
                running
            }
            Err(e) => {
                // Unknown state: report alive so the caller escalates
                warn!(pid = pid, error = %e, "Failed to check if process is running");
                true
            }
        }
    }

    fn self_identity(&self) -> SelfIdentity {
        SelfIdentity::current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_is_alive_current_process() {
        let control = WindowsProcessControl::default();
        assert!(control.is_alive(std::process::id()).await);
    }

    #[tokio::test]
    async fn test_list_includes_current_process() {
        let control = WindowsProcessControl::default();
        let records = control.list().await.unwrap();
        assert!(records.iter().any(|r| r.pid == std::process::id()));
    }

    #[tokio::test]
    async fn test_kill_nonexistent_process() {
        let control = WindowsProcessControl::default();
        let fake_pid = 999999999;

        match control.terminate_forcefully(fake_pid).await {
            Err(KillError::ProcessNotFound(_)) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }
}
