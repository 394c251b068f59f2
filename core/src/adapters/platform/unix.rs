//! Unix (Linux, macOS) process control.
//!
//! Uses the following facilities:
//! - `ps -A -ww -o pid=,comm=` and `ps -A -ww -o pid=,args=` to list processes
//! - `kill(2)` with SIGTERM for graceful termination
//! - `kill(2)` with SIGKILL for forced termination
//! - `kill(2)` with no signal to check if a process exists

use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tracing::{debug, warn};

use super::command::output_with_timeout;
use super::parse::merge_unix_listing;
use crate::domain::{ProcessRecord, SelfIdentity};
use crate::error::{Error, KillError, Result};
use crate::ports::ProcessControlPort;

const PS_PATH: &str = "/bin/ps";

/// Unix process control using `ps` and POSIX signals.
#[derive(Debug, Clone)]
pub struct UnixProcessControl {
    command_timeout: Duration,
}

impl UnixProcessControl {
    /// Create a new Unix process control with the given OS call timeout.
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }

    async fn ps_column(&self, column: &str) -> Result<String> {
        let mut cmd = Command::new(PS_PATH);
        cmd.args(["-A", "-ww", "-o", &format!("pid=,{}=", column)]);

        let output = output_with_timeout(&mut cmd, self.command_timeout)
            .await
            .map_err(|e| Error::Enumeration(format!("Failed to run ps: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Enumeration(format!(
                "ps exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Send a signal to a process.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Signal delivered
    /// * `Err(KillError::ProcessNotFound)` - No such process
    /// * `Err(KillError)` - Signal could not be delivered
    fn send_signal(&self, pid: u32, signal: Signal) -> std::result::Result<(), KillError> {
        let target = to_nix_pid(pid)?;
        debug!(pid = pid, signal = ?signal, "Sending signal to process");

        match kill(target, signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                debug!(pid = pid, "Process not found");
                Err(KillError::ProcessNotFound(pid))
            }
            Err(Errno::EPERM) => {
                warn!(pid = pid, "Permission denied to signal process");
                Err(KillError::PermissionDenied(pid))
            }
            Err(e) => Err(KillError::CommandFailed(format!(
                "kill -{:?} {} failed: {}",
                signal, pid, e
            ))),
        }
    }
}

/// PID 0 and anything above `i32::MAX` would address process groups.
fn to_nix_pid(pid: u32) -> std::result::Result<Pid, KillError> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(Pid::from_raw(raw)),
        _ => Err(KillError::CommandFailed(format!(
            "refusing to signal invalid PID {}",
            pid
        ))),
    }
}

impl Default for UnixProcessControl {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ProcessControlPort for UnixProcessControl {
    async fn list(&self) -> Result<Vec<ProcessRecord>> {
        let names = self.ps_column("comm").await?;

        // The args listing only enriches records; losing it is not fatal.
        let commands = match self.ps_column("args").await {
            Ok(commands) => commands,
            Err(e) => {
                warn!(error = %e, "Failed to list command lines, using image names");
                String::new()
            }
        };

        let records = merge_unix_listing(&names, &commands);
        debug!(count = records.len(), "Listed processes");
        Ok(records)
    }

    async fn terminate_gracefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        self.send_signal(pid, Signal::SIGTERM)
    }

    async fn terminate_forcefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        self.send_signal(pid, Signal::SIGKILL)
    }

    async fn is_alive(&self, pid: u32) -> bool {
        let Ok(target) = to_nix_pid(pid) else {
            return false;
        };

        // EPERM means the process exists but belongs to someone else
        let alive = match kill(target, None::<Signal>) {
            Ok(()) | Err(Errno::EPERM) => true,
            Err(_) => false,
        };
        debug!(pid = pid, alive = alive, "Process liveness check");
        alive
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
        let control = UnixProcessControl::default();
        assert!(control.is_alive(std::process::id()).await);
    }

    #[tokio::test]
    async fn test_is_alive_nonexistent() {
        let control = UnixProcessControl::default();
        // Above the default pid_max on Linux and macOS
        assert!(!control.is_alive(99_999_999).await);
    }

    #[tokio::test]
    async fn test_invalid_pids_are_never_signalled() {
        let control = UnixProcessControl::default();
        assert!(matches!(
            control.terminate_forcefully(0).await,
            Err(KillError::CommandFailed(_))
        ));
        assert!(matches!(
            control.terminate_gracefully(u32::MAX).await,
            Err(KillError::CommandFailed(_))
        ));
        assert!(!control.is_alive(0).await);
    }

    #[tokio::test]
    async fn test_kill_nonexistent_process() {
        let control = UnixProcessControl::default();
        let result = control.terminate_forcefully(99_999_999).await;
        assert!(matches!(result, Err(KillError::ProcessNotFound(_))));
    }

    #[tokio::test]
    async fn test_terminate_child_process() {
        let mut child = tokio::process::Command::new("/bin/sleep")
            .arg("30")
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();

        let control = UnixProcessControl::default();
        control.terminate_gracefully(pid).await.unwrap();

        let status = child.wait().await.unwrap();
        assert!(!status.success());
        assert!(!control.is_alive(pid).await);
    }
}
