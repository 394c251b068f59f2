//! Process control adapters.
//!
//! Platform-specific implementations of process listing and termination.

mod command;
pub mod parse;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(not(any(unix, windows)))]
mod unsupported;

use std::time::Duration;

use crate::domain::{ProcessRecord, SelfIdentity};
use crate::error::{KillError, Result};
use crate::ports::ProcessControlPort;

#[cfg(unix)]
pub use unix::UnixProcessControl;

#[cfg(windows)]
pub use windows::WindowsProcessControl;

/// Default bound on a single OS utility call.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// The process control for the platform this binary was built for.
pub struct PlatformProcessControl {
    #[cfg(unix)]
    inner: unix::UnixProcessControl,

    #[cfg(windows)]
    inner: windows::WindowsProcessControl,

    #[cfg(not(any(unix, windows)))]
    inner: unsupported::UnsupportedProcessControl,
}

impl PlatformProcessControl {
    /// Create process control for the current platform with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_COMMAND_TIMEOUT)
    }

    /// Create process control whose OS calls give up after `command_timeout`.
    pub fn with_timeout(command_timeout: Duration) -> Self {
        Self {
            #[cfg(unix)]
            inner: unix::UnixProcessControl::new(command_timeout),

            #[cfg(windows)]
            inner: windows::WindowsProcessControl::new(command_timeout),

            #[cfg(not(any(unix, windows)))]
            inner: unsupported::UnsupportedProcessControl::new(command_timeout),
        }
    }
}

impl Default for PlatformProcessControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessControlPort for PlatformProcessControl {
    async fn list(&self) -> Result<Vec<ProcessRecord>> {
        self.inner.list().await
    }

    async fn terminate_gracefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        self.inner.terminate_gracefully(pid).await
    }

    async fn terminate_forcefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        self.inner.terminate_forcefully(pid).await
    }

    async fn is_alive(&self, pid: u32) -> bool {
        self.inner.is_alive(pid).await
    }

    fn self_identity(&self) -> SelfIdentity {
        self.inner.self_identity()
    }
}
