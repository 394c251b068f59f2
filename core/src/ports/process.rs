//! Process control port (interface).

use crate::domain::{ProcessRecord, SelfIdentity};
use crate::error::{KillError, Result};

/// Port for listing and signalling OS processes.
///
/// This trait is the whole platform surface the lifecycle controller needs.
/// One implementation exists per supported platform; tests substitute a
/// scripted one.
pub trait ProcessControlPort: Send + Sync {
    /// Snapshot every running process.
    ///
    /// Fails with `Error::Enumeration` when the OS facility cannot be used and
    /// with `Error::UnsupportedPlatform` when there is no facility at all.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<ProcessRecord>>> + Send;

    /// Ask a process to exit (SIGTERM, plain `taskkill`).
    ///
    /// Returns `KillError::ProcessNotFound` if the process is already gone.
    fn terminate_gracefully(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = std::result::Result<(), KillError>> + Send;

    /// Kill a process unconditionally (SIGKILL, `taskkill /F`).
    ///
    /// Returns `KillError::ProcessNotFound` if the process is already gone.
    fn terminate_forcefully(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = std::result::Result<(), KillError>> + Send;

    /// Check if a process is still running.
    fn is_alive(&self, pid: u32) -> impl std::future::Future<Output = bool> + Send;

    /// Identity of the calling process.
    fn self_identity(&self) -> SelfIdentity;
}
