//! Error types for the appkiller-core library.

use thiserror::Error;

use crate::domain::ProcessRecord;

/// Result type alias for appkiller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while finding and stopping application processes.
#[derive(Error, Debug)]
pub enum Error {
    /// The running platform has no process control implementation.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),

    /// The process listing could not be produced (missing tool, permission, timeout).
    #[error("Failed to enumerate processes: {0}")]
    Enumeration(String),

    /// Matching processes survived every termination round.
    #[error(
        "Application still running after {attempts} attempt(s): {}",
        describe_records(remaining)
    )]
    StillRunning {
        attempts: u32,
        remaining: Vec<ProcessRecord>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error comes from the environment rather than from the
    /// application refusing to stop. Environment errors are never retried.
    pub fn is_environment(&self) -> bool {
        matches!(self, Error::UnsupportedPlatform(_) | Error::Enumeration(_))
    }
}

fn describe_records(records: &[ProcessRecord]) -> String {
    records
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while signalling a single process.
#[derive(Debug, Error)]
pub enum KillError {
    /// The specified process was not found
    #[error("Process with PID {0} not found")]
    ProcessNotFound(u32),

    /// Permission denied to kill the process
    #[error("Permission denied to kill process {0}")]
    PermissionDenied(u32),

    /// Failed to execute the kill command
    #[error("Failed to execute kill command: {0}")]
    CommandFailed(String),

    /// The kill command did not finish in time
    #[error("Kill command for process {0} timed out")]
    Timeout(u32),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
