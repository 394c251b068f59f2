//! Process snapshot domain models.

use serde::{Deserialize, Serialize};

// ============================================================================
// ProcessRecord
// ============================================================================

/// One running process as seen by a single listing pass.
///
/// Records are snapshots: they are produced fresh by every listing and say
/// nothing about whether the process is still alive afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    /// Process ID.
    pub pid: u32,
    /// Image name (executable file name, without directories).
    pub name: String,
    /// Full command line, or the image name when the platform has none.
    pub command: String,
}

impl ProcessRecord {
    /// Create a new process record.
    pub fn new(pid: u32, name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            command: command.into(),
        }
    }
}

impl std::fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (pid {})", self.name, self.pid)
    }
}

// ============================================================================
// SelfIdentity
// ============================================================================

/// Identity of the controlling process, which must never be terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfIdentity {
    /// Our own process ID.
    pub pid: u32,
    /// Our own executable name, if it could be determined.
    pub name: Option<String>,
}

impl SelfIdentity {
    /// Identity of the current process.
    pub fn current() -> Self {
        let name = std::env::current_exe()
            .ok()
            .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()));

        Self {
            pid: std::process::id(),
            name,
        }
    }

    /// Identity with an explicit PID and no name.
    pub fn with_pid(pid: u32) -> Self {
        Self { pid, name: None }
    }
}
