//! Results of terminating processes and of a whole stop run.

use serde::{Deserialize, Serialize};

use super::ProcessRecord;

/// What happened when one process was asked to terminate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "cause", rename_all = "camelCase")]
pub enum TerminationOutcome {
    /// The process exited after the graceful request.
    GracefulSuccess,
    /// The process had to be killed forcefully.
    ForcedSuccess,
    /// The process could not be terminated.
    Failed(String),
}

impl TerminationOutcome {
    /// Whether the process is known to be gone.
    pub fn is_success(&self) -> bool {
        !matches!(self, TerminationOutcome::Failed(_))
    }
}

/// A termination outcome tied to the process it was aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Termination {
    /// 1-based attempt in which the termination was issued.
    pub attempt: u32,
    pub process: ProcessRecord,
    pub outcome: TerminationOutcome,
}

/// Non-error result of stopping (or waiting for) the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum StopOutcome {
    /// No matching process is running.
    #[serde(rename_all = "camelCase")]
    Stopped {
        /// Attempts that found matches; 0 when nothing was running.
        attempts: u32,
        /// Every termination issued during the run, failures included.
        terminations: Vec<Termination>,
    },
    /// The caller cancelled the run before it finished.
    #[serde(rename_all = "camelCase")]
    Cancelled {
        attempts: u32,
        terminations: Vec<Termination>,
    },
}

impl StopOutcome {
    /// Whether the application is confirmed stopped.
    pub fn is_stopped(&self) -> bool {
        matches!(self, StopOutcome::Stopped { .. })
    }

    /// Attempts that found matching processes.
    pub fn attempts(&self) -> u32 {
        match self {
            StopOutcome::Stopped { attempts, .. } | StopOutcome::Cancelled { attempts, .. } => {
                *attempts
            }
        }
    }

    /// Terminations issued during the run.
    pub fn terminations(&self) -> &[Termination] {
        match self {
            StopOutcome::Stopped { terminations, .. }
            | StopOutcome::Cancelled { terminations, .. } => terminations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success() {
        assert!(TerminationOutcome::GracefulSuccess.is_success());
        assert!(TerminationOutcome::ForcedSuccess.is_success());
        assert!(!TerminationOutcome::Failed("denied".into()).is_success());
    }

    #[test]
    fn test_stop_outcome_json_shape() {
        let outcome = StopOutcome::Stopped {
            attempts: 1,
            terminations: vec![Termination {
                attempt: 1,
                process: ProcessRecord::new(9, "cursor", "cursor"),
                outcome: TerminationOutcome::Failed("Permission denied".into()),
            }],
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "stopped");
        assert_eq!(json["attempts"], 1);
        assert_eq!(json["terminations"][0]["outcome"]["status"], "failed");
        assert_eq!(json["terminations"][0]["outcome"]["cause"], "Permission denied");
    }
}
