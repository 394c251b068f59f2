//! Graceful-then-forceful termination of a single process.
//!
//! # Kill Pattern
//!
//! 1. Send SIGTERM (or plain taskkill on Windows) to request a clean exit
//! 2. Wait for the grace period (500ms by default)
//! 3. Check if the process is still running
//! 4. If still running, send SIGKILL (or taskkill /F on Windows)
//!
//! There are no retries here; the lifecycle controller owns retry policy.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::TerminationOutcome;
use crate::error::KillError;
use crate::ports::ProcessControlPort;

/// Grace period to wait between the graceful and forceful requests.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Issues the two-phase kill sequence against one PID.
#[derive(Debug, Clone, Copy)]
pub struct Terminator {
    grace_period: Duration,
}

impl Terminator {
    /// Create a terminator with the given grace period.
    pub fn new(grace_period: Duration) -> Self {
        Self { grace_period }
    }

    /// The configured grace period.
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Terminate `pid`, escalating to a forced kill if it outlives the grace period.
    ///
    /// A process that disappears at any point counts as terminated.
    pub async fn terminate<P: ProcessControlPort>(&self, platform: &P, pid: u32) -> TerminationOutcome {
        debug!(pid = pid, "Attempting graceful termination");

        match platform.terminate_gracefully(pid).await {
            Ok(()) => {
                debug!(pid = pid, "Graceful request sent, waiting for process to exit");
            }
            Err(KillError::ProcessNotFound(_)) => {
                debug!(pid = pid, "Process not found, already terminated");
                return TerminationOutcome::GracefulSuccess;
            }
            Err(e) => {
                // Some processes refuse the polite request; force is still worth a try
                warn!(pid = pid, error = %e, "Graceful termination failed, will try force");
            }
        }

        sleep(self.grace_period).await;

        if !platform.is_alive(pid).await {
            debug!(pid = pid, "Process exited after graceful request");
            return TerminationOutcome::GracefulSuccess;
        }

        debug!(pid = pid, "Process still running, forcing termination");
        match platform.terminate_forcefully(pid).await {
            Ok(()) => {
                debug!(pid = pid, "Process force killed");
                TerminationOutcome::ForcedSuccess
            }
            Err(KillError::ProcessNotFound(_)) => {
                // Exited between the liveness check and the kill
                debug!(pid = pid, "Process vanished before force kill");
                TerminationOutcome::GracefulSuccess
            }
            Err(e) => {
                warn!(pid = pid, error = %e, "Failed to terminate process");
                TerminationOutcome::Failed(e.to_string())
            }
        }
    }
}

impl Default for Terminator {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{Behavior, MockPlatform};

    fn terminator() -> Terminator {
        Terminator::new(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_graceful_success() {
        let platform = MockPlatform::new().with_process(10, "cursor", Behavior::ExitsOnTerm);

        let outcome = terminator().terminate(&platform, 10).await;
        assert_eq!(outcome, TerminationOutcome::GracefulSuccess);
        assert_eq!(platform.graceful_calls(), vec![10]);
        assert!(platform.forceful_calls().is_empty());
    }

    #[tokio::test]
    async fn test_escalates_to_force() {
        let platform = MockPlatform::new().with_process(10, "cursor", Behavior::NeedsKill);

        let outcome = terminator().terminate(&platform, 10).await;
        assert_eq!(outcome, TerminationOutcome::ForcedSuccess);
        assert_eq!(platform.forceful_calls(), vec![10]);
        assert!(!platform.is_alive_now(10));
    }

    #[tokio::test]
    async fn test_already_gone_is_success() {
        let platform = MockPlatform::new();

        let outcome = terminator().terminate(&platform, 77).await;
        assert_eq!(outcome, TerminationOutcome::GracefulSuccess);
        assert!(platform.forceful_calls().is_empty());
    }

    #[tokio::test]
    async fn test_vanished_before_force_kill_is_success() {
        let platform =
            MockPlatform::new().with_process(10, "cursor", Behavior::VanishesBeforeKill);

        let outcome = terminator().terminate(&platform, 10).await;
        assert!(outcome.is_success());
        assert_eq!(platform.forceful_calls(), vec![10]);
    }

    #[tokio::test]
    async fn test_permission_denied_fails() {
        let platform = MockPlatform::new().with_process(10, "cursor", Behavior::Unkillable);

        let outcome = terminator().terminate(&platform, 10).await;
        match outcome {
            TerminationOutcome::Failed(cause) => assert!(cause.contains("Permission denied")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(platform.forceful_calls(), vec![10]);
    }
}
