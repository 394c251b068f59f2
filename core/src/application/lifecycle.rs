//! Lifecycle controller: find the target application and make sure it stops.

use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::terminator::Terminator;
use crate::config::Config;
use crate::domain::{
    filter_matches, PatternSet, ProcessRecord, RetryPolicy, SelfIdentity, StopOutcome,
    Termination, TerminationOutcome,
};
use crate::error::{Error, Result};
use crate::ports::ProcessControlPort;

/// Orchestrates listing, matching and termination of the target application.
///
/// The controller holds only immutable configuration. Every call keeps its own
/// loop state, so one controller can serve concurrent callers.
///
/// # Stop loop
///
/// Each attempt lists processes and filters them through the pattern set.
/// No matches ends the loop successfully. Otherwise every match is terminated
/// (concurrently, each independently of the others), the controller sleeps for
/// the policy delay and checks again. Once `max_attempts` attempts have found
/// and terminated matches, the loop fails with `Error::StillRunning`, listing
/// the processes of the last round that were not confirmed gone.
///
/// Listing failures end the loop immediately and do not count as attempts.
pub struct LifecycleController<P: ProcessControlPort> {
    platform: P,
    patterns: PatternSet,
    policy: RetryPolicy,
    terminator: Terminator,
    me: SelfIdentity,
}

impl<P: ProcessControlPort> LifecycleController<P> {
    /// Create a controller with the default grace period.
    pub fn new(platform: P, patterns: PatternSet, policy: RetryPolicy) -> Self {
        let me = platform.self_identity();
        Self {
            platform,
            patterns,
            policy,
            terminator: Terminator::default(),
            me,
        }
    }

    /// Create a controller from a loaded configuration.
    pub fn from_config(platform: P, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(platform, config.pattern_set()?, config.retry_policy()?)
            .with_grace_period(config.grace_period()))
    }

    /// Override the time processes get between the graceful and forceful requests.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.terminator = Terminator::new(grace_period);
        self
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn self_identity(&self) -> &SelfIdentity {
        &self.me
    }

    /// List the processes that currently belong to the target application.
    pub async fn find_matches(&self) -> Result<Vec<ProcessRecord>> {
        let records = self.platform.list().await?;
        let total = records.len();
        let matches = filter_matches(records, &self.patterns, &self.me);
        debug!(total = total, matched = matches.len(), "Filtered process listing");
        Ok(matches)
    }

    /// Whether any process of the target application is running.
    ///
    /// Read-only: never terminates anything.
    pub async fn is_running(&self) -> Result<bool> {
        Ok(!self.find_matches().await?.is_empty())
    }

    /// Stop every instance of the target application.
    pub async fn ensure_stopped(&self) -> Result<StopOutcome> {
        self.ensure_stopped_with(&CancellationToken::new()).await
    }

    /// Stop every instance of the target application, unless `cancel` fires first.
    ///
    /// Cancellation is honoured before each check and during the wait between
    /// attempts; terminations already in flight are allowed to finish.
    pub async fn ensure_stopped_with(&self, cancel: &CancellationToken) -> Result<StopOutcome> {
        let span = info_span!("ensure_stopped", run_id = %Uuid::new_v4());
        self.stop_loop(cancel).instrument(span).await
    }

    async fn stop_loop(&self, cancel: &CancellationToken) -> Result<StopOutcome> {
        let max_attempts = self.policy.max_attempts();
        let mut terminations = Vec::new();
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                info!(attempts = attempt, "Stop cancelled");
                return Ok(StopOutcome::Cancelled {
                    attempts: attempt,
                    terminations,
                });
            }

            let matches = self.find_matches().await?;
            if matches.is_empty() {
                info!(attempts = attempt, "Application is not running");
                return Ok(StopOutcome::Stopped {
                    attempts: attempt,
                    terminations,
                });
            }

            attempt += 1;
            info!(
                attempt = attempt,
                max_attempts = max_attempts,
                count = matches.len(),
                "Terminating application processes"
            );

            let outcomes = join_all(
                matches
                    .iter()
                    .map(|record| self.terminator.terminate(&self.platform, record.pid)),
            )
            .await;

            for (process, outcome) in matches.iter().cloned().zip(outcomes) {
                if let TerminationOutcome::Failed(cause) = &outcome {
                    warn!(pid = process.pid, name = %process.name, cause = %cause, "Process survived termination");
                }
                terminations.push(Termination {
                    attempt,
                    process,
                    outcome,
                });
            }

            if attempt >= max_attempts {
                // GracefulSuccess means the process was confirmed gone
                let round = &terminations[terminations.len() - matches.len()..];
                let remaining: Vec<ProcessRecord> = round
                    .iter()
                    .filter(|t| t.outcome != TerminationOutcome::GracefulSuccess)
                    .map(|t| t.process.clone())
                    .collect();

                if remaining.is_empty() {
                    info!(attempts = attempt, "Application stopped on the last attempt");
                    return Ok(StopOutcome::Stopped {
                        attempts: attempt,
                        terminations,
                    });
                }

                warn!(attempts = attempt, remaining = remaining.len(), "Giving up, application still running");
                return Err(Error::StillRunning {
                    attempts: attempt,
                    remaining,
                });
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(attempts = attempt, "Stop cancelled while waiting");
                    return Ok(StopOutcome::Cancelled {
                        attempts: attempt,
                        terminations,
                    });
                }
                _ = tokio::time::sleep(self.policy.inter_attempt_delay()) => {}
            }
        }
    }

    /// Wait for the user to close the application, without terminating anything.
    ///
    /// Polls up to `policy.max_attempts()` times, `policy.inter_attempt_delay()`
    /// apart. The returned outcome never carries terminations.
    pub async fn wait_for_exit(
        &self,
        policy: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<StopOutcome> {
        let span = info_span!("wait_for_exit", run_id = %Uuid::new_v4());
        async {
            let max_polls = policy.max_attempts();
            let mut poll = 0;

            loop {
                if cancel.is_cancelled() {
                    return Ok(StopOutcome::Cancelled {
                        attempts: poll,
                        terminations: Vec::new(),
                    });
                }

                let matches = self.find_matches().await?;
                if matches.is_empty() {
                    info!(polls = poll, "Application has exited");
                    return Ok(StopOutcome::Stopped {
                        attempts: poll,
                        terminations: Vec::new(),
                    });
                }

                poll += 1;
                info!(
                    poll = poll,
                    max_polls = max_polls,
                    count = matches.len(),
                    "Waiting for application to exit"
                );

                if poll >= max_polls {
                    return Err(Error::StillRunning {
                        attempts: poll,
                        remaining: matches,
                    });
                }

                tokio::select! {
                    _ = cancel.cancelled() => {
                        return Ok(StopOutcome::Cancelled {
                            attempts: poll,
                            terminations: Vec::new(),
                        });
                    }
                    _ = tokio::time::sleep(policy.inter_attempt_delay()) => {}
                }
            }
        }
        .instrument(span)
        .await
    }
}
