//! Retry policy for the stop loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How many check/terminate rounds to run and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    max_attempts: u32,
    inter_attempt_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` must be at least 1.
    pub fn new(max_attempts: u32, inter_attempt_delay: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::Config("max attempts must be at least 1".to_string()));
        }
        Ok(Self {
            max_attempts,
            inter_attempt_delay,
        })
    }

    /// Maximum number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between attempts.
    pub fn inter_attempt_delay(&self) -> Duration {
        self.inter_attempt_delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            inter_attempt_delay: Duration::from_secs(1),
        }
    }
}
