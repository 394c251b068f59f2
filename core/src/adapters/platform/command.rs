//! Bounded execution of OS utilities.

use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::warn;

/// Run a command to completion, giving up after `limit`.
///
/// The child is killed if the deadline passes, and the timeout is reported as
/// an `io::ErrorKind::TimedOut` error so a hung utility never looks like an
/// empty result.
pub(crate) async fn output_with_timeout(
    command: &mut Command,
    limit: Duration,
) -> io::Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(limit, command.output()).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_ms = limit.as_millis() as u64, "Command timed out");
            Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("command did not finish within {} ms", limit.as_millis()),
            ))
        }
    }
}
