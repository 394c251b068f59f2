//! Stop command - make sure the application is not running.

use anyhow::Result;
use appkiller_core::{StopOutcome, TerminationOutcome};

use super::{cancel_on_ctrl_c, print_json, with_manual_hint, Context};

pub async fn run(
    ctx: &Context,
    attempts: Option<u32>,
    delay_ms: Option<u64>,
    patterns: Vec<String>,
) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(attempts) = attempts {
        config.max_attempts = attempts;
    }
    if let Some(delay_ms) = delay_ms {
        config.retry_delay_ms = delay_ms;
    }
    if !patterns.is_empty() {
        config.patterns = patterns;
    }

    let controller = ctx.controller(&config)?;
    let cancel = cancel_on_ctrl_c(ctx.json);
    let outcome = with_manual_hint(controller.ensure_stopped_with(&cancel).await)?;

    if ctx.json {
        return print_json(&outcome);
    }

    for termination in outcome.terminations() {
        let how = match &termination.outcome {
            TerminationOutcome::GracefulSuccess => "stopped".to_string(),
            TerminationOutcome::ForcedSuccess => "killed".to_string(),
            TerminationOutcome::Failed(cause) => format!("failed: {}", cause),
        };
        println!("[{}] {} {}", termination.attempt, termination.process, how);
    }

    match outcome {
        StopOutcome::Stopped { attempts: 0, .. } => println!("Not running"),
        StopOutcome::Stopped { attempts, .. } => {
            println!("Stopped after {} attempt(s)", attempts)
        }
        StopOutcome::Cancelled { attempts, .. } => {
            anyhow::bail!("Cancelled after {} attempt(s)", attempts)
        }
    }
    Ok(())
}
