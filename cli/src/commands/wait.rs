//! Wait command - poll until the user closes the application.

use anyhow::Result;
use appkiller_core::{RetryPolicy, StopOutcome};
use std::time::Duration;

use super::{cancel_on_ctrl_c, print_json, with_manual_hint, Context};

pub async fn run(ctx: &Context, attempts: Option<u32>, delay_ms: Option<u64>) -> Result<()> {
    let policy = RetryPolicy::new(
        attempts.unwrap_or(ctx.config.wait_attempts),
        Duration::from_millis(delay_ms.unwrap_or(ctx.config.wait_delay_ms)),
    )?;

    let controller = ctx.controller(&ctx.config)?;
    let cancel = cancel_on_ctrl_c(ctx.json);

    if !ctx.json && with_manual_hint(controller.is_running().await)? {
        println!("Please close the application...");
    }

    let outcome = with_manual_hint(controller.wait_for_exit(policy, &cancel).await)?;

    if ctx.json {
        return print_json(&outcome);
    }

    match outcome {
        StopOutcome::Stopped { .. } => println!("Not running"),
        StopOutcome::Cancelled { .. } => anyhow::bail!("Cancelled"),
    }
    Ok(())
}
