//! Config commands - inspect and initialize the configuration file.

use anyhow::Result;

use super::{print_json, Context};

pub fn show(ctx: &Context) -> Result<()> {
    if ctx.json {
        return print_json(&ctx.config);
    }

    let config = &ctx.config;
    println!("Config file:     {}", ctx.store.config_path().display());
    println!("Patterns:        {}", config.patterns.join(", "));
    println!("Exclusions:      {}", config.self_exclusions.join(", "));
    println!("Command lines:   {}", config.match_command_line);
    println!(
        "Stop:            {} attempts, {} ms apart",
        config.max_attempts, config.retry_delay_ms
    );
    println!("Grace period:    {} ms", config.grace_period_ms);
    println!("Command timeout: {} ms", config.command_timeout_ms);
    println!(
        "Wait:            {} polls, {} ms apart",
        config.wait_attempts, config.wait_delay_ms
    );
    Ok(())
}

pub fn path(ctx: &Context) {
    println!("{}", ctx.store.config_path().display());
}

pub async fn init(ctx: &Context) -> Result<()> {
    let path = ctx.store.config_path().display();
    if ctx.store.init().await? {
        println!("Wrote default configuration to {}", path);
    } else {
        println!("{} already exists", path);
    }
    Ok(())
}
