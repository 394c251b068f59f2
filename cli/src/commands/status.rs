//! Status command - is the application running?

use anyhow::Result;
use serde::Serialize;

use super::{list::print_table, print_json, with_manual_hint, Context};
use appkiller_core::ProcessRecord;

#[derive(Serialize)]
struct Status<'a> {
    running: bool,
    processes: &'a [ProcessRecord],
}

pub async fn run(ctx: &Context) -> Result<()> {
    let processes = with_manual_hint(ctx.controller(&ctx.config)?.find_matches().await)?;
    let running = !processes.is_empty();

    if ctx.json {
        return print_json(&Status {
            running,
            processes: &processes,
        });
    }

    if running {
        println!("Running ({} processes)\n", processes.len());
        print_table(&processes);
    } else {
        println!("Not running");
    }
    Ok(())
}
