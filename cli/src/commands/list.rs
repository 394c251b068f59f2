//! List command - show the application's processes.

use anyhow::Result;
use appkiller_core::ProcessRecord;

use super::{print_json, with_manual_hint, Context};

pub async fn run(ctx: &Context) -> Result<()> {
    let processes = with_manual_hint(ctx.controller(&ctx.config)?.find_matches().await)?;

    if ctx.json {
        return print_json(&processes);
    }

    if processes.is_empty() {
        println!("No matching processes found.");
        return Ok(());
    }

    print_table(&processes);
    println!("\nTotal: {} processes", processes.len());
    Ok(())
}

pub fn print_table(processes: &[ProcessRecord]) {
    println!("{:<8} {:<28} COMMAND", "PID", "PROCESS");
    println!("{}", "-".repeat(80));

    for process in processes {
        println!(
            "{:<8} {:<28} {}",
            process.pid,
            truncate(&process.name, 28),
            truncate(&process.command, 42)
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}
