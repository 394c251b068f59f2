//! Parsers for process listing output.
//!
//! Kept platform independent so every parser is tested on every host.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::ProcessRecord;

/// Longest command line kept on a record.
const MAX_COMMAND_LEN: usize = 512;
const ELLIPSIS: &str = "...";

fn ps_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\s+(.*\S)\s*$").expect("valid ps line regex"))
}

fn csv_field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]*)""#).expect("valid csv field regex"))
}

/// Parse `ps -o pid=,<column>=` output into `(pid, column)` pairs.
///
/// The column is the last one on the line, so it may contain spaces.
pub fn parse_ps_column(output: &str) -> Vec<(u32, String)> {
    output
        .lines()
        .filter_map(|line| {
            let caps = ps_line_regex().captures(line)?;
            let pid: u32 = caps[1].parse().ok()?;
            Some((pid, caps[2].to_string()))
        })
        .collect()
}

/// Reduce an absolute executable path to its file name.
///
/// Only absolute paths are shortened: Linux kernel thread names such as
/// `kworker/0:1` contain slashes but are not paths.
pub fn image_name(comm: &str) -> &str {
    if comm.starts_with('/') {
        comm.rsplit('/').next().unwrap_or(comm)
    } else {
        comm
    }
}

fn truncate_command(command: &str) -> String {
    if command.chars().count() <= MAX_COMMAND_LEN {
        return command.to_string();
    }
    let head: String = command.chars().take(MAX_COMMAND_LEN - ELLIPSIS.len()).collect();
    format!("{}{}", head, ELLIPSIS)
}

/// Join the `comm` and `args` listings of a Unix host by PID.
///
/// Processes missing from the `args` listing fall back to their image name.
pub fn merge_unix_listing(names: &str, commands: &str) -> Vec<ProcessRecord> {
    let commands: HashMap<u32, String> = parse_ps_column(commands).into_iter().collect();

    let mut records: Vec<ProcessRecord> = parse_ps_column(names)
        .into_iter()
        .map(|(pid, comm)| {
            let name = image_name(&comm).to_string();
            let command = commands
                .get(&pid)
                .map(|c| truncate_command(c))
                .unwrap_or_else(|| comm.clone());
            ProcessRecord::new(pid, name, command)
        })
        .collect();

    records.sort_by_key(|r| r.pid);
    records
}

/// Parse `tasklist /FO CSV /NH` output.
///
/// Lines look like `"Cursor.exe","1234","Console","1","120,456 K"`. Lines
/// without quoted fields (such as the `INFO:` banner) are skipped.
pub fn parse_tasklist_csv(output: &str) -> Vec<ProcessRecord> {
    let mut records: Vec<ProcessRecord> = output
        .lines()
        .filter_map(|line| {
            let mut fields = csv_field_regex().captures_iter(line).map(|c| c[1].to_string());
            let name = fields.next()?;
            let pid: u32 = fields.next()?.trim().parse().ok()?;
            Some(ProcessRecord::new(pid, name.clone(), name))
        })
        .collect();

    records.sort_by_key(|r| r.pid);
    records
}

/// Interpret a `tasklist /FI "PID eq n"` probe.
///
/// A failed probe says nothing about the process, so it counts as alive.
pub fn tasklist_reports_alive(succeeded: bool, output: &str, pid: u32) -> bool {
    !succeeded || parse_tasklist_csv(output).iter().any(|r| r.pid == pid)
}
