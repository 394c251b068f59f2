//! AppKiller CLI - Make sure a desktop application is not running
//!
//! A command-line tool for checking, listing and stopping every process
//! of a target application (Cursor by default).

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::Context;

#[derive(Parser)]
#[command(name = "appkiller")]
#[command(author, version, about = "Close every running instance of a desktop application")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Use this config file instead of ~/.appkiller/config.json
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the application is running
    Status,

    /// List the application's processes
    #[command(alias = "ls")]
    List,

    /// Stop every instance of the application
    Stop {
        /// Termination rounds before giving up
        #[arg(short, long)]
        attempts: Option<u32>,

        /// Delay between rounds in milliseconds
        #[arg(short, long)]
        delay_ms: Option<u64>,

        /// Process pattern (repeatable, replaces configured patterns)
        #[arg(short, long = "pattern", value_name = "PATTERN")]
        patterns: Vec<String>,
    },

    /// Wait for the user to close the application, without terminating it
    Wait {
        /// Polls before giving up
        #[arg(short, long)]
        attempts: Option<u32>,

        /// Delay between polls in milliseconds
        #[arg(short, long)]
        delay_ms: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write the default configuration if none exists
    Init,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context::load(cli.config, cli.json).await?;

    match cli.command {
        Some(Commands::Status) => commands::status::run(&ctx).await?,
        Some(Commands::List) => commands::list::run(&ctx).await?,
        Some(Commands::Stop {
            attempts,
            delay_ms,
            patterns,
        }) => commands::stop::run(&ctx, attempts, delay_ms, patterns).await?,
        Some(Commands::Wait { attempts, delay_ms }) => {
            commands::wait::run(&ctx, attempts, delay_ms).await?
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&ctx)?,
            ConfigAction::Path => commands::config::path(&ctx),
            ConfigAction::Init => commands::config::init(&ctx).await?,
        },
        // Default: report status
        None => commands::status::run(&ctx).await?,
    }

    Ok(())
}
