//! Subcommand implementations.

pub mod config;
pub mod list;
pub mod status;
pub mod stop;
pub mod wait;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use appkiller_core::{
    CancellationToken, Config, ConfigStore, Error, LifecycleController, PlatformProcessControl,
};

const STOP_FAILED_HINT: &str = "Could not stop the application; close it manually and try again";
const CHECK_FAILED_HINT: &str =
    "Could not verify whether the application is running; close it manually before continuing";

/// Loaded configuration shared by every command.
pub struct Context {
    pub store: ConfigStore,
    pub config: Config,
    pub json: bool,
}

impl Context {
    pub async fn load(config_path: Option<PathBuf>, json: bool) -> Result<Self> {
        let store = match config_path {
            Some(path) => ConfigStore::with_path(path),
            None => ConfigStore::new().context("Failed to locate config file")?,
        };
        let config = store
            .load()
            .await
            .with_context(|| format!("Failed to load {}", store.config_path().display()))?;

        Ok(Self {
            store,
            config,
            json,
        })
    }

    /// Controller for the platform, built from `config`.
    pub fn controller(&self, config: &Config) -> Result<LifecycleController<PlatformProcessControl>> {
        let platform = PlatformProcessControl::with_timeout(config.command_timeout());
        LifecycleController::from_config(platform, config).context("Invalid configuration")
    }
}

/// Token cancelled on the first Ctrl-C.
pub fn cancel_on_ctrl_c(json: bool) -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            child.cancel();
        }
    });

    if !json && atty::is(atty::Stream::Stderr) {
        eprintln!("Press Ctrl-C to cancel.");
    }
    token
}

/// Attach a close-it-manually hint to errors that leave the application running
/// or its state unknown.
pub fn with_manual_hint<T>(result: appkiller_core::Result<T>) -> Result<T> {
    match result {
        Err(e @ Error::StillRunning { .. }) => Err(anyhow::Error::new(e).context(STOP_FAILED_HINT)),
        Err(e) if e.is_environment() => Err(anyhow::Error::new(e).context(CHECK_FAILED_HINT)),
        other => Ok(other?),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use appkiller_core::ProcessRecord;

    #[test]
    fn test_still_running_gets_manual_hint() {
        let result: appkiller_core::Result<()> = Err(Error::StillRunning {
            attempts: 3,
            remaining: vec![ProcessRecord::new(10, "Cursor", "Cursor")],
        });
        let msg = format!("{:#}", with_manual_hint(result).unwrap_err());
        assert!(msg.contains("close it manually"));
        assert!(msg.contains("Cursor (pid 10)"));
    }

    #[test]
    fn test_environment_errors_get_manual_hint() {
        let result: appkiller_core::Result<()> = Err(Error::Enumeration("ps timed out".into()));
        let msg = format!("{:#}", with_manual_hint(result).unwrap_err());
        assert!(msg.starts_with(CHECK_FAILED_HINT));
        assert!(msg.contains("ps timed out"));

        let result: appkiller_core::Result<()> = Err(Error::UnsupportedPlatform("plan9".into()));
        assert!(format!("{:#}", with_manual_hint(result).unwrap_err()).contains("close it manually"));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let result: appkiller_core::Result<()> = Err(Error::Config("bad".into()));
        let msg = format!("{:#}", with_manual_hint(result).unwrap_err());
        assert!(!msg.contains("close it manually"));

        assert_eq!(with_manual_hint(Ok(7)).unwrap(), 7);
    }
}
