//! AppKiller Engine - Blocking facade over the lifecycle controller.
//!
//! Owns a single-threaded runtime so synchronous hosts (installers, updaters,
//! FFI callers) can stop the target application without managing async code.

use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;

use crate::adapters::PlatformProcessControl;
use crate::application::LifecycleController;
use crate::config::{Config, ConfigStore};
use crate::domain::{ProcessRecord, RetryPolicy, StopOutcome};
use crate::error::Result;
use crate::ports::ProcessControlPort;

/// The main AppKiller engine.
///
/// # Usage Pattern
/// Call `ensure_stopped()` before touching files the application holds open.
/// Use `cancellation_token()` from another thread to abort a running stop.
pub struct AppKillerEngine<P: ProcessControlPort = PlatformProcessControl> {
    controller: LifecycleController<P>,
    wait_policy: RetryPolicy,
    cancel: CancellationToken,
    runtime: Runtime,
}

impl AppKillerEngine<PlatformProcessControl> {
    /// Create an engine from the configuration at `~/.appkiller/config.json`.
    pub fn new() -> Result<Self> {
        let store = ConfigStore::new()?;
        let runtime = Self::build_runtime()?;
        let config = runtime.block_on(store.load())?;
        let platform = PlatformProcessControl::with_timeout(config.command_timeout());
        Self::assemble(platform, &config, runtime)
    }
}

impl<P: ProcessControlPort> AppKillerEngine<P> {
    /// Create an engine over any process control with the given configuration.
    pub fn with_platform(platform: P, config: &Config) -> Result<Self> {
        Self::assemble(platform, config, Self::build_runtime()?)
    }

    fn build_runtime() -> Result<Runtime> {
        // Use single-threaded runtime - nothing here benefits from more threads
        Ok(Builder::new_current_thread().enable_all().build()?)
    }

    fn assemble(platform: P, config: &Config, runtime: Runtime) -> Result<Self> {
        Ok(Self {
            controller: LifecycleController::from_config(platform, config)?,
            wait_policy: config.wait_policy()?,
            cancel: CancellationToken::new(),
            runtime,
        })
    }

    /// Token that aborts `ensure_stopped` and `wait_for_exit` when cancelled.
    ///
    /// Once cancelled it stays cancelled; later calls return immediately.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn controller(&self) -> &LifecycleController<P> {
        &self.controller
    }

    /// Check whether the target application is running.
    pub fn is_running(&self) -> Result<bool> {
        self.runtime.block_on(self.controller.is_running())
    }

    /// Processes currently matching the configured patterns.
    pub fn matching_processes(&self) -> Result<Vec<ProcessRecord>> {
        self.runtime.block_on(self.controller.find_matches())
    }

    /// Stop the target application, blocking until done.
    pub fn ensure_stopped(&self) -> Result<StopOutcome> {
        self.runtime
            .block_on(self.controller.ensure_stopped_with(&self.cancel))
    }

    /// Block until the user closes the application, polling with the configured wait policy.
    pub fn wait_for_exit(&self) -> Result<StopOutcome> {
        self.runtime
            .block_on(self.controller.wait_for_exit(self.wait_policy, &self.cancel))
    }
}
