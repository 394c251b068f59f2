//! AppKiller Core Library
//!
//! Cross-platform library for making sure a desktop application is not running.
//! Provides functionality to:
//! - List running processes and match them against name patterns
//! - Terminate processes gracefully, escalating to a forced kill
//! - Retry until the application is gone, with cancellation
//! - Manage user configuration (patterns, retry settings)
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - macOS / Linux: Uses `ps` and POSIX signals
//! - Windows: Uses `tasklist` and `taskkill`
//! - Other platforms: listing fails with `Error::UnsupportedPlatform`

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod engine;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    filter_matches, MatchMode, MatchPattern, PatternSet, ProcessRecord, RetryPolicy,
    SelfIdentity, StopOutcome, Termination, TerminationOutcome,
};

// Re-export other commonly used types
pub use adapters::PlatformProcessControl;
pub use application::{LifecycleController, Terminator};
pub use config::{Config, ConfigStore};
pub use engine::AppKillerEngine;
pub use error::{Error, KillError, Result};
pub use ports::ProcessControlPort;
pub use tokio_util::sync::CancellationToken;
