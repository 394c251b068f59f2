//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod outcome;
mod pattern;
mod policy;
mod process;

// Re-export all domain types
pub use outcome::{StopOutcome, Termination, TerminationOutcome};
pub use pattern::{filter_matches, MatchMode, MatchPattern, PatternSet};
pub use policy::RetryPolicy;
pub use process::{ProcessRecord, SelfIdentity};
