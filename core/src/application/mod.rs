//! Application layer - Use case services.
//!
//! Services orchestrate domain logic through the ports:
//! - `Terminator` runs the graceful-then-forceful sequence for one PID
//! - `LifecycleController` finds the target application and stops it

mod lifecycle;
mod terminator;

#[cfg(test)]
pub(crate) mod testing;

pub use lifecycle::LifecycleController;
pub use terminator::{Terminator, DEFAULT_GRACE_PERIOD};
