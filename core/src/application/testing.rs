//! Scripted process control for controller and terminator tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::{ProcessRecord, SelfIdentity};
use crate::error::{Error, KillError, Result};
use crate::ports::ProcessControlPort;

/// How a simulated process reacts to termination requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    /// Exits on the graceful request.
    ExitsOnTerm,
    /// Ignores the graceful request, dies on the forceful one.
    NeedsKill,
    /// Both requests are refused with a permission error.
    Unkillable,
    /// Both requests are refused, but the process exits right after.
    FailsThenExits,
    /// Survives the grace period, then exits before the forceful request lands.
    VanishesBeforeKill,
    /// Accepts every request and keeps running.
    Immortal,
}

pub(crate) struct MockPlatform {
    processes: Mutex<BTreeMap<u32, (ProcessRecord, Behavior)>>,
    alive: Mutex<HashSet<u32>>,
    failing_listings: Mutex<HashSet<u32>>,
    unsupported: bool,
    list_calls: AtomicU32,
    graceful: Mutex<Vec<u32>>,
    forceful: Mutex<Vec<u32>>,
    cancel_on_terminate: Mutex<Option<CancellationToken>>,
    me: SelfIdentity,
}

impl MockPlatform {
    pub(crate) fn new() -> Self {
        Self {
            processes: Mutex::new(BTreeMap::new()),
            alive: Mutex::new(HashSet::new()),
            failing_listings: Mutex::new(HashSet::new()),
            unsupported: false,
            list_calls: AtomicU32::new(0),
            graceful: Mutex::new(Vec::new()),
            forceful: Mutex::new(Vec::new()),
            cancel_on_terminate: Mutex::new(None),
            me: SelfIdentity {
                pid: 1,
                name: Some("appkiller".to_string()),
            },
        }
    }

    pub(crate) fn with_process(self, pid: u32, name: &str, behavior: Behavior) -> Self {
        self.processes
            .lock()
            .insert(pid, (ProcessRecord::new(pid, name, name), behavior));
        self.alive.lock().insert(pid);
        self
    }

    /// Make the `call`-th listing (1-based) fail with an enumeration error.
    pub(crate) fn failing_listing(self, call: u32) -> Self {
        self.failing_listings.lock().insert(call);
        self
    }

    /// Make every listing fail as if no process facility existed.
    pub(crate) fn unsupported(mut self) -> Self {
        self.unsupported = true;
        self
    }

    /// Cancel `token` as soon as any termination is requested.
    pub(crate) fn cancel_on_terminate(self, token: CancellationToken) -> Self {
        *self.cancel_on_terminate.lock() = Some(token);
        self
    }

    pub(crate) fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn graceful_calls(&self) -> Vec<u32> {
        self.graceful.lock().clone()
    }

    pub(crate) fn forceful_calls(&self) -> Vec<u32> {
        self.forceful.lock().clone()
    }

    pub(crate) fn is_alive_now(&self, pid: u32) -> bool {
        self.alive.lock().contains(&pid)
    }

    fn behavior(&self, pid: u32) -> Option<Behavior> {
        if !self.is_alive_now(pid) {
            return None;
        }
        self.processes.lock().get(&pid).map(|(_, b)| *b)
    }

    fn exit(&self, pid: u32) {
        self.alive.lock().remove(&pid);
    }
}

impl ProcessControlPort for MockPlatform {
    async fn list(&self) -> Result<Vec<ProcessRecord>> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.unsupported {
            return Err(Error::UnsupportedPlatform("mockos".to_string()));
        }
        if self.failing_listings.lock().contains(&call) {
            return Err(Error::Enumeration("ps: command not found".to_string()));
        }

        let alive = self.alive.lock().clone();
        Ok(self
            .processes
            .lock()
            .values()
            .filter(|(record, _)| alive.contains(&record.pid))
            .map(|(record, _)| record.clone())
            .collect())
    }

    async fn terminate_gracefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        self.graceful.lock().push(pid);
        if let Some(token) = self.cancel_on_terminate.lock().as_ref() {
            token.cancel();
        }

        match self.behavior(pid) {
            None => Err(KillError::ProcessNotFound(pid)),
            Some(Behavior::ExitsOnTerm) => {
                self.exit(pid);
                Ok(())
            }
            Some(Behavior::Unkillable) | Some(Behavior::FailsThenExits) => {
                Err(KillError::PermissionDenied(pid))
            }
            Some(_) => Ok(()),
        }
    }

    async fn terminate_forcefully(&self, pid: u32) -> std::result::Result<(), KillError> {
        self.forceful.lock().push(pid);

        match self.behavior(pid) {
            None => Err(KillError::ProcessNotFound(pid)),
            Some(Behavior::Unkillable) => Err(KillError::PermissionDenied(pid)),
            Some(Behavior::FailsThenExits) => {
                self.exit(pid);
                Err(KillError::PermissionDenied(pid))
            }
            Some(Behavior::VanishesBeforeKill) => {
                self.exit(pid);
                Err(KillError::ProcessNotFound(pid))
            }
            Some(Behavior::Immortal) => Ok(()),
            Some(_) => {
                self.exit(pid);
                Ok(())
            }
        }
    }

    async fn is_alive(&self, pid: u32) -> bool {
        self.is_alive_now(pid)
    }

    fn self_identity(&self) -> SelfIdentity {
        self.me.clone()
    }
}
