// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-(server, operation-kind) mutual exclusion.
//!
//! At most one operation of a given kind is active for a given server at
//! any time. Acquisition is a compare-and-swap on an atomic flag; release
//! happens on every exit path via [`GateGuard`]'s `Drop` impl, so a
//! panicking stage still clears the flag.
//!
//! The original design places these flags in memory shared across forked
//! processes. Re-architected here as in-process atomics behind an
//! `Arc<Configuration>` — the supervisor runs as a single process with
//! per-command tasks rather than per-command forks, so the exclusion
//! holds without cross-process shared memory. A supervisor restart drops
//! the whole `Arc<Configuration>`, so no stale lock can survive it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// The kind of operation a gate guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Backup,
    Delete,
    Restore,
    Verify,
    Archive,
    Retention,
}

const KINDS: [OperationKind; 6] = [
    OperationKind::Backup,
    OperationKind::Delete,
    OperationKind::Restore,
    OperationKind::Verify,
    OperationKind::Archive,
    OperationKind::Retention,
];

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Backup => "backup",
            OperationKind::Delete => "delete",
            OperationKind::Restore => "restore",
            OperationKind::Verify => "verify",
            OperationKind::Archive => "archive",
            OperationKind::Retention => "retention",
        }
    }

    fn index(&self) -> usize {
        KINDS.iter().position(|k| k == self).unwrap_or(0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("{kind} is already active for this server")]
    Active { kind: &'static str },
}

/// Holds one atomic busy flag per operation kind for a single server.
pub struct ServerGate {
    flags: [Arc<AtomicBool>; 6],
}

impl Default for ServerGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerGate {
    pub fn new() -> Self {
        Self {
            flags: std::array::from_fn(|_| Arc::new(AtomicBool::new(false))),
        }
    }

    /// Attempt to acquire the gate for `kind`. On success, returns a
    /// guard that releases the gate when dropped. On failure, the
    /// on-disk state for this server must not be touched by the caller.
    pub fn acquire(&self, kind: OperationKind) -> Result<GateGuard, GateError> {
        let flag = Arc::clone(&self.flags[kind.index()]);

        match flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => Ok(GateGuard { flag: Some(flag) }),
            Err(_) => Err(GateError::Active {
                kind: kind.as_str(),
            }),
        }
    }

    pub fn is_active(&self, kind: OperationKind) -> bool {
        self.flags[kind.index()].load(Ordering::SeqCst)
    }
}

/// RAII guard releasing a server gate on drop (success, failure, or
/// unwind — every exit path).
pub struct GateGuard {
    flag: Option<Arc<AtomicBool>>,
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        if let Some(flag) = self.flag.take() {
            flag.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
