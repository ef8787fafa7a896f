// crates/slab-registry-core/src/runtime/lock.rs
// ============================================================================
// Module: Named Mutual Exclusion
// Description: Process-wide named locks with bounded acquisition.
// Purpose: Protect the count-then-generate critical section of issuance.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! This module provides named, process-wide critical sections keyed by an
//! arbitrary string lock name. At most one caller holds a given name at a
//! time; waiters block until the holder releases. Release is guard-based:
//! dropping the returned [`NamedLockGuard`] releases the lock on every exit
//! route, including error returns and panics, so an unlock-without-lock
//! misuse is unrepresentable in the API.
//!
//! The registry is process-local only. It offers no exclusion across
//! multiple processes or replicas; deployments with more than one instance
//! must use a shared atomic counter source instead (see the store crate's
//! `next_sequence`).
//!
//! No fairness is guaranteed beyond eventual acquisition: waiters are woken
//! in an unspecified order when the holder releases.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Named-lock acquisition errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LockError {
    /// Bounded acquisition expired before the lock became available.
    #[error("lock acquisition timed out: {name} after {waited_ms} ms")]
    Timeout {
        /// Lock name that could not be acquired.
        name: String,
        /// Milliseconds waited before giving up.
        waited_ms: u64,
    },
}

// ============================================================================
// SECTION: Lock State
// ============================================================================

/// Shared state for one named lock.
struct LockState {
    /// Whether the lock is currently held.
    held: Mutex<bool>,
    /// Signalled when the holder releases.
    released: Condvar,
}

impl LockState {
    /// Creates an unheld lock state.
    fn new() -> Self {
        Self {
            held: Mutex::new(false),
            released: Condvar::new(),
        }
    }

    /// Blocks until the lock is acquired or the optional deadline passes.
    ///
    /// Returns `true` on acquisition, `false` on deadline expiry. Poisoned
    /// mutexes are recovered rather than propagated: the protected flag is a
    /// plain boolean whose value stays meaningful across a waiter panic.
    fn acquire(&self, deadline: Option<Instant>) -> bool {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if !*held {
                *held = true;
                return true;
            }
            match deadline {
                None => {
                    held = self.released.wait(held).unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    let (guard, _timed_out) = self
                        .released
                        .wait_timeout(held, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner);
                    held = guard;
                }
            }
        }
    }

    /// Releases the lock and wakes all waiters.
    fn release(&self) {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        *held = false;
        drop(held);
        self.released.notify_all();
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Process-wide registry of named locks.
///
/// # Invariants
/// - One [`LockState`] per name for the registry's lifetime; states are
///   created on first use and never removed while the registry lives.
#[derive(Default)]
pub struct NamedLockRegistry {
    /// Lock states keyed by name.
    locks: Mutex<HashMap<String, Arc<LockState>>>,
}

impl NamedLockRegistry {
    /// Creates an empty lock registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared state for a name, creating it on first use.
    fn state(&self, name: &str) -> Arc<LockState> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(name.to_string()).or_insert_with(|| Arc::new(LockState::new())))
    }

    /// Acquires the named lock, blocking until it is available.
    #[must_use]
    pub fn lock(&self, name: &str) -> NamedLockGuard {
        let state = self.state(name);
        state.acquire(None);
        NamedLockGuard {
            state,
        }
    }

    /// Acquires the named lock with a bounded wait.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Timeout`] when the lock cannot be acquired
    /// within `wait`.
    pub fn lock_timeout(&self, name: &str, wait: Duration) -> Result<NamedLockGuard, LockError> {
        let state = self.state(name);
        let started = Instant::now();
        if state.acquire(Some(started + wait)) {
            Ok(NamedLockGuard {
                state,
            })
        } else {
            Err(LockError::Timeout {
                name: name.to_string(),
                waited_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            })
        }
    }
}

// ============================================================================
// SECTION: Guard
// ============================================================================

/// RAII guard for a held named lock.
///
/// # Invariants
/// - The lock is released exactly once, when the guard drops; this covers
///   early returns, error paths, and unwinding panics.
pub struct NamedLockGuard {
    /// State of the held lock.
    state: Arc<LockState>,
}

impl Drop for NamedLockGuard {
    fn drop(&mut self) {
        self.state.release();
    }
}
