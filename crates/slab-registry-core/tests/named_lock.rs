// crates/slab-registry-core/tests/named_lock.rs
// ============================================================================
// Module: Named Lock Tests
// Description: Exercises mutual exclusion, bounded waits, and guard release.
// ============================================================================
//! ## Overview
//! Validates the named-lock registry: exclusion per name, independence
//! across names, timeout behavior, and release on every exit path.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use slab_registry_core::runtime::LockError;
use slab_registry_core::runtime::NamedLockRegistry;

#[test]
fn holders_of_one_name_never_overlap() {
    let registry = Arc::new(NamedLockRegistry::new());
    let active = Arc::new(AtomicU32::new(0));
    let peak = Arc::new(AtomicU32::new(0));
    let mut handles = Vec::new();
    for _ in 0..16 {
        let registry = Arc::clone(&registry);
        let active = Arc::clone(&active);
        let peak = Arc::clone(&peak);
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                let guard = registry.lock("SUBMISSION-INSERTION");
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                active.fetch_sub(1, Ordering::SeqCst);
                drop(guard);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(peak.load(Ordering::SeqCst), 1, "two threads held the same name at once");
}

#[test]
fn distinct_names_do_not_block_each_other() {
    let registry = NamedLockRegistry::new();
    let first = registry.lock("SUBMISSION-INSERTION:retailer");
    let second = registry
        .lock_timeout("SUBMISSION-INSERTION:collector", Duration::from_millis(50))
        .unwrap();
    drop(first);
    drop(second);
}

#[test]
fn bounded_wait_expires_with_timeout_error() {
    let registry = NamedLockRegistry::new();
    let held = registry.lock("SUBMISSION-INSERTION");
    let result = registry.lock_timeout("SUBMISSION-INSERTION", Duration::from_millis(25));
    match result {
        Err(LockError::Timeout {
            name,
            waited_ms,
        }) => {
            assert_eq!(name, "SUBMISSION-INSERTION");
            assert!(waited_ms >= 25, "reported wait shorter than the bound: {waited_ms}");
        }
        Ok(_guard) => panic!("acquired a lock another guard still holds"),
    }
    drop(held);
}

#[test]
fn release_makes_waiter_succeed() {
    let registry = Arc::new(NamedLockRegistry::new());
    let held = registry.lock("SUBMISSION-INSERTION");
    let waiter = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            registry.lock_timeout("SUBMISSION-INSERTION", Duration::from_secs(5)).map(drop)
        })
    };
    thread::sleep(Duration::from_millis(20));
    drop(held);
    waiter.join().unwrap().unwrap();
}

#[test]
fn guard_releases_on_panic() {
    let registry = NamedLockRegistry::new();
    let result = catch_unwind(AssertUnwindSafe(|| {
        let _guard = registry.lock("SUBMISSION-INSERTION");
        panic!("holder panicked inside the critical section");
    }));
    assert!(result.is_err());
    // A panicked holder must not leave the name held forever.
    registry
        .lock_timeout("SUBMISSION-INSERTION", Duration::from_millis(100))
        .unwrap();
}

#[test]
fn reacquire_after_drop_is_immediate() {
    let registry = NamedLockRegistry::new();
    for _ in 0..100 {
        let guard = registry.lock_timeout("SUBMISSION-INSERTION", Duration::from_millis(10)).unwrap();
        drop(guard);
    }
}
