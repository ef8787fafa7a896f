// crates/slab-registry-core/src/runtime/issuance.rs
// ============================================================================
// Module: Issuance Coordinator
// Description: The count-then-generate critical section for registry numbers.
// Purpose: Guarantee globally unique registry numbers under concurrent load.
// Dependencies: crate::core, crate::interfaces, crate::runtime, thiserror
// ============================================================================

//! ## Overview
//! The coordinator is the only stateful coordination point in Slab Registry.
//! Per issuance it acquires a named lock with a bounded wait, queries the
//! live submission count for the requester's class while holding the lock,
//! generates the registry number, assigns it, releases the lock, and only
//! then persists the record. The store offers no transactional
//! count-and-increment primitive; the lock makes the count-read-and-generate
//! window exclusive, which is what makes concurrent issuance safe.
//!
//! State machine per attempt: `Idle -> LockWait -> LockHeld(Counting) ->
//! LockHeld(Generated) -> Unlocked -> Persisting -> Done | Failed`. The lock
//! guard guarantees the transition out of `LockHeld` on every path.
//!
//! Two properties are deliberate and documented rather than bugs:
//! - Persistence runs outside the lock. A create failure after assignment
//!   permanently consumes the number, leaving a gap in the sequence;
//!   uniqueness, not density, is the invariant.
//! - The lock is process-local. Multi-replica deployments must switch to the
//!   store-side atomic counter instead of this coordinator's lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::RegistryNumber;
use crate::core::identifiers::RequesterClass;
use crate::core::submission::Submission;
use crate::core::time::Timestamp;
use crate::interfaces::CertificateRenderer;
use crate::interfaces::CertificateVault;
use crate::interfaces::NoticeReceipt;
use crate::interfaces::Notifier;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;
use crate::runtime::audit::AuditSink;
use crate::runtime::audit::IssuanceAuditEvent;
use crate::runtime::audit::IssuanceAuditEventParams;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::certify::CertificationPipeline;
use crate::runtime::certify::CertifyError;
use crate::runtime::lock::LockError;
use crate::runtime::lock::NamedLockRegistry;
use crate::runtime::registry_number::IssuancePlan;
use crate::runtime::registry_number::SequenceOverflowError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Global lock name guarding submission insertion.
pub const SUBMISSION_INSERTION_LOCK: &str = "SUBMISSION-INSERTION";

/// Default bounded wait for lock acquisition.
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Config
// ============================================================================

/// Lock name scoping for the issuance critical section.
///
/// # Invariants
/// - `Global` serializes issuance across all requester classes (compatible
///   default); `PerClass` serializes only within one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockScope {
    /// One lock name for every issuance.
    #[default]
    Global,
    /// One lock name per requester class.
    PerClass,
}

/// Issuance coordinator configuration.
///
/// # Invariants
/// - `lock_wait` must be non-zero; a zero wait rejects every contended
///   acquisition immediately.
#[derive(Debug, Clone, Copy)]
pub struct IssuanceConfig {
    /// Deployment constants for number generation.
    pub plan: IssuancePlan,
    /// Bounded wait for lock acquisition.
    pub lock_wait: Duration,
    /// Lock name scoping.
    pub lock_scope: LockScope,
}

impl IssuanceConfig {
    /// Creates a configuration with default lock wait and global scope.
    #[must_use]
    pub const fn new(plan: IssuancePlan) -> Self {
        Self {
            plan,
            lock_wait: DEFAULT_LOCK_WAIT,
            lock_scope: LockScope::Global,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Issuance errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Retryability is part of each variant's contract, documented below.
#[derive(Debug, Error)]
pub enum IssuanceError {
    /// Lock acquisition timed out. Retryable; no number was consumed.
    #[error(transparent)]
    LockTimeout(#[from] LockError),
    /// Count query failed inside the critical section. Retryable; the lock
    /// was released and no number was consumed.
    #[error("issuance count query failed: {0}")]
    CountQuery(#[source] StoreError),
    /// Sequence arithmetic overflowed. Not retryable without operator
    /// intervention.
    #[error(transparent)]
    SequenceOverflow(#[from] SequenceOverflowError),
    /// Persistence failed after number assignment. Fatal for that number;
    /// a retry generates a fresh number (which may repeat the sequence
    /// value when the failed create left nothing visible to the count).
    #[error("issuance persistence failed: {0}")]
    Persistence(#[source] StoreError),
    /// The certification tail failed after the record was created. The
    /// submission keeps its registry number; only certification needs retry.
    #[error("certification failed: {0}")]
    Certification(#[from] CertifyError),
}

impl IssuanceError {
    /// Returns a stable label for audit events.
    #[must_use]
    const fn kind(&self) -> &'static str {
        match self {
            Self::LockTimeout(_) => "lock_timeout",
            Self::CountQuery(_) => "count_query",
            Self::SequenceOverflow(_) => "sequence_overflow",
            Self::Persistence(_) => "persistence",
            Self::Certification(_) => "certification",
        }
    }
}

// ============================================================================
// SECTION: Coordinator
// ============================================================================

/// Sequences lock acquisition, counting, generation, and persistence.
///
/// # Invariants
/// - At most one thread is inside the count-read-and-generate window per
///   lock name at any time.
/// - The lock is released before persistence begins.
pub struct IssuanceCoordinator<S> {
    /// Submission record store.
    store: S,
    /// Named lock provider for the critical section.
    locks: Arc<NamedLockRegistry>,
    /// Coordinator configuration.
    config: IssuanceConfig,
    /// Audit sink for issuance attempts.
    audit: Arc<dyn AuditSink>,
}

impl<S: SubmissionStore> IssuanceCoordinator<S> {
    /// Creates a coordinator with a no-op audit sink.
    #[must_use]
    pub fn new(store: S, config: IssuanceConfig) -> Self {
        Self::with_audit(store, config, Arc::new(NoopAuditSink))
    }

    /// Creates a coordinator with an explicit audit sink and a private lock
    /// namespace.
    #[must_use]
    pub fn with_audit(store: S, config: IssuanceConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self::with_locks(store, config, Arc::new(NamedLockRegistry::new()), audit)
    }

    /// Creates a coordinator over a shared lock namespace.
    ///
    /// Exclusion is per registry: hosts that build more than one coordinator
    /// over the same store must pass the same registry to each so their
    /// critical sections exclude one another.
    #[must_use]
    pub fn with_locks(
        store: S,
        config: IssuanceConfig,
        locks: Arc<NamedLockRegistry>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            locks,
            config,
            audit,
        }
    }

    /// Returns the record store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the lock name for a requester class under the configured
    /// scope.
    #[must_use]
    pub fn lock_name(&self, class: RequesterClass) -> String {
        match self.config.lock_scope {
            LockScope::Global => SUBMISSION_INSERTION_LOCK.to_string(),
            LockScope::PerClass => format!("{SUBMISSION_INSERTION_LOCK}:{}", class.as_str()),
        }
    }

    /// Issues a registry number and persists the submission record.
    ///
    /// On success the submission carries its assigned number and has been
    /// created in the store. On failure no record exists; see
    /// [`IssuanceError`] for per-variant retry semantics.
    ///
    /// # Errors
    ///
    /// Returns [`IssuanceError`] when the lock wait expires, the count
    /// query fails, the sequence overflows, or persistence fails.
    pub fn issue(&self, submission: &mut Submission) -> Result<RegistryNumber, IssuanceError> {
        let class = submission.requester_class;
        let name = self.lock_name(class);
        let attempt = self.issue_locked(submission, &name);
        self.audit.record(&IssuanceAuditEvent::new(IssuanceAuditEventParams {
            tenant_id: submission.tenant_id.to_string(),
            submission_id: submission.submission_id.to_string(),
            requester_class: class.as_str(),
            lock_name: name,
            lock_wait_ms: attempt.lock_wait_ms,
            count: attempt.count,
            registry_number: attempt.consumed.as_ref().map(ToString::to_string),
            outcome: if attempt.result.is_ok() { "issued" } else { "failed" },
            error_kind: attempt.result.as_ref().err().map(IssuanceError::kind),
        }));
        attempt.result
    }

    /// Issues a registry number and runs the certification pipeline.
    ///
    /// The pipeline executes entirely outside the critical section. A
    /// pipeline failure leaves the created record (with its number) in
    /// place and surfaces as [`IssuanceError::Certification`].
    ///
    /// # Errors
    ///
    /// Returns [`IssuanceError`] when issuance or certification fails.
    pub fn issue_and_certify<V, N, R>(
        &self,
        submission: &mut Submission,
        pipeline: &CertificationPipeline<V, N, R>,
        notified_at: Timestamp,
    ) -> Result<NoticeReceipt, IssuanceError>
    where
        V: CertificateVault,
        N: Notifier,
        R: CertificateRenderer,
    {
        self.issue(submission)?;
        let receipt = pipeline.certify(&self.store, submission, notified_at)?;
        Ok(receipt)
    }

    /// Runs the critical section and persistence for one attempt.
    fn issue_locked(&self, submission: &mut Submission, name: &str) -> IssuanceAttempt {
        let class = submission.requester_class;
        let wait_started = Instant::now();
        let acquired = self.locks.lock_timeout(name, self.config.lock_wait);
        let lock_wait_ms = u64::try_from(wait_started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let guard = match acquired {
            Ok(guard) => guard,
            Err(error) => {
                return IssuanceAttempt::failed(IssuanceError::LockTimeout(error), lock_wait_ms);
            }
        };
        // Critical section: count and generate while no other issuer runs.
        let count = match self.store.count_issued(None, class) {
            Ok(count) => count,
            Err(error) => {
                return IssuanceAttempt::failed(IssuanceError::CountQuery(error), lock_wait_ms);
            }
        };
        let number = match self.config.plan.generate(class, count) {
            Ok(number) => number,
            Err(error) => {
                let mut attempt =
                    IssuanceAttempt::failed(IssuanceError::SequenceOverflow(error), lock_wait_ms);
                attempt.count = Some(count);
                return attempt;
            }
        };
        submission.registry_number = Some(number.clone());
        drop(guard);
        // Persistence is outside the lock: a failure here consumes the
        // number permanently (documented gap behavior).
        let result = match self.store.create(submission) {
            Ok(()) => Ok(number.clone()),
            Err(error) => {
                submission.registry_number = None;
                Err(IssuanceError::Persistence(error))
            }
        };
        IssuanceAttempt {
            lock_wait_ms,
            count: Some(count),
            consumed: Some(number),
            result,
        }
    }
}

/// Record of one issuance attempt for audit reporting.
struct IssuanceAttempt {
    /// Milliseconds spent waiting for the lock, persistence excluded.
    lock_wait_ms: u64,
    /// Count observed under the lock, when the query succeeded.
    count: Option<u64>,
    /// Number generated by the attempt, kept for auditing even when
    /// persistence failed and the number was consumed without a record.
    consumed: Option<RegistryNumber>,
    /// Final attempt result.
    result: Result<RegistryNumber, IssuanceError>,
}

impl IssuanceAttempt {
    /// Builds a failed attempt with no observed count or number.
    fn failed(error: IssuanceError, lock_wait_ms: u64) -> Self {
        Self {
            lock_wait_ms,
            count: None,
            consumed: None,
            result: Err(error),
        }
    }
}
