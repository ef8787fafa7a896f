// crates/slab-registry-core/src/runtime/mod.rs
// ============================================================================
// Module: Runtime
// Description: Issuance protocol runtime and supporting machinery.
// Purpose: Hold the lock provider, number generator, issuance coordinator,
//          certification pipeline, audit sinks, and in-memory references.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime layer drives the issuance protocol end to end: a named
//! mutual-exclusion registry guards the count-then-generate window, the
//! generator derives registry numbers from a count, and the coordinator
//! sequences lock, count, generate, release, and persist. Certification
//! and audit sit alongside; in-memory collaborators back the tests.

/// Audit events and sinks for issuance attempts.
pub mod audit;
/// Certification pipeline: render, archive, notify, and mark certified.
pub mod certify;
/// Issuance coordinator sequencing the protocol steps.
pub mod issuance;
/// Named mutual-exclusion registry with guard-scoped ownership.
pub mod lock;
/// In-memory reference implementations of the collaborator seams.
pub mod memory;
/// Pure registry-number generation from a count and an issuance plan.
pub mod registry_number;

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::IssuanceAuditEvent;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use certify::CertificationPipeline;
pub use certify::CertifyError;
pub use certify::certificate_key;
pub use issuance::DEFAULT_LOCK_WAIT;
pub use issuance::IssuanceConfig;
pub use issuance::IssuanceCoordinator;
pub use issuance::IssuanceError;
pub use issuance::LockScope;
pub use issuance::SUBMISSION_INSERTION_LOCK;
pub use lock::LockError;
pub use lock::NamedLockGuard;
pub use lock::NamedLockRegistry;
pub use memory::ChannelNotifier;
pub use memory::InMemoryCertificateVault;
pub use memory::InMemorySessionCache;
pub use memory::InMemorySubmissionStore;
pub use memory::NoopNotifier;
pub use memory::PlainTextRenderer;
pub use registry_number::IssuancePlan;
pub use registry_number::SequenceOverflowError;
