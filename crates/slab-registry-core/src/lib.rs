// crates/slab-registry-core/src/lib.rs
// ============================================================================
// Module: Slab Registry Core
// Description: Domain model and issuance protocol for comic certification.
// Purpose: Provide the registry-number issuance core and collaborator seams.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Slab Registry Core defines the domain model for graded comic-book
//! submissions and the registry-number issuance protocol: a named
//! mutual-exclusion provider, a pure number generator, and the issuance
//! coordinator that sequences lock acquisition, live counting, generation,
//! and persistence so any two concurrent submissions receive distinct
//! registry numbers.
//!
//! External collaborators (record store, certificate vault, notifier,
//! renderer, session cache) are trait seams defined in [`interfaces`];
//! implementations live in sibling crates or host code.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use core::identifiers::RegistryNumber;
pub use core::identifiers::RequesterClass;
pub use core::identifiers::SubmissionId;
pub use core::identifiers::TenantId;
pub use core::submission::ComicDescription;
pub use core::submission::GradeFindings;
pub use core::submission::Submission;
pub use core::submission::SubmissionStatus;
pub use core::time::Timestamp;
pub use interfaces::CacheError;
pub use interfaces::CertificateDocument;
pub use interfaces::CertificateNotice;
pub use interfaces::CertificateRenderer;
pub use interfaces::CertificateVault;
pub use interfaces::NoticeReceipt;
pub use interfaces::Notifier;
pub use interfaces::NotifyError;
pub use interfaces::RenderError;
pub use interfaces::SessionCache;
pub use interfaces::StoreError;
pub use interfaces::SubmissionStore;
pub use interfaces::VaultError;
