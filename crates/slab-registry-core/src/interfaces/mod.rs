// crates/slab-registry-core/src/interfaces/mod.rs
// ============================================================================
// Module: Slab Registry Interfaces
// Description: Backend-agnostic interfaces for storage, vault, mail, and cache.
// Purpose: Define the contract surfaces used by the issuance runtime.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Slab Registry integrates with external systems
//! without embedding backend-specific details. The issuance protocol only
//! requires these narrow contracts: a record store that can count and create
//! submissions, a certificate vault for rendered documents, a notifier for
//! stakeholder email, a renderer seam, and a session cache.
//!
//! The store contract carries the one consistency obligation the protocol
//! depends on: counts must reflect all prior writes made under the same lock
//! serialization (read-your-writes within the single-process lock window).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::RegistryNumber;
use crate::core::identifiers::RequesterClass;
use crate::core::identifiers::SubmissionId;
use crate::core::identifiers::TenantId;
use crate::core::submission::Submission;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Submission Store
// ============================================================================

/// Submission store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages avoid embedding raw submission metadata.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("submission store io error: {0}")]
    Io(String),
    /// Store data is invalid.
    #[error("submission store invalid data: {0}")]
    Invalid(String),
    /// Uniqueness conflict (duplicate submission id or registry number).
    #[error("submission store conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("submission store error: {0}")]
    Store(String),
}

/// Record store for submissions.
///
/// Implementations must provide a consistent count-as-of-read and a durable
/// create: any record created before a `count_issued` call on the same
/// store, under the caller's lock serialization, must be visible to that
/// count.
pub trait SubmissionStore {
    /// Counts submissions with an assigned registry number for a requester
    /// class, optionally scoped to a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the count query fails.
    fn count_issued(
        &self,
        tenant_id: Option<TenantId>,
        class: RequesterClass,
    ) -> Result<u64, StoreError>;

    /// Persists a new submission record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the submission id or registry
    /// number already exists, or another [`StoreError`] when the write fails.
    fn create(&self, submission: &Submission) -> Result<(), StoreError>;

    /// Updates an existing submission record by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record is missing or the write fails.
    fn update_by_id(&self, submission: &Submission) -> Result<(), StoreError>;

    /// Loads a submission by tenant and identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(
        &self,
        tenant_id: TenantId,
        submission_id: &SubmissionId,
    ) -> Result<Option<Submission>, StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Certificate Vault
// ============================================================================

/// Certificate vault errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Invalid key or configuration input.
    #[error("certificate vault invalid: {0}")]
    Invalid(String),
    /// Backend I/O failure.
    #[error("certificate vault io error: {0}")]
    Io(String),
    /// Backend returned an error.
    #[error("certificate vault backend error: {0}")]
    Backend(String),
    /// Object exceeds size limits.
    #[error("certificate too large: {key} ({actual_bytes} > {max_bytes})")]
    TooLarge {
        /// Object key.
        key: String,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual size in bytes.
        actual_bytes: usize,
    },
}

/// Blob store contract for rendered certificate documents.
pub trait CertificateVault {
    /// Writes a certificate object under the given key.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] when the write fails.
    fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), VaultError>;

    /// Reads a certificate object with a size limit.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] when the read fails or the object exceeds
    /// `max_bytes`.
    fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, VaultError>;
}

// ============================================================================
// SECTION: Certificate Renderer
// ============================================================================

/// Rendered certificate document.
///
/// # Invariants
/// - `bytes` is the complete document; rendering internals are out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDocument {
    /// Document bytes.
    pub bytes: Vec<u8>,
    /// Content type of the document.
    pub content_type: String,
}

/// Renderer errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template filling failed.
    #[error("certificate render failed: {0}")]
    RenderFailed(String),
}

/// Template-fill seam for certificate documents.
///
/// The issuance core treats rendering as an external collaborator; only the
/// submission (with its assigned registry number) crosses this boundary.
pub trait CertificateRenderer {
    /// Renders the certificate document for an issued submission.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when rendering fails.
    fn render(&self, submission: &Submission) -> Result<CertificateDocument, RenderError>;
}

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// Stakeholder notification payload for a completed certification.
///
/// # Invariants
/// - `registry_number` matches the persisted submission record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateNotice {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Certified submission identifier.
    pub submission_id: SubmissionId,
    /// Assigned registry number.
    pub registry_number: RegistryNumber,
    /// Vault key of the stored certificate document.
    pub certificate_key: String,
    /// Notification timestamp supplied by the caller.
    pub notified_at: Timestamp,
}

/// Receipt returned after successful notification delivery.
///
/// # Invariants
/// - Receipts are returned only after successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeReceipt {
    /// Delivery identifier assigned by the notifier.
    pub delivery_id: String,
}

/// Notifier errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Notification delivery failed.
    #[error("notification delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Email contract for certification notices.
pub trait Notifier {
    /// Delivers a certificate notice to stakeholders.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails.
    fn notify(&self, notice: &CertificateNotice) -> Result<NoticeReceipt, NotifyError>;
}

// ============================================================================
// SECTION: Session Cache
// ============================================================================

/// Session cache errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Cache backend reported an error.
    #[error("session cache error: {0}")]
    Backend(String),
}

/// Key-value session cache contract.
///
/// The issuance core does not touch sessions itself; the contract is defined
/// here so hosts and stores share one surface.
pub trait SessionCache {
    /// Stores a value under a key with a time-to-live in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the write fails.
    fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;

    /// Returns the value stored under a key, if present and unexpired.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the read fails.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Removes the value stored under a key.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the removal fails.
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}
