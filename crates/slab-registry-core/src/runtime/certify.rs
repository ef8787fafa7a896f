// crates/slab-registry-core/src/runtime/certify.rs
// ============================================================================
// Module: Certification Pipeline
// Description: Post-issuance render, vault upload, and notification tail.
// Purpose: Complete a certification after the registry number is assigned.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! The certification pipeline runs entirely outside the issuance critical
//! section: it renders the certificate document, stores it in the vault
//! under a key derived from the tenant and registry number, notifies
//! stakeholders, and marks the submission `Certified`. Pipeline failures
//! propagate to the caller but never roll back the registry number; the
//! submission record keeps its number and stays `Received` for a retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::RegistryNumber;
use crate::core::identifiers::TenantId;
use crate::core::submission::Submission;
use crate::core::submission::SubmissionStatus;
use crate::core::time::Timestamp;
use crate::interfaces::CertificateNotice;
use crate::interfaces::CertificateRenderer;
use crate::interfaces::CertificateVault;
use crate::interfaces::NoticeReceipt;
use crate::interfaces::Notifier;
use crate::interfaces::NotifyError;
use crate::interfaces::RenderError;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;
use crate::interfaces::VaultError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Certification pipeline errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - None of these failures revoke an assigned registry number.
#[derive(Debug, Error)]
pub enum CertifyError {
    /// The submission has no registry number yet.
    #[error("submission not issued: {0}")]
    NotIssued(String),
    /// Certificate rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Vault upload failed.
    #[error(transparent)]
    Vault(#[from] VaultError),
    /// Stakeholder notification failed.
    #[error(transparent)]
    Notify(#[from] NotifyError),
    /// Status update on the record store failed.
    #[error("certification status update failed: {0}")]
    Status(#[source] StoreError),
}

// ============================================================================
// SECTION: Vault Keys
// ============================================================================

/// Derives the vault key for a certified submission's document.
///
/// Both inputs render as plain decimal/dash segments, so the key contains no
/// separators beyond the fixed layout.
#[must_use]
pub fn certificate_key(tenant_id: TenantId, number: &RegistryNumber) -> String {
    format!("tenants/{tenant_id}/certificates/{number}")
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Post-issuance certification pipeline over collaborator seams.
///
/// # Invariants
/// - Runs outside the issuance critical section; holds no locks.
pub struct CertificationPipeline<V, N, R> {
    /// Certificate vault collaborator.
    vault: V,
    /// Notification collaborator.
    notifier: N,
    /// Document renderer collaborator.
    renderer: R,
}

impl<V, N, R> CertificationPipeline<V, N, R>
where
    V: CertificateVault,
    N: Notifier,
    R: CertificateRenderer,
{
    /// Creates a pipeline from its collaborators.
    pub const fn new(vault: V, notifier: N, renderer: R) -> Self {
        Self {
            vault,
            notifier,
            renderer,
        }
    }

    /// Renders, stores, and announces the certificate for an issued
    /// submission, then marks it `Certified` in the store.
    ///
    /// # Errors
    ///
    /// Returns [`CertifyError`] when any stage fails. The submission record
    /// and its registry number are left intact for a retry.
    pub fn certify<S: SubmissionStore>(
        &self,
        store: &S,
        submission: &mut Submission,
        notified_at: Timestamp,
    ) -> Result<NoticeReceipt, CertifyError> {
        let number = submission
            .registry_number
            .clone()
            .ok_or_else(|| CertifyError::NotIssued(submission.submission_id.to_string()))?;
        let document = self.renderer.render(submission)?;
        let key = certificate_key(submission.tenant_id, &number);
        self.vault.put(&key, document.bytes, &document.content_type)?;
        let receipt = self.notifier.notify(&CertificateNotice {
            tenant_id: submission.tenant_id,
            submission_id: submission.submission_id.clone(),
            registry_number: number,
            certificate_key: key,
            notified_at,
        })?;
        submission.status = SubmissionStatus::Certified;
        store.update_by_id(submission).map_err(CertifyError::Status)?;
        Ok(receipt)
    }
}
