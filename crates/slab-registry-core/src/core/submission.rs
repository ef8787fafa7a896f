// crates/slab-registry-core/src/core/submission.rs
// ============================================================================
// Module: Submission Records
// Description: The owning entity for a registry number and its grade findings.
// Purpose: Model a graded comic-book submission through its lifecycle.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Submission`] is created once per grading request and holds exactly one
//! [`RegistryNumber`] for its lifetime. The number is assigned by the
//! issuance coordinator inside its critical section and is never mutated or
//! recycled afterwards, even when the submission is later archived.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RegistryNumber;
use crate::core::identifiers::RequesterClass;
use crate::core::identifiers::SubmissionId;
use crate::core::identifiers::TenantId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Comic Metadata
// ============================================================================

/// Descriptive metadata for the submitted comic book.
///
/// # Invariants
/// - Fields are caller-supplied and opaque to the issuance protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicDescription {
    /// Series title.
    pub title: String,
    /// Issue number within the series, as printed (e.g. "1", "Annual 3").
    pub issue: String,
    /// Publication year.
    pub publication_year: u16,
    /// Publisher name.
    pub publisher: String,
}

/// Condition findings recorded by the grader.
///
/// # Invariants
/// - `grade_tenths` encodes the half-point scale as tenths (5 = 0.5, 100 = 10.0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeFindings {
    /// Assigned grade in tenths of a point (5 ..= 100).
    pub grade_tenths: u16,
    /// Free-form condition notes from the grading bench.
    pub condition_notes: Vec<String>,
}

impl GradeFindings {
    /// Lowest encodable grade (0.5).
    pub const MIN_GRADE_TENTHS: u16 = 5;
    /// Highest encodable grade (10.0).
    pub const MAX_GRADE_TENTHS: u16 = 100;

    /// Returns `true` when the grade falls on the valid half-point scale.
    #[must_use]
    pub const fn grade_in_range(&self) -> bool {
        self.grade_tenths >= Self::MIN_GRADE_TENTHS
            && self.grade_tenths <= Self::MAX_GRADE_TENTHS
            && self.grade_tenths % 5 == 0
    }
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Submission lifecycle status.
///
/// # Invariants
/// - Status transitions never clear an assigned registry number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Received and recorded; certificate pipeline not yet complete.
    Received,
    /// Certified; certificate rendered, stored, and stakeholders notified.
    Certified,
    /// Archived; retained for the registry, no longer active.
    Archived,
}

// ============================================================================
// SECTION: Submission
// ============================================================================

/// A graded comic-book submission.
///
/// # Invariants
/// - `registry_number` is `None` until issuance and is set exactly once.
/// - `tenant_id` and `submission_id` together identify the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Submission identifier, unique within the tenant.
    pub submission_id: SubmissionId,
    /// Role of the user who created the submission.
    pub requester_class: RequesterClass,
    /// Comic metadata supplied with the request.
    pub comic: ComicDescription,
    /// Grader condition findings.
    pub findings: GradeFindings,
    /// Assigned registry number, if issuance has completed.
    pub registry_number: Option<RegistryNumber>,
    /// Lifecycle status.
    pub status: SubmissionStatus,
    /// Creation timestamp supplied by the caller.
    pub created_at: Timestamp,
}

impl Submission {
    /// Creates a new submission awaiting issuance.
    #[must_use]
    pub const fn new(
        tenant_id: TenantId,
        submission_id: SubmissionId,
        requester_class: RequesterClass,
        comic: ComicDescription,
        findings: GradeFindings,
        created_at: Timestamp,
    ) -> Self {
        Self {
            tenant_id,
            submission_id,
            requester_class,
            comic,
            findings,
            registry_number: None,
            status: SubmissionStatus::Received,
            created_at,
        }
    }

    /// Returns `true` once a registry number has been assigned.
    #[must_use]
    pub const fn is_issued(&self) -> bool {
        self.registry_number.is_some()
    }
}
