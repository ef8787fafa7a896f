// crates/slab-registry-core/src/core/identifiers.rs
// ============================================================================
// Module: Slab Registry Identifiers
// Description: Canonical opaque identifiers for tenants and submissions.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Slab
//! Registry. Identifiers are opaque and serialize as numbers or strings on
//! the wire. Numeric identifiers enforce non-zero, 1-based invariants at
//! construction boundaries. [`RegistryNumber`] is the externally visible
//! certificate identifier; it is assigned exactly once per submission and
//! never recycled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Tenant identifier scoping submissions to one organization.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(NonZeroU64);

impl TenantId {
    /// Creates a new tenant identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates a tenant identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Submission identifier scoped to a tenant.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Creates a new submission identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SubmissionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SubmissionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Registry number assigned to a certified submission.
///
/// # Invariants
/// - Unique across all submissions for the lifetime of the system.
/// - Immutable once assigned; never reassigned or recycled, even after the
///   owning submission is archived.
/// - Wire form is three dash-joined decimal segments (`"%d-%d-%d"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryNumber(String);

impl RegistryNumber {
    /// Creates a registry number from its canonical string form.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the registry number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistryNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Requester Class
// ============================================================================

/// Closed set of caller roles that partition the issuance counting domain.
///
/// # Invariants
/// - Labels are stable wire/storage values; adding a variant is a schema
///   change for every store implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequesterClass {
    /// Administrator-issued submissions.
    Administrator,
    /// Retailer-issued submissions.
    Retailer,
    /// Self-service collector submissions.
    Collector,
}

impl RequesterClass {
    /// Returns the stable storage label for this class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Retailer => "retailer",
            Self::Collector => "collector",
        }
    }

    /// Parses a storage label back into a requester class.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "administrator" => Some(Self::Administrator),
            "retailer" => Some(Self::Retailer),
            "collector" => Some(Self::Collector),
            _ => None,
        }
    }

    /// Returns every requester class in stable order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Administrator, Self::Retailer, Self::Collector]
    }
}

impl fmt::Display for RequesterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
