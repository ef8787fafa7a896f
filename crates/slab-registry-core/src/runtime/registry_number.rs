// crates/slab-registry-core/src/runtime/registry_number.rs
// ============================================================================
// Module: Registry Number Generator
// Description: Pure mapping from (requester class, count) to a registry number.
// Purpose: Produce the bit-exact certificate identifier format.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The generator is a pure, deterministic function: identical inputs always
//! produce identical output, and it performs no I/O. Uniqueness of issued
//! numbers is guaranteed by the caller's locking discipline, not by the
//! generator; two calls with the same count yield the same number by design.
//!
//! Output format is fixed for compatibility:
//! `"{org_segment}-{product_segment}-{base_offset + count}"` with all three
//! segments rendered as plain decimal integers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::RegistryNumber;
use crate::core::identifiers::RequesterClass;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Sequence arithmetic overflowed the registry number domain.
///
/// # Invariants
/// - Only reachable when `base_offset + count` exceeds `u64::MAX`; the
///   generator is total over every smaller input.
#[derive(Debug, Error)]
#[error("registry sequence overflow for {class}: base {base_offset} + count {count}")]
pub struct SequenceOverflowError {
    /// Requester class of the failed issuance.
    pub class: RequesterClass,
    /// Configured base offset.
    pub base_offset: u64,
    /// Count at the time of generation.
    pub count: u64,
}

// ============================================================================
// SECTION: Issuance Plan
// ============================================================================

/// Deployment constants for registry number generation.
///
/// # Invariants
/// - Segments are fixed per deployment; changing them re-keys every issued
///   number and therefore requires a data migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuancePlan {
    /// First fixed segment (organization constant).
    pub org_segment: u64,
    /// Second fixed segment (product line constant).
    pub product_segment: u64,
    /// Starting value added to the live count to form the final segment.
    pub base_offset: u64,
}

impl IssuancePlan {
    /// Generates the registry number for a requester class and live count.
    ///
    /// Pure and deterministic; the class partitions the caller's counting
    /// domain and labels overflow errors but does not alter the segments.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceOverflowError`] when `base_offset + count` does not
    /// fit in a `u64`.
    pub fn generate(
        &self,
        class: RequesterClass,
        count: u64,
    ) -> Result<RegistryNumber, SequenceOverflowError> {
        let sequence = self.base_offset.checked_add(count).ok_or(SequenceOverflowError {
            class,
            base_offset: self.base_offset,
            count,
        })?;
        Ok(RegistryNumber::new(format!(
            "{}-{}-{}",
            self.org_segment, self.product_segment, sequence
        )))
    }
}
