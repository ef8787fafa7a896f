// crates/slab-registry-core/src/core/time.rs
// ============================================================================
// Module: Slab Registry Time Model
// Description: Canonical timestamp representations for records and audit logs.
// Purpose: Provide deterministic, replayable time values across registry records.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Slab Registry uses explicit time values embedded in submissions and audit
//! records to keep issuance replayable. The core protocol never reads
//! wall-clock time directly; hosts supply timestamps with each request, and
//! tests use logical time for determinism.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in submission records and audit logs.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Builds a unix-millisecond timestamp from a UTC datetime.
    #[must_use]
    pub fn from_datetime(datetime: OffsetDateTime) -> Self {
        let millis = datetime.unix_timestamp_nanos() / 1_000_000;
        Self::UnixMillis(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }
}
