// crates/slab-registry-core/src/core/mod.rs
// ============================================================================
// Module: Core Domain Model
// Description: Identifiers, timestamps, and submission records.
// Purpose: Group the serializable domain types used across Slab Registry.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The core domain model: strongly typed identifiers, explicit timestamps,
//! and the submission entity that owns a registry number for its lifetime.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identifiers;
pub mod submission;
pub mod time;
