// crates/slab-registry-store-sqlite/src/lib.rs
// ============================================================================
// Module: Slab Registry SQLite Store
// Description: Durable SubmissionStore backed by SQLite.
// Purpose: Persist submission records and provide the atomic counter source.
// Dependencies: slab-registry-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Durable [`slab_registry_core::SubmissionStore`] implementation on
//! `SQLite` with WAL support, a `UNIQUE` registry-number constraint as the
//! last-resort uniqueness backstop, and an atomic `next_sequence` counter
//! for deployments where a process-local lock cannot serialize issuance.

pub mod store;

pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSubmissionStore;
pub use store::SqliteSyncMode;
