// crates/slab-registry-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Submission Store
// Description: Durable SubmissionStore backed by SQLite WAL.
// Purpose: Persist submission records with a uniqueness backstop.
// Dependencies: slab-registry-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`SubmissionStore`] using `SQLite`. Each
//! record is stored as a JSON snapshot alongside indexed columns for the
//! queries the issuance protocol depends on: a class-filtered count and a
//! `UNIQUE` constraint on the registry number. The constraint is the final
//! backstop: even if lock discipline is violated, a duplicate number is a
//! [`StoreError::Conflict`], never a silently corrupted registry.
//!
//! The store also provides [`SqliteSubmissionStore::next_sequence`], a
//! single-statement atomic fetch-and-add. Multi-replica deployments, where a
//! process-local lock cannot serialize issuance, use it as the counter
//! source instead of the count query.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use slab_registry_core::RegistryNumber;
use slab_registry_core::RequesterClass;
use slab_registry_core::StoreError;
use slab_registry_core::Submission;
use slab_registry_core::SubmissionId;
use slab_registry_core::SubmissionStore;
use slab_registry_core::TenantId;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum serialized submission record size accepted by the store.
pub const MAX_RECORD_BYTES: usize = 256 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` submission store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw submission payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Uniqueness conflict on submission id or registry number.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// Stored payload failed deserialization.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::Corrupt(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Store(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "record exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed submission store with WAL support.
///
/// # Invariants
/// - `registry_number` carries a `UNIQUE` constraint; duplicate numbers are
///   rejected at the engine level regardless of caller discipline.
/// - `SQLite` connection access is serialized through a mutex.
#[derive(Clone)]
pub struct SqliteSubmissionStore {
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSubmissionStore {
    /// Opens an `SQLite`-backed submission store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }

    /// Atomically allocates the next zero-based sequence index for a class.
    ///
    /// The counter is stored in the database, so every replica sharing the
    /// file observes one monotone, gap-free allocation order. This is the
    /// counter source for multi-replica deployments; single-process
    /// deployments may keep using the lock-serialized count query instead.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the counter update fails.
    pub fn next_sequence(&self, class: RequesterClass) -> Result<u64, SqliteStoreError> {
        let connection = self.connection()?;
        let allocated: i64 = connection
            .query_row(
                "INSERT INTO issuance_counters (requester_class, next_value)
                 VALUES (?1, 1)
                 ON CONFLICT(requester_class)
                 DO UPDATE SET next_value = next_value + 1
                 RETURNING next_value",
                params![class.as_str()],
                |row| row.get(0),
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        // RETURNING yields the post-increment value; callers want the
        // zero-based index of this allocation.
        u64::try_from(allocated - 1)
            .map_err(|_| SqliteStoreError::Corrupt(format!("negative counter value: {allocated}")))
    }

    /// Serializes a submission and validates the payload size.
    fn encode_record(submission: &Submission) -> Result<String, SqliteStoreError> {
        let payload = serde_json::to_string(submission)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if payload.len() > MAX_RECORD_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_RECORD_BYTES,
                actual_bytes: payload.len(),
            });
        }
        Ok(payload)
    }
}

impl SubmissionStore for SqliteSubmissionStore {
    fn count_issued(
        &self,
        tenant_id: Option<TenantId>,
        class: RequesterClass,
    ) -> Result<u64, StoreError> {
        let connection = self.connection().map_err(StoreError::from)?;
        let count: i64 = match tenant_id {
            Some(tenant) => connection
                .query_row(
                    "SELECT COUNT(*) FROM submissions
                     WHERE registry_number IS NOT NULL
                       AND requester_class = ?1
                       AND tenant_id = ?2",
                    params![class.as_str(), tenant.to_string()],
                    |row| row.get(0),
                )
                .map_err(|err| StoreError::Store(err.to_string()))?,
            None => connection
                .query_row(
                    "SELECT COUNT(*) FROM submissions
                     WHERE registry_number IS NOT NULL
                       AND requester_class = ?1",
                    params![class.as_str()],
                    |row| row.get(0),
                )
                .map_err(|err| StoreError::Store(err.to_string()))?,
        };
        u64::try_from(count).map_err(|err| StoreError::Store(err.to_string()))
    }

    fn create(&self, submission: &Submission) -> Result<(), StoreError> {
        let payload = Self::encode_record(submission).map_err(StoreError::from)?;
        let connection = self.connection().map_err(StoreError::from)?;
        let result = connection.execute(
            "INSERT INTO submissions
                 (tenant_id, submission_id, requester_class, registry_number, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                submission.tenant_id.to_string(),
                submission.submission_id.as_str(),
                submission.requester_class.as_str(),
                submission.registry_number.as_ref().map(RegistryNumber::as_str),
                payload,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Conflict(format!(
                    "submission id or registry number already exists: {}",
                    submission.submission_id
                )))
            }
            Err(err) => Err(StoreError::Store(err.to_string())),
        }
    }

    fn update_by_id(&self, submission: &Submission) -> Result<(), StoreError> {
        let payload = Self::encode_record(submission).map_err(StoreError::from)?;
        let connection = self.connection().map_err(StoreError::from)?;
        let result = connection.execute(
            "UPDATE submissions
             SET requester_class = ?3, registry_number = ?4, payload = ?5
             WHERE tenant_id = ?1 AND submission_id = ?2",
            params![
                submission.tenant_id.to_string(),
                submission.submission_id.as_str(),
                submission.requester_class.as_str(),
                submission.registry_number.as_ref().map(RegistryNumber::as_str),
                payload,
            ],
        );
        match result {
            Ok(0) => Err(StoreError::Invalid(format!(
                "no such submission: {}",
                submission.submission_id
            ))),
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Conflict(format!(
                    "registry number already exists: {}",
                    submission.submission_id
                )))
            }
            Err(err) => Err(StoreError::Store(err.to_string())),
        }
    }

    fn load(
        &self,
        tenant_id: TenantId,
        submission_id: &SubmissionId,
    ) -> Result<Option<Submission>, StoreError> {
        let connection = self.connection().map_err(StoreError::from)?;
        let payload: Option<String> = connection
            .query_row(
                "SELECT payload FROM submissions
                 WHERE tenant_id = ?1 AND submission_id = ?2",
                params![tenant_id.to_string(), submission_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Store(err.to_string()))?;
        match payload {
            None => Ok(None),
            Some(payload) => {
                let submission: Submission = serde_json::from_str(&payload).map_err(|err| {
                    StoreError::from(SqliteStoreError::Corrupt(err.to_string()))
                })?;
                Ok(Some(submission))
            }
        }
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let connection = self.connection().map_err(StoreError::from)?;
        connection
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|err| StoreError::Store(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS submissions (
                     tenant_id TEXT NOT NULL,
                     submission_id TEXT NOT NULL,
                     requester_class TEXT NOT NULL,
                     registry_number TEXT UNIQUE,
                     payload TEXT NOT NULL,
                     PRIMARY KEY (tenant_id, submission_id)
                 );
                 CREATE INDEX IF NOT EXISTS idx_submissions_class
                     ON submissions (requester_class);
                 CREATE TABLE IF NOT EXISTS issuance_counters (
                     requester_class TEXT PRIMARY KEY,
                     next_value INTEGER NOT NULL
                 );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(found) if found == SCHEMA_VERSION => {}
        Some(found) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "expected schema version {SCHEMA_VERSION}, found {found}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
}
