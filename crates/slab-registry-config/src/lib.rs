// crates/slab-registry-config/src/lib.rs
// ============================================================================
// Module: Slab Registry Config
// Description: Canonical configuration model with fail-closed loading.
// Purpose: Parse and validate deployment configuration for the registry.
// Dependencies: slab-registry-core, slab-registry-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Deployment configuration for Slab Registry. A single TOML document
//! carries the issuance plan constants, lock tuning, the `SQLite` store
//! settings, vault limits, and notification settings. Loading is strict and
//! fail-closed: unknown fields, oversized files, non-UTF-8 bytes, and
//! invalid values are rejected before any component starts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use slab_registry_core::runtime::IssuanceConfig;
use slab_registry_core::runtime::IssuancePlan;
use slab_registry_core::runtime::LockScope;
use slab_registry_store_sqlite::SqliteStoreConfig;
use slab_registry_store_sqlite::SqliteStoreMode;
use slab_registry_store_sqlite::SqliteSyncMode;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted config file size in bytes.
const MAX_CONFIG_BYTES: u64 = 1_048_576;
/// Maximum length of a single config path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total config path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bounded lock wait in milliseconds.
const DEFAULT_LOCK_WAIT_MS: u64 = 10_000;
/// Default maximum certificate document size in bytes.
const DEFAULT_MAX_CERTIFICATE_BYTES: usize = 1_048_576;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config path failed validation.
    #[error("config path error: {0}")]
    Path(String),
    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// Config file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config contents failed validation.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Issuance protocol settings.
///
/// # Invariants
/// - `lock_wait_ms` must be greater than zero.
/// - Changing the plan segments re-keys every issued number; treat them as
///   fixed per deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuanceSection {
    /// First fixed registry-number segment (organization constant).
    pub org_segment: u64,
    /// Second fixed registry-number segment (product line constant).
    pub product_segment: u64,
    /// Starting value added to the live count to form the final segment.
    pub base_offset: u64,
    /// Bounded lock wait in milliseconds.
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,
    /// Lock name scoping.
    #[serde(default)]
    pub lock_scope: LockScope,
}

/// Returns the default bounded lock wait in milliseconds.
const fn default_lock_wait_ms() -> u64 {
    DEFAULT_LOCK_WAIT_MS
}

impl IssuanceSection {
    /// Returns the issuance plan constants.
    #[must_use]
    pub const fn plan(&self) -> IssuancePlan {
        IssuancePlan {
            org_segment: self.org_segment,
            product_segment: self.product_segment,
            base_offset: self.base_offset,
        }
    }

    /// Returns the full coordinator configuration.
    #[must_use]
    pub const fn issuance_config(&self) -> IssuanceConfig {
        IssuanceConfig {
            plan: self.plan(),
            lock_wait: Duration::from_millis(self.lock_wait_ms),
            lock_scope: self.lock_scope,
        }
    }
}

/// Store backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
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

/// Returns the default `SQLite` busy timeout in milliseconds.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl StoreSection {
    /// Returns the `SQLite` store configuration.
    #[must_use]
    pub fn store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }
}

/// Certificate vault settings.
///
/// Only the shape is validated here; the vault collaborator interprets the
/// bucket and prefix for its backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaultSection {
    /// Vault bucket or container name.
    #[serde(default)]
    pub bucket: Option<String>,
    /// Key prefix prepended to certificate keys.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Maximum certificate document size in bytes.
    #[serde(default = "default_max_certificate_bytes")]
    pub max_certificate_bytes: usize,
}

/// Returns the default maximum certificate document size.
const fn default_max_certificate_bytes() -> usize {
    DEFAULT_MAX_CERTIFICATE_BYTES
}

impl Default for VaultSection {
    fn default() -> Self {
        Self {
            bucket: None,
            prefix: None,
            max_certificate_bytes: DEFAULT_MAX_CERTIFICATE_BYTES,
        }
    }
}

/// Notification settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifySection {
    /// Whether certification notices are delivered at all.
    #[serde(default)]
    pub enabled: bool,
    /// Sender address for certification notices.
    #[serde(default)]
    pub sender: Option<String>,
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Top-level deployment configuration.
///
/// # Invariants
/// - Parsing is strict: unknown fields anywhere in the document are errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlabRegistryConfig {
    /// Issuance protocol settings.
    pub issuance: IssuanceSection,
    /// Store backend settings.
    pub store: StoreSection,
    /// Certificate vault settings.
    #[serde(default)]
    pub vault: VaultSection,
    /// Notification settings.
    #[serde(default)]
    pub notify: NotifySection,
}

impl SlabRegistryConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the path fails validation, the file
    /// cannot be read, parsing fails, or the contents fail validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        validate_config_path(path)?;
        let metadata =
            std::fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Invalid(format!(
                "config file exceeds size limit: {} bytes (max {MAX_CONFIG_BYTES})",
                metadata.len()
            )));
        }
        let bytes = std::fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::parse(&text)
    }

    /// Parses and validates configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates field values beyond what parsing enforces.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuance.lock_wait_ms == 0 {
            return Err(ConfigError::Invalid(
                "issuance.lock_wait_ms must be greater than zero".to_string(),
            ));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must not be empty".to_string()));
        }
        if self.vault.max_certificate_bytes == 0 {
            return Err(ConfigError::Invalid(
                "vault.max_certificate_bytes must be greater than zero".to_string(),
            ));
        }
        if let Some(bucket) = &self.vault.bucket
            && bucket.is_empty()
        {
            return Err(ConfigError::Invalid("vault.bucket must not be empty".to_string()));
        }
        if let Some(sender) = &self.notify.sender
            && !sender.contains('@')
        {
            return Err(ConfigError::Invalid(
                "notify.sender must be a mail address".to_string(),
            ));
        }
        if self.notify.enabled && self.notify.sender.is_none() {
            return Err(ConfigError::Invalid(
                "notify.sender is required when notify.enabled is true".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates config paths for safety limits.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Path("config path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Path("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Path("config path component too long".to_string()));
        }
    }
    Ok(())
}
