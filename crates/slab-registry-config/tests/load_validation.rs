//! Config load validation tests for slab-registry-config.
// crates/slab-registry-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use slab_registry_config::ConfigError;
use slab_registry_config::SlabRegistryConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<SlabRegistryConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(SlabRegistryConfig::load(path), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(SlabRegistryConfig::load(path), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_empty_path() -> TestResult {
    assert_invalid(SlabRegistryConfig::load(Path::new("")), "config path must not be empty")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(SlabRegistryConfig::load(file.path()), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(SlabRegistryConfig::load(file.path()), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_accepts_complete_document() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(
        br#"
[issuance]
org_segment = 788346
product_segment = 26649
base_offset = 1001
lock_wait_ms = 10000
lock_scope = "global"

[store]
path = "/var/lib/slab-registry/registry.db"
busy_timeout_ms = 5000
journal_mode = "wal"
sync_mode = "full"

[vault]
bucket = "slab-certificates"
prefix = "prod"
max_certificate_bytes = 524288

[notify]
enabled = true
sender = "registry@example.com"
"#,
    )
    .map_err(|err| err.to_string())?;
    let config = SlabRegistryConfig::load(file.path()).map_err(|err| err.to_string())?;
    let plan = config.issuance.plan();
    if plan.org_segment != 788_346 || plan.product_segment != 26_649 || plan.base_offset != 1_001 {
        return Err(format!("unexpected issuance plan: {plan:?}"));
    }
    Ok(())
}
