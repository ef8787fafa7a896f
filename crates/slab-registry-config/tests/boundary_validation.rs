//! Boundary validation tests for slab-registry-config.
// crates/slab-registry-config/tests/boundary_validation.rs
// =============================================================================
// Module: Boundary Validation Tests
// Description: Tests for value boundaries, defaults, and strict parsing.
// Purpose: Ensure configuration validation fails closed at every edge.
// =============================================================================

use std::time::Duration;

use slab_registry_config::ConfigError;
use slab_registry_config::SlabRegistryConfig;
use slab_registry_core::runtime::LockScope;

mod common;

type TestResult = Result<(), String>;

/// Assert that a validation result is an error containing a specific substring.
fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

// ============================================================================
// SECTION: Min/Max Boundary Testing
// ============================================================================

#[test]
fn lock_wait_ms_at_minimum_1() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.issuance.lock_wait_ms = 1;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn lock_wait_ms_at_zero_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.issuance.lock_wait_ms = 0;
    assert_invalid(config.validate(), "lock_wait_ms must be greater than zero")?;
    Ok(())
}

#[test]
fn max_certificate_bytes_at_minimum_1() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.vault.max_certificate_bytes = 1;
    config.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn max_certificate_bytes_at_zero_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.vault.max_certificate_bytes = 0;
    assert_invalid(config.validate(), "max_certificate_bytes must be greater than zero")?;
    Ok(())
}

#[test]
fn empty_store_path_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.store.path = std::path::PathBuf::new();
    assert_invalid(config.validate(), "store.path must not be empty")?;
    Ok(())
}

#[test]
fn sender_without_at_sign_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.notify.sender = Some("not-an-address".to_string());
    assert_invalid(config.validate(), "notify.sender must be a mail address")?;
    Ok(())
}

#[test]
fn enabled_notify_without_sender_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.notify.enabled = true;
    assert_invalid(config.validate(), "notify.sender is required")?;
    Ok(())
}

#[test]
fn empty_vault_bucket_rejected() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.vault.bucket = Some(String::new());
    assert_invalid(config.validate(), "vault.bucket must not be empty")?;
    Ok(())
}

// ============================================================================
// SECTION: Defaults and Strict Parsing
// ============================================================================

#[test]
fn minimal_document_fills_defaults() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    if config.issuance.lock_wait_ms != 10_000 {
        return Err(format!("unexpected lock wait default: {}", config.issuance.lock_wait_ms));
    }
    if config.issuance.lock_scope != LockScope::Global {
        return Err("unexpected lock scope default".to_string());
    }
    if config.vault.max_certificate_bytes != 1_048_576 {
        return Err(format!(
            "unexpected vault default: {}",
            config.vault.max_certificate_bytes
        ));
    }
    if config.notify.sender.is_some() {
        return Err("unexpected notify sender default".to_string());
    }
    Ok(())
}

#[test]
fn issuance_config_carries_parsed_values() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.issuance.lock_wait_ms = 250;
    config.issuance.lock_scope = LockScope::PerClass;
    let issuance = config.issuance.issuance_config();
    if issuance.lock_wait != Duration::from_millis(250) {
        return Err(format!("unexpected lock wait: {:?}", issuance.lock_wait));
    }
    if issuance.lock_scope != LockScope::PerClass {
        return Err("unexpected lock scope".to_string());
    }
    if issuance.plan.org_segment != 788_346 {
        return Err(format!("unexpected org segment: {}", issuance.plan.org_segment));
    }
    Ok(())
}

#[test]
fn unknown_top_level_field_rejected() -> TestResult {
    let result = SlabRegistryConfig::parse(
        r#"
[issuance]
org_segment = 1
product_segment = 1
base_offset = 1

[store]
path = "/tmp/registry.db"

[mystery]
value = 1
"#,
    );
    match result {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected unknown field rejection".to_string()),
    }
}

#[test]
fn unknown_section_field_rejected() -> TestResult {
    let result = SlabRegistryConfig::parse(
        r#"
[issuance]
org_segment = 1
product_segment = 1
base_offset = 1
surprise = true

[store]
path = "/tmp/registry.db"
"#,
    );
    match result {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected unknown field rejection".to_string()),
    }
}

#[test]
fn missing_issuance_section_rejected() -> TestResult {
    let result = SlabRegistryConfig::parse(
        r#"
[store]
path = "/tmp/registry.db"
"#,
    );
    match result {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected missing section rejection".to_string()),
    }
}

#[test]
fn per_class_lock_scope_parses() -> TestResult {
    let config = SlabRegistryConfig::parse(
        r#"
[issuance]
org_segment = 1
product_segment = 1
base_offset = 1
lock_scope = "per_class"

[store]
path = "/tmp/registry.db"
"#,
    )
    .map_err(|err| err.to_string())?;
    if config.issuance.lock_scope != LockScope::PerClass {
        return Err("lock scope did not parse as per_class".to_string());
    }
    Ok(())
}
