//! Shared helpers for slab-registry-config tests.
// crates/slab-registry-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared fixtures for configuration tests.
// =============================================================================

use slab_registry_config::ConfigError;
use slab_registry_config::SlabRegistryConfig;

/// Returns the smallest valid configuration document.
pub fn minimal_config() -> Result<SlabRegistryConfig, ConfigError> {
    SlabRegistryConfig::parse(
        r#"
[issuance]
org_segment = 788346
product_segment = 26649
base_offset = 1001

[store]
path = "/var/lib/slab-registry/registry.db"
"#,
    )
}
