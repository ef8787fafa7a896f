// crates/slab-registry-core/tests/collaborators.rs
// ============================================================================
// Module: Collaborator Seam Tests
// Description: Exercises the vault, session cache, and store contracts.
// ============================================================================
//! ## Overview
//! Validates the in-memory collaborator implementations against their
//! contracts (vault size limits, session cache expiry, store conflict and
//! update semantics) plus the timestamp, class-label, and grade-scale
//! domain helpers.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use slab_registry_core::CertificateVault;
use slab_registry_core::ComicDescription;
use slab_registry_core::GradeFindings;
use slab_registry_core::RequesterClass;
use slab_registry_core::SessionCache;
use slab_registry_core::StoreError;
use slab_registry_core::Submission;
use slab_registry_core::SubmissionId;
use slab_registry_core::SubmissionStatus;
use slab_registry_core::SubmissionStore;
use slab_registry_core::TenantId;
use slab_registry_core::Timestamp;
use slab_registry_core::VaultError;
use slab_registry_core::runtime::InMemoryCertificateVault;
use slab_registry_core::runtime::InMemorySessionCache;
use slab_registry_core::runtime::InMemorySubmissionStore;

fn submission(id: &str) -> Submission {
    Submission::new(
        TenantId::from_raw(3).unwrap(),
        SubmissionId::new(id),
        RequesterClass::Collector,
        ComicDescription {
            title: "Weird Mystery".to_string(),
            issue: "4".to_string(),
            publication_year: 1968,
            publisher: "DC".to_string(),
        },
        GradeFindings {
            grade_tenths: 60,
            condition_notes: Vec::new(),
        },
        Timestamp::UnixMillis(1_700_000_000_000),
    )
}

#[test]
fn vault_round_trips_within_the_size_limit() {
    let vault = InMemoryCertificateVault::new();
    vault.put("tenants/3/certificates/1-2-3", b"certificate body".to_vec(), "text/plain").unwrap();
    let bytes = vault.get("tenants/3/certificates/1-2-3", 1 << 10).unwrap();
    assert_eq!(bytes, b"certificate body");
}

#[test]
fn vault_rejects_objects_over_the_read_limit() {
    let vault = InMemoryCertificateVault::new();
    vault.put("big", vec![0_u8; 64], "application/octet-stream").unwrap();
    match vault.get("big", 32) {
        Err(VaultError::TooLarge {
            key,
            max_bytes,
            actual_bytes,
        }) => {
            assert_eq!(key, "big");
            assert_eq!(max_bytes, 32);
            assert_eq!(actual_bytes, 64);
        }
        other => panic!("expected size rejection, got {other:?}"),
    }
}

#[test]
fn vault_rejects_empty_keys() {
    let vault = InMemoryCertificateVault::new();
    assert!(matches!(vault.put("", Vec::new(), "text/plain"), Err(VaultError::Invalid(_))));
}

#[test]
fn session_cache_expires_entries_by_ttl() {
    let cache = InMemorySessionCache::new();
    cache.put("session-1", "collector-7", 30).unwrap();
    assert_eq!(cache.get("session-1").unwrap().as_deref(), Some("collector-7"));
    cache.advance_seconds(29);
    assert_eq!(cache.get("session-1").unwrap().as_deref(), Some("collector-7"));
    cache.advance_seconds(1);
    assert_eq!(cache.get("session-1").unwrap(), None);
}

#[test]
fn session_cache_remove_is_immediate() {
    let cache = InMemorySessionCache::new();
    cache.put("session-2", "retailer-1", 600).unwrap();
    cache.remove("session-2").unwrap();
    assert_eq!(cache.get("session-2").unwrap(), None);
}

#[test]
fn timestamp_from_datetime_truncates_to_millis() {
    let datetime = time::OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
    let timestamp = Timestamp::from_datetime(datetime);
    assert_eq!(timestamp.as_unix_millis(), Some(1_700_000_000_000));
    assert_eq!(timestamp.as_logical(), None);
}

#[test]
fn class_labels_round_trip_through_parsing() {
    for class in RequesterClass::all() {
        assert_eq!(RequesterClass::from_label(class.as_str()), Some(class));
    }
    // Labels are lowercase and closed: anything else is rejected.
    assert_eq!(RequesterClass::from_label("Retailer"), None);
    assert_eq!(RequesterClass::from_label("publisher"), None);
    assert_eq!(RequesterClass::from_label(""), None);
}

#[test]
fn grade_scale_accepts_only_half_point_steps_in_range() {
    let graded = |grade_tenths| GradeFindings {
        grade_tenths,
        condition_notes: Vec::new(),
    };
    assert!(graded(GradeFindings::MIN_GRADE_TENTHS).grade_in_range());
    assert!(graded(GradeFindings::MAX_GRADE_TENTHS).grade_in_range());
    assert!(graded(85).grade_in_range());
    // Below scale, above scale, and off the half-point grid.
    assert!(!graded(0).grade_in_range());
    assert!(!graded(4).grade_in_range());
    assert!(!graded(87).grade_in_range());
    assert!(!graded(105).grade_in_range());
}

#[test]
fn store_rejects_duplicate_submission_ids() {
    let store = InMemorySubmissionStore::new();
    store.create(&submission("dup")).unwrap();
    match store.create(&submission("dup")) {
        Err(StoreError::Conflict(_)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn store_update_changes_status_in_place() {
    let store = InMemorySubmissionStore::new();
    let mut record = submission("update-me");
    store.create(&record).unwrap();
    record.status = SubmissionStatus::Archived;
    store.update_by_id(&record).unwrap();
    let loaded =
        store.load(TenantId::from_raw(3).unwrap(), &SubmissionId::new("update-me")).unwrap().unwrap();
    assert_eq!(loaded.status, SubmissionStatus::Archived);
}

#[test]
fn store_update_of_missing_record_fails() {
    let store = InMemorySubmissionStore::new();
    match store.update_by_id(&submission("ghost")) {
        Err(StoreError::Invalid(_)) => {}
        other => panic!("expected invalid-record error, got {other:?}"),
    }
}

#[test]
fn store_counts_only_issued_records_of_the_class() {
    let store = InMemorySubmissionStore::new();
    // Unissued records never enter the count.
    store.create(&submission("pending")).unwrap();
    assert_eq!(store.count_issued(None, RequesterClass::Collector).unwrap(), 0);
    let mut issued = submission("issued");
    issued.registry_number = Some(slab_registry_core::RegistryNumber::new("1-2-3"));
    store.create(&issued).unwrap();
    assert_eq!(store.count_issued(None, RequesterClass::Collector).unwrap(), 1);
    // Other classes do not see it.
    assert_eq!(store.count_issued(None, RequesterClass::Retailer).unwrap(), 0);
    // Tenant scoping filters mismatched tenants out.
    let other_tenant = TenantId::from_raw(99).unwrap();
    assert_eq!(store.count_issued(Some(other_tenant), RequesterClass::Collector).unwrap(), 0);
}
