// crates/slab-registry-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Reference Implementations
// Description: Reference store, vault, notifier, renderer, and cache.
// Purpose: Provide deterministic collaborator implementations for tests.
// Dependencies: crate::core, crate::interfaces, std
// ============================================================================

//! ## Overview
//! In-memory implementations for every collaborator seam. The submission
//! store carries injectable failure hooks (fail the next count query, fail
//! the next create) so protocol tests can exercise the coordinator's error
//! paths without a real backend. All implementations are `Clone` handles
//! over shared interior state so tests can inspect what the runtime wrote.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::mpsc;

use crate::core::identifiers::RegistryNumber;
use crate::core::identifiers::RequesterClass;
use crate::core::identifiers::SubmissionId;
use crate::core::identifiers::TenantId;
use crate::core::submission::Submission;
use crate::interfaces::CacheError;
use crate::interfaces::CertificateDocument;
use crate::interfaces::CertificateNotice;
use crate::interfaces::CertificateRenderer;
use crate::interfaces::CertificateVault;
use crate::interfaces::NoticeReceipt;
use crate::interfaces::Notifier;
use crate::interfaces::NotifyError;
use crate::interfaces::RenderError;
use crate::interfaces::SessionCache;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;
use crate::interfaces::VaultError;

// ============================================================================
// SECTION: Submission Store
// ============================================================================

/// Interior state for [`InMemorySubmissionStore`].
#[derive(Default)]
struct MemoryStoreInner {
    /// Records keyed by (tenant, submission id).
    records: BTreeMap<(u64, String), Submission>,
    /// Number of upcoming `count_issued` calls that must fail.
    fail_counts: u32,
    /// Number of upcoming `create` calls that must fail.
    fail_creates: u32,
}

/// In-memory [`SubmissionStore`] with injectable failure hooks.
///
/// # Invariants
/// - Count queries reflect every create that completed before them on the
///   same store handle (read-your-writes).
#[derive(Clone, Default)]
pub struct InMemorySubmissionStore {
    /// Shared interior state.
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl InMemorySubmissionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the interior state, recovering from poisoning.
    fn inner(&self) -> std::sync::MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next `count_issued` call fail with an I/O error.
    pub fn fail_next_count(&self) {
        self.inner().fail_counts += 1;
    }

    /// Makes the next `create` call fail with an I/O error.
    pub fn fail_next_create(&self) {
        self.inner().fail_creates += 1;
    }

    /// Returns every assigned registry number in record order.
    #[must_use]
    pub fn issued_numbers(&self) -> Vec<RegistryNumber> {
        self.inner().records.values().filter_map(|record| record.registry_number.clone()).collect()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner().records.len()
    }

    /// Returns `true` when no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner().records.is_empty()
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn count_issued(
        &self,
        tenant_id: Option<TenantId>,
        class: RequesterClass,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner();
        if inner.fail_counts > 0 {
            inner.fail_counts -= 1;
            return Err(StoreError::Io("injected count failure".to_string()));
        }
        let count = inner
            .records
            .values()
            .filter(|record| record.registry_number.is_some())
            .filter(|record| record.requester_class == class)
            .filter(|record| tenant_id.is_none_or(|tenant| record.tenant_id == tenant))
            .count();
        u64::try_from(count).map_err(|err| StoreError::Store(err.to_string()))
    }

    fn create(&self, submission: &Submission) -> Result<(), StoreError> {
        let mut inner = self.inner();
        if inner.fail_creates > 0 {
            inner.fail_creates -= 1;
            return Err(StoreError::Io("injected create failure".to_string()));
        }
        let key = (submission.tenant_id.get(), submission.submission_id.to_string());
        if inner.records.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "submission already exists: {}",
                submission.submission_id
            )));
        }
        if let Some(number) = &submission.registry_number
            && inner.records.values().any(|record| record.registry_number.as_ref() == Some(number))
        {
            return Err(StoreError::Conflict(format!("registry number already issued: {number}")));
        }
        inner.records.insert(key, submission.clone());
        Ok(())
    }

    fn update_by_id(&self, submission: &Submission) -> Result<(), StoreError> {
        let mut inner = self.inner();
        let key = (submission.tenant_id.get(), submission.submission_id.to_string());
        match inner.records.get_mut(&key) {
            Some(record) => {
                *record = submission.clone();
                Ok(())
            }
            None => {
                Err(StoreError::Invalid(format!("no such submission: {}", submission.submission_id)))
            }
        }
    }

    fn load(
        &self,
        tenant_id: TenantId,
        submission_id: &SubmissionId,
    ) -> Result<Option<Submission>, StoreError> {
        let inner = self.inner();
        Ok(inner.records.get(&(tenant_id.get(), submission_id.to_string())).cloned())
    }
}

// ============================================================================
// SECTION: Certificate Vault
// ============================================================================

/// In-memory [`CertificateVault`] keyed by object key.
#[derive(Clone, Default)]
pub struct InMemoryCertificateVault {
    /// Stored objects: key to (bytes, content type).
    objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
}

impl InMemoryCertificateVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` when the vault holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

impl CertificateVault for InMemoryCertificateVault {
    fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), VaultError> {
        if key.is_empty() {
            return Err(VaultError::Invalid("empty vault key".to_string()));
        }
        let mut objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        objects.insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn get(&self, key: &str, max_bytes: usize) -> Result<Vec<u8>, VaultError> {
        let objects = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        let (bytes, _content_type) = objects
            .get(key)
            .ok_or_else(|| VaultError::Backend(format!("no such object: {key}")))?;
        if bytes.len() > max_bytes {
            return Err(VaultError::TooLarge {
                key: key.to_string(),
                max_bytes,
                actual_bytes: bytes.len(),
            });
        }
        Ok(bytes.clone())
    }
}

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// Notifier that forwards notices over a channel for test inspection.
pub struct ChannelNotifier {
    /// Channel sender for delivered notices.
    sender: mpsc::Sender<CertificateNotice>,
    /// Monotonic counter used for deterministic delivery IDs.
    counter: AtomicU64,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiving end for its notices.
    #[must_use]
    pub fn new() -> (Self, mpsc::Receiver<CertificateNotice>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
                counter: AtomicU64::new(0),
            },
            receiver,
        )
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: &CertificateNotice) -> Result<NoticeReceipt, NotifyError> {
        self.sender
            .send(notice.clone())
            .map_err(|_| NotifyError::DeliveryFailed("notice channel closed".to_string()))?;
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(NoticeReceipt {
            delivery_id: format!("channel-{seq}"),
        })
    }
}

/// Notifier that accepts and discards every notice.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: &CertificateNotice) -> Result<NoticeReceipt, NotifyError> {
        Ok(NoticeReceipt {
            delivery_id: "noop-0".to_string(),
        })
    }
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Plain-text certificate renderer for tests and local tooling.
///
/// # Invariants
/// - Output depends only on the submission contents (deterministic).
pub struct PlainTextRenderer;

impl CertificateRenderer for PlainTextRenderer {
    fn render(&self, submission: &Submission) -> Result<CertificateDocument, RenderError> {
        let number = submission
            .registry_number
            .as_ref()
            .ok_or_else(|| RenderError::RenderFailed("submission has no registry number".to_string()))?;
        let body = format!(
            "CERTIFICATE {number}\n{title} #{issue} ({year})\ngrade: {grade}\n",
            title = submission.comic.title,
            issue = submission.comic.issue,
            year = submission.comic.publication_year,
            grade = submission.findings.grade_tenths,
        );
        Ok(CertificateDocument {
            bytes: body.into_bytes(),
            content_type: "text/plain".to_string(),
        })
    }
}

// ============================================================================
// SECTION: Session Cache
// ============================================================================

/// In-memory [`SessionCache`] with logical-time expiry.
///
/// # Invariants
/// - Time only advances via [`InMemorySessionCache::advance_seconds`],
///   keeping expiry deterministic in tests.
#[derive(Clone, Default)]
pub struct InMemorySessionCache {
    /// Entries: key to (value, expiry in logical seconds).
    entries: Arc<Mutex<HashMap<String, (String, u64)>>>,
    /// Logical clock in seconds.
    clock: Arc<AtomicU64>,
}

impl InMemorySessionCache {
    /// Creates an empty cache at logical time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the logical clock by the given seconds.
    pub fn advance_seconds(&self, seconds: u64) {
        self.clock.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl SessionCache for InMemorySessionCache {
    fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let now = self.clock.load(Ordering::SeqCst);
        let expires_at = now.saturating_add(ttl_seconds);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.load(Ordering::SeqCst);
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .get(key)
            .filter(|(_value, expires_at)| *expires_at > now)
            .map(|(value, _expires_at)| value.clone()))
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}
