// crates/slab-registry-core/src/runtime/audit.rs
// ============================================================================
// Module: Issuance Audit Logging
// Description: Structured audit events for issuance attempts.
// Purpose: Emit redacted audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for issuance logging.
//! It is intentionally lightweight so deployments can route events to their
//! preferred logging pipeline without redesign. Events carry identifiers and
//! outcomes only; raw comic metadata never enters the audit stream.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Issuance audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct IssuanceAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Owning tenant identifier.
    pub tenant_id: String,
    /// Submission identifier.
    pub submission_id: String,
    /// Requester class label.
    pub requester_class: &'static str,
    /// Lock name used for the critical section.
    pub lock_name: String,
    /// Milliseconds spent waiting for the lock.
    pub lock_wait_ms: u64,
    /// Count observed under the lock, when the query succeeded.
    pub count: Option<u64>,
    /// Assigned registry number, when issuance reached generation.
    pub registry_number: Option<String>,
    /// Attempt outcome label.
    pub outcome: &'static str,
    /// Normalized error kind label for failed attempts.
    pub error_kind: Option<&'static str>,
}

/// Inputs required to construct an issuance audit event.
pub struct IssuanceAuditEventParams {
    /// Owning tenant identifier.
    pub tenant_id: String,
    /// Submission identifier.
    pub submission_id: String,
    /// Requester class label.
    pub requester_class: &'static str,
    /// Lock name used for the critical section.
    pub lock_name: String,
    /// Milliseconds spent waiting for the lock.
    pub lock_wait_ms: u64,
    /// Count observed under the lock, when the query succeeded.
    pub count: Option<u64>,
    /// Assigned registry number, when issuance reached generation.
    pub registry_number: Option<String>,
    /// Attempt outcome label.
    pub outcome: &'static str,
    /// Normalized error kind label for failed attempts.
    pub error_kind: Option<&'static str>,
}

impl IssuanceAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: IssuanceAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "issuance_attempt",
            timestamp_ms,
            tenant_id: params.tenant_id,
            submission_id: params.submission_id,
            requester_class: params.requester_class,
            lock_name: params.lock_name,
            lock_wait_ms: params.lock_wait_ms,
            count: params.count,
            registry_number: params.registry_number,
            outcome: params.outcome,
            error_kind: params.error_kind,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for issuance events.
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &IssuanceAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &IssuanceAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &IssuanceAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &IssuanceAuditEvent) {}
}
