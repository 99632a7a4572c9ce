//! Audit event types and emission functions.

use crate::batch::{BatchSummary, ItemReport};
use crate::core::{ErrorKind, StoreResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Base trait for audit events.
pub trait AuditEvent: Serialize {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the timestamp of the event.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// The store call an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOperation {
    /// Target existence check.
    Check,
    /// Marker read.
    Read,
    /// Marker write.
    Write,
    /// Marker removal.
    Remove,
}

impl StoreOperation {
    /// Returns the operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Read => "read",
            Self::Write => "write",
            Self::Remove => "remove",
        }
    }

    fn mutates(&self) -> bool {
        matches!(self, Self::Write | Self::Remove)
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    /// Routine reads.
    Debug,
    /// Successful changes.
    Info,
    /// Expected per-file problems.
    Warn,
    /// Unexpected I/O failures.
    Error,
}

/// Audit event for one store operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreAuditEvent {
    /// Event type.
    pub event_type: String,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// The store call.
    pub operation: StoreOperation,

    /// Target path.
    pub path: String,

    /// Error category, `None` on success.
    pub error_kind: Option<ErrorKind>,

    /// Error message, `None` on success.
    pub detail: Option<String>,

    /// Severity.
    pub level: AuditLevel,
}

impl StoreAuditEvent {
    /// Builds the event for a finished store call.
    pub fn new<T>(operation: StoreOperation, path: &Path, result: &StoreResult<T>) -> Self {
        let (error_kind, detail, level) = match result {
            Ok(_) if operation.mutates() => (None, None, AuditLevel::Info),
            Ok(_) => (None, None, AuditLevel::Debug),
            Err(e) => {
                let level = match e.kind() {
                    ErrorKind::NotFound | ErrorKind::AccessDenied | ErrorKind::InvalidZone => {
                        AuditLevel::Warn
                    }
                    _ => AuditLevel::Error,
                };
                (Some(e.kind()), Some(e.to_string()), level)
            }
        };

        Self {
            event_type: "store_operation".to_string(),
            timestamp: Utc::now(),
            operation,
            path: path.display().to_string(),
            error_kind,
            detail,
            level,
        }
    }
}

impl AuditEvent for StoreAuditEvent {
    fn event_type(&self) -> &'static str {
        "store_operation"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Audit event for a finished batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAuditEvent {
    /// Event type.
    pub event_type: String,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Batch ID.
    pub batch_id: String,

    /// Operation name.
    pub operation: String,

    /// Terminal state name.
    pub state: String,

    /// Targets submitted.
    pub total: usize,

    /// Targets started.
    pub attempted: usize,

    /// Targets that failed.
    pub failed: usize,

    /// Human-readable counts.
    pub status: String,
}

impl From<&BatchSummary> for BatchAuditEvent {
    fn from(summary: &BatchSummary) -> Self {
        Self {
            event_type: "batch_completed".to_string(),
            timestamp: summary.finished_at.unwrap_or_else(Utc::now),
            batch_id: summary.id.to_string(),
            operation: summary.operation.name().to_string(),
            state: summary.state.name().to_string(),
            total: summary.total,
            attempted: summary.attempted,
            failed: summary.counts.failed,
            status: summary.status_line(),
        }
    }
}

impl AuditEvent for BatchAuditEvent {
    fn event_type(&self) -> &'static str {
        "batch_completed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Emits an audit event for one store operation and returns the result
/// unchanged.
pub fn emit_store_operation<T>(
    operation: StoreOperation,
    path: &Path,
    result: StoreResult<T>,
) -> StoreResult<T> {
    let event = StoreAuditEvent::new(operation, path, &result);

    macro_rules! store_event {
        ($level:ident) => {
            tracing::$level!(
                target: "zonewash::audit",
                event_type = %event.event_type,
                operation = %event.operation,
                path = %event.path,
                error_kind = ?event.error_kind,
                detail = ?event.detail,
                "Store operation {}",
                if event.error_kind.is_none() { "succeeded" } else { "failed" }
            )
        };
    }

    match event.level {
        AuditLevel::Debug => store_event!(debug),
        AuditLevel::Info => store_event!(info),
        AuditLevel::Warn => store_event!(warn),
        AuditLevel::Error => store_event!(error),
    }

    result
}

/// Emits an audit event for a batch starting.
pub fn emit_batch_started(summary: &BatchSummary, store: &str) {
    tracing::info!(
        target: "zonewash::audit",
        event_type = "batch_started",
        batch_id = %summary.id,
        operation = %summary.operation,
        total = summary.total,
        store = %store,
        "Batch started"
    );
}

/// Emits a progress event for one delivered item.
pub fn emit_item_completed(batch_id: &uuid::Uuid, report: &ItemReport) {
    tracing::debug!(
        target: "zonewash::audit",
        event_type = "item_completed",
        batch_id = %batch_id,
        index = report.index,
        path = %report.path.display(),
        outcome = ?report.outcome,
        "Batch item completed"
    );
}

/// Emits an audit event for a finished batch.
pub fn emit_batch_completed(summary: &BatchSummary) {
    let event = BatchAuditEvent::from(summary);
    tracing::info!(
        target: "zonewash::audit",
        event_type = %event.event_type,
        batch_id = %event.batch_id,
        operation = %event.operation,
        state = %event.state,
        total = event.total,
        attempted = event.attempted,
        failed = event.failed,
        duration_ms = summary
            .duration()
            .map(|d| d.num_milliseconds())
            .unwrap_or_default(),
        status = %event.status,
        "Batch finished"
    );
}
