//! Structured audit logging.
//!
//! This module emits one structured event per store operation outcome and
//! one per batch start and finish, using the `tracing` crate under the
//! `zonewash::audit` target. Any subscriber (console, JSON file,
//! OpenTelemetry) can capture them; retention is up to the subscriber.

mod events;

pub use events::{
    emit_batch_completed, emit_batch_started, emit_item_completed, emit_store_operation,
    AuditEvent, AuditLevel, BatchAuditEvent, StoreAuditEvent, StoreOperation,
};
