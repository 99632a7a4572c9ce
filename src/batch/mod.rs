//! Batch orchestration.
//!
//! This module drives a list of files through one operation with bounded
//! concurrency, per-file failure isolation and cooperative cancellation:
//!
//! - [`BatchOrchestrator`] - Runs batches, one at a time
//! - [`BatchOperation`] - What to do to each file
//! - [`BatchOutcome`] / [`ItemReport`] - Per-file result
//! - [`BatchSummary`] - Aggregate result of a batch
//! - [`BatchHandle`] - Control over a batch started in the background

mod handle;
mod orchestrator;
mod outcome;
mod state;
mod unit;

pub use handle::BatchHandle;
pub use orchestrator::{
    BatchConfig, BatchOrchestrator, BatchOrchestratorBuilder, DEFAULT_MAX_WORKERS,
};
pub use outcome::{
    AppliedChange, BatchOperation, BatchOutcome, BatchSummary, ItemReport, OutcomeCounts,
    SkipReason,
};
pub use state::BatchState;
