//! # Zonewash
//!
//! Read, write, remove and batch-wash the zone-of-origin marker
//! (`Zone.Identifier`) attached to downloaded files.
//!
//! ## Overview
//!
//! A file downloaded from the internet carries a small marker recording the
//! trust zone it came from. Zonewash lets you:
//!
//! - Read and replace that marker through a pluggable [`ZoneStore`]
//! - Wash files one zone toward trusted per pass, removing the marker at zone 0
//! - Run inspect, mark, unmark and wash over many files concurrently, with
//!   per-file failure isolation and cooperative cancellation
//! - Keep a de-duplicated list of files with a preview of their next zone
//! - Capture one structured audit event per store operation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zonewash::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = BatchOrchestrator::builder()
//!         .with_store(FsZoneStore::new())
//!         .build()?;
//!
//!     let summary = orchestrator
//!         .run_batch(
//!             &["/home/me/Downloads/setup.exe"],
//!             BatchOperation::Wash,
//!             &CancellationToken::new(),
//!             |item| println!("{}: {:?}", item.path.display(), item.outcome),
//!         )
//!         .await?;
//!
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! ## Zones
//!
//! | Zone | Name          |
//! |------|---------------|
//! | 0    | Local machine |
//! | 1    | Local intranet|
//! | 2    | Trusted sites |
//! | 3    | Internet      |
//! | 4    | Restricted    |
//!
//! ## Architecture
//!
//! - **Core**: Zone types, the marker codec and error handling
//! - **Store**: Marker storage on the filesystem or in memory
//! - **Policy**: The wash transition rules
//! - **Batch**: Concurrent, cancellable batch orchestration
//! - **Targets**: The caller-owned file list
//! - **Audit**: Structured logging of store operations and batches

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod batch;
pub mod core;
pub mod policy;
pub mod store;
pub mod targets;

// Re-export commonly used types at the crate root
pub use crate::core::{
    BatchError, BatchResult, ErrorKind, InvalidZone, PathComparison, StoreError, StoreResult,
    ZoneId, ZoneMarker,
};

pub use crate::batch::{
    BatchConfig, BatchHandle, BatchOperation, BatchOrchestrator, BatchOutcome, BatchState,
    BatchSummary, ItemReport,
};
pub use crate::policy::{preview_next, wash_once, WashResult};
pub use crate::store::{FsZoneStore, FsZoneStoreConfig, MemoryZoneStore, ZoneStore};
pub use crate::targets::{FileTarget, TargetList};

/// Prelude module for convenient imports.
///
/// ```rust
/// use zonewash::prelude::*;
/// ```
pub mod prelude {
    pub use crate::batch::{
        AppliedChange, BatchConfig, BatchHandle, BatchOperation, BatchOrchestrator,
        BatchOutcome, BatchState, BatchSummary, ItemReport, SkipReason,
    };
    pub use crate::core::{
        BatchError, ErrorKind, PathComparison, StoreError, ZoneId, ZoneMarker,
    };
    pub use crate::policy::{preview_next, wash_once, WashResult};
    pub use crate::store::{FsZoneStore, MemoryZoneStore, ZoneStore};
    pub use crate::targets::{AddReport, FileTarget, TargetList};
}
