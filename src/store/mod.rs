//! Zone marker storage.
//!
//! A [`ZoneStore`] reads, replaces and deletes the marker attached to a
//! single file. [`FsZoneStore`] works on the real filesystem;
//! [`MemoryZoneStore`] keeps everything in memory for tests.

mod filesystem;
mod memory;
mod traits;

pub use filesystem::{FsZoneStore, FsZoneStoreConfig, MAX_MARKER_BYTES, ZONE_IDENTIFIER_STREAM};
pub use memory::MemoryZoneStore;
pub use traits::ZoneStore;

use std::sync::Arc;

/// A shared, dynamically dispatched zone store.
pub type ArcZoneStore = Arc<dyn ZoneStore>;
