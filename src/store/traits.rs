//! Zone store trait definition.

use crate::core::{StoreResult, ZoneId, ZoneMarker};

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

/// Trait for zone marker storage implementations.
///
/// A store reads, replaces and deletes the marker attached to one file
/// path. Implementations must treat existing marker content as untrusted:
/// every read re-validates, and a malformed marker reads as absent.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use zonewash::store::ZoneStore;
/// use zonewash::core::{StoreResult, ZoneId, ZoneMarker};
/// use async_trait::async_trait;
/// use std::path::Path;
///
/// #[derive(Debug)]
/// struct MyZoneStore;
///
/// #[async_trait]
/// impl ZoneStore for MyZoneStore {
///     async fn check_target(&self, path: &Path) -> StoreResult<()> {
///         todo!()
///     }
///
///     async fn read(&self, path: &Path) -> StoreResult<Option<ZoneMarker>> {
///         todo!()
///     }
///
///     async fn write(
///         &self,
///         path: &Path,
///         zone: ZoneId,
///         host_url: Option<&str>,
///     ) -> StoreResult<()> {
///         todo!()
///     }
///
///     async fn remove(&self, path: &Path) -> StoreResult<()> {
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait ZoneStore: Send + Sync + Debug {
    /// Returns a short name for logs.
    fn name(&self) -> &str {
        "zone-store"
    }

    /// Verifies that `path` names an existing regular file.
    ///
    /// Fails with `NotFound` if it does not.
    async fn check_target(&self, path: &Path) -> StoreResult<()>;

    /// Reads the marker attached to `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist, carries no marker,
    /// or carries a marker whose zone cannot be parsed.
    async fn read(&self, path: &Path) -> StoreResult<Option<ZoneMarker>>;

    /// Replaces the marker attached to `path` as a whole.
    ///
    /// `host_url` falls back to `about:internet` when `None`. Fails with
    /// `NotFound` if the file does not exist.
    async fn write(&self, path: &Path, zone: ZoneId, host_url: Option<&str>) -> StoreResult<()>;

    /// Deletes the marker attached to `path`.
    ///
    /// Succeeds when no marker is present. Fails with `NotFound` if the
    /// file does not exist.
    async fn remove(&self, path: &Path) -> StoreResult<()>;

    /// Returns `true` if a readable marker is present.
    ///
    /// The default performs a full [`read`](ZoneStore::read), so a marker
    /// that is present but malformed or oversized reports `false`. The
    /// filesystem store caps reads at `MAX_MARKER_BYTES`, which bounds the
    /// cost of the parse.
    async fn exists(&self, path: &Path) -> bool {
        matches!(self.read(path).await, Ok(Some(_)))
    }

    /// Returns the zone of the marker, if a readable one is present.
    async fn zone(&self, path: &Path) -> StoreResult<Option<ZoneId>> {
        Ok(self.read(path).await?.map(|marker| marker.zone_id))
    }
}
