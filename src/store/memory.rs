//! In-memory zone store for testing.
//!
//! `MemoryZoneStore` keeps files and their raw marker text in memory, so
//! batch behavior can be exercised without touching the filesystem. It can
//! be configured to fail specific paths and to add latency to every call.

use crate::core::marker;
use crate::core::{ErrorKind, StoreError, StoreResult, ZoneId, ZoneMarker};
use crate::store::traits::ZoneStore;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct Inner {
    /// Existing files and their raw marker text, if any.
    files: HashMap<PathBuf, Option<String>>,
    /// Paths that fail every operation with the given kind.
    failures: HashMap<PathBuf, ErrorKind>,
    /// Paths any operation has been attempted on.
    touched: HashSet<PathBuf>,
}

/// An in-memory zone store.
///
/// # Examples
///
/// ```rust
/// use zonewash::store::MemoryZoneStore;
/// use zonewash::core::{ErrorKind, ZoneId};
/// use std::time::Duration;
///
/// let store = MemoryZoneStore::new()
///     .with_marked_file("/downloads/setup.exe", ZoneId::INTERNET)
///     .with_file("/downloads/notes.txt")
///     .with_failure("/downloads/locked.doc", ErrorKind::AccessDenied)
///     .with_latency(Duration::from_millis(5));
/// ```
#[derive(Debug, Default)]
pub struct MemoryZoneStore {
    inner: RwLock<Inner>,
    latency: Option<Duration>,
    operation_count: AtomicU64,
}

impl MemoryZoneStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an unmarked file.
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.add_file(path);
        self
    }

    /// Adds a file carrying a well-formed marker.
    pub fn with_marked_file(self, path: impl Into<PathBuf>, zone: ZoneId) -> Self {
        self.add_raw_marker(path, marker::render(&ZoneMarker::new(zone)));
        self
    }

    /// Adds a file whose marker holds arbitrary text.
    pub fn with_raw_marker(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.add_raw_marker(path, content);
        self
    }

    /// Makes every operation on `path` fail with `kind`.
    pub fn with_failure(self, path: impl Into<PathBuf>, kind: ErrorKind) -> Self {
        self.write_inner().failures.insert(path.into(), kind);
        self
    }

    /// Sets the simulated latency for every operation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Adds an unmarked file (mutable version).
    pub fn add_file(&self, path: impl Into<PathBuf>) {
        self.write_inner().files.entry(path.into()).or_insert(None);
    }

    /// Adds a file whose marker holds arbitrary text (mutable version).
    pub fn add_raw_marker(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.write_inner()
            .files
            .insert(path.into(), Some(content.into()));
    }

    /// Deletes a file together with its marker.
    pub fn delete_file(&self, path: &Path) {
        self.write_inner().files.remove(path);
    }

    /// Returns the raw marker text stored for `path`.
    pub fn raw_marker(&self, path: &Path) -> Option<String> {
        self.read_inner().files.get(path).cloned().flatten()
    }

    /// Returns `true` if any operation has been attempted on `path`.
    pub fn was_touched(&self, path: &Path) -> bool {
        self.read_inner().touched.contains(path)
    }

    /// Returns the number of operations performed.
    pub fn operation_count(&self) -> u64 {
        self.operation_count.load(Ordering::Relaxed)
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records the call, waits out the latency and applies injected failures.
    async fn enter(&self, context: &'static str, path: &Path) -> StoreResult<()> {
        self.operation_count.fetch_add(1, Ordering::Relaxed);
        let injected = {
            let mut inner = self.write_inner();
            inner.touched.insert(path.to_path_buf());
            inner.failures.get(path).copied()
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match injected {
            None => Ok(()),
            Some(ErrorKind::NotFound) => Err(StoreError::not_found(path)),
            Some(ErrorKind::AccessDenied) => Err(StoreError::from_io(
                context,
                path,
                io::Error::from(io::ErrorKind::PermissionDenied),
            )),
            Some(_) => Err(StoreError::from_io(
                context,
                path,
                io::Error::other("injected failure"),
            )),
        }
    }

    fn require_file(&self, path: &Path) -> StoreResult<()> {
        if self.read_inner().files.contains_key(path) {
            Ok(())
        } else {
            Err(StoreError::not_found(path))
        }
    }
}

#[async_trait]
impl ZoneStore for MemoryZoneStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn check_target(&self, path: &Path) -> StoreResult<()> {
        self.enter("stat target", path).await?;
        self.require_file(path)
    }

    async fn read(&self, path: &Path) -> StoreResult<Option<ZoneMarker>> {
        self.enter("read marker", path).await?;
        Ok(self
            .read_inner()
            .files
            .get(path)
            .and_then(|content| content.as_deref())
            .and_then(marker::parse))
    }

    async fn write(&self, path: &Path, zone: ZoneId, host_url: Option<&str>) -> StoreResult<()> {
        self.enter("write marker", path).await?;
        if host_url.is_some_and(|url| !marker::is_valid_host_url(url)) {
            return Err(StoreError::invalid_host_url(path));
        }

        let mut value = ZoneMarker::new(zone);
        value.host_url = host_url.map(str::to_string);

        let mut inner = self.write_inner();
        match inner.files.get_mut(path) {
            Some(slot) => {
                *slot = Some(marker::render(&value));
                Ok(())
            }
            None => Err(StoreError::not_found(path)),
        }
    }

    async fn remove(&self, path: &Path) -> StoreResult<()> {
        self.enter("remove marker", path).await?;

        let mut inner = self.write_inner();
        match inner.files.get_mut(path) {
            Some(slot) => {
                *slot = None;
                Ok(())
            }
            None => Err(StoreError::not_found(path)),
        }
    }
}
