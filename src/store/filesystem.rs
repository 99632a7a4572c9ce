//! Filesystem-based zone store implementation.

use crate::core::marker;
use crate::core::{StoreError, StoreResult, ZoneId, ZoneMarker};
use crate::store::traits::ZoneStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Name of the stream the operating system writes zone markers to.
pub const ZONE_IDENTIFIER_STREAM: &str = "Zone.Identifier";

/// Markers larger than this are not zone markers and read as absent.
pub const MAX_MARKER_BYTES: u64 = 64 * 1024;

/// Configuration for [`FsZoneStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsZoneStoreConfig {
    /// Name of the stream holding the marker.
    pub stream_name: String,

    /// Replace markers through a temp file and rename instead of
    /// truncating in place. NTFS streams cannot be renamed into, so this
    /// is off on Windows.
    pub atomic_replace: bool,
}

impl Default for FsZoneStoreConfig {
    fn default() -> Self {
        Self {
            stream_name: ZONE_IDENTIFIER_STREAM.to_string(),
            atomic_replace: !cfg!(windows),
        }
    }
}

impl FsZoneStoreConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stream name.
    pub fn with_stream_name(mut self, name: impl Into<String>) -> Self {
        self.stream_name = name.into();
        self
    }

    /// Enables or disables temp-file-and-rename replacement.
    pub fn with_atomic_replace(mut self, enabled: bool) -> Self {
        self.atomic_replace = enabled;
        self
    }
}

/// Zone store backed by the filesystem.
///
/// The marker for `path` lives at `"{path}:Zone.Identifier"`. On NTFS that
/// name addresses the alternate data stream the OS itself writes; on other
/// filesystems it is an ordinary sibling file.
///
/// No locks are taken: other processes may edit markers at any time, so
/// every read re-parses from disk.
#[derive(Debug, Clone, Default)]
pub struct FsZoneStore {
    config: FsZoneStoreConfig,
}

impl FsZoneStore {
    /// Creates a store with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given configuration.
    pub fn with_config(config: FsZoneStoreConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &FsZoneStoreConfig {
        &self.config
    }

    /// Returns the location of the marker for `path`.
    pub fn marker_path(&self, path: &Path) -> PathBuf {
        let mut raw = OsString::from(path.as_os_str());
        raw.push(":");
        raw.push(&self.config.stream_name);
        PathBuf::from(raw)
    }

    async fn replace_in_place(&self, marker_path: &Path, content: String) -> io::Result<()> {
        tokio::fs::write(marker_path, content.as_bytes()).await
    }

    async fn replace_atomically(&self, marker_path: PathBuf, content: String) -> io::Result<()> {
        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let parent = marker_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));

            // Same directory as the marker, so the rename cannot cross filesystems.
            let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
            tmp.write_all(content.as_bytes())?;
            tmp.flush()?;
            tmp.as_file().sync_all()?;
            tmp.persist(&marker_path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(io::Error::other)?
    }
}

#[async_trait]
impl ZoneStore for FsZoneStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn check_target(&self, path: &Path) -> StoreResult<()> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| StoreError::from_io("stat target", path, e))?;

        if !metadata.is_file() {
            return Err(StoreError::not_found(path));
        }
        Ok(())
    }

    async fn read(&self, path: &Path) -> StoreResult<Option<ZoneMarker>> {
        match self.check_target(path).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        }

        let marker_path = self.marker_path(path);
        let metadata = match tokio::fs::metadata(&marker_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::from_io("stat marker", path, e)),
        };

        if metadata.len() > MAX_MARKER_BYTES {
            tracing::warn!(
                path = %path.display(),
                size = metadata.len(),
                "Oversized zone marker ignored"
            );
            return Ok(None);
        }

        let bytes = match tokio::fs::read(&marker_path).await {
            Ok(bytes) => bytes,
            // Removed between stat and read by another process.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::from_io("read marker", path, e)),
        };

        let parsed = marker::parse_bytes(&bytes);
        if parsed.is_none() {
            tracing::debug!(path = %path.display(), "Unparsable zone marker treated as absent");
        }
        Ok(parsed)
    }

    async fn write(&self, path: &Path, zone: ZoneId, host_url: Option<&str>) -> StoreResult<()> {
        if host_url.is_some_and(|url| !marker::is_valid_host_url(url)) {
            return Err(StoreError::invalid_host_url(path));
        }
        self.check_target(path).await?;

        let mut value = ZoneMarker::new(zone);
        value.host_url = host_url.map(str::to_string);
        let content = marker::render(&value);

        let marker_path = self.marker_path(path);
        let result = if self.config.atomic_replace {
            self.replace_atomically(marker_path, content).await
        } else {
            self.replace_in_place(&marker_path, content).await
        };
        result.map_err(|e| StoreError::from_io("write marker", path, e))?;

        tracing::debug!(path = %path.display(), zone = %zone, "Zone marker written");
        Ok(())
    }

    async fn remove(&self, path: &Path) -> StoreResult<()> {
        self.check_target(path).await?;

        match tokio::fs::remove_file(self.marker_path(path)).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Zone marker removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from_io("remove marker", path, e)),
        }
    }
}
