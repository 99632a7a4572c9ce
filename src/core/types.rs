//! Core types used throughout the zonewash library.
//!
//! This module defines the validated zone identifier, the parsed marker and
//! the path comparison rule shared by target intake and the orchestrator.

use crate::core::error::InvalidZone;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Host URL written when the caller does not supply one.
pub const DEFAULT_HOST_URL: &str = "about:internet";

/// A trust zone in `[0,4]`; lower is more trusted.
///
/// The value can only be constructed through validation, so holding a
/// `ZoneId` means the zone is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ZoneId(u8);

impl ZoneId {
    /// Zone 0: the local machine.
    pub const LOCAL_MACHINE: Self = Self(0);
    /// Zone 1: the local intranet.
    pub const INTRANET: Self = Self(1);
    /// Zone 2: trusted sites.
    pub const TRUSTED: Self = Self(2);
    /// Zone 3: the internet.
    pub const INTERNET: Self = Self(3);
    /// Zone 4: restricted sites.
    pub const RESTRICTED: Self = Self(4);

    /// The most restricted zone value.
    pub const MAX: u8 = 4;

    /// Validates a raw zone value.
    pub fn new(value: i64) -> Result<Self, InvalidZone> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidZone { value })
        }
    }

    /// Returns the numeric zone.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the next more-trusted zone, or `None` at zone 0.
    pub fn lower(&self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    /// Returns a human-readable zone name.
    pub fn name(&self) -> &'static str {
        match self.0 {
            0 => "local machine",
            1 => "local intranet",
            2 => "trusted sites",
            3 => "internet",
            _ => "restricted sites",
        }
    }
}

impl TryFrom<i64> for ZoneId {
    type Error = InvalidZone;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ZoneId> for i64 {
    fn from(zone: ZoneId) -> Self {
        i64::from(zone.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The parsed content of a zone marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMarker {
    /// The trust zone recorded in the marker.
    pub zone_id: ZoneId,

    /// Informational origin reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_url: Option<String>,
}

impl ZoneMarker {
    /// Creates a marker without a host URL.
    pub fn new(zone_id: ZoneId) -> Self {
        Self {
            zone_id,
            host_url: None,
        }
    }

    /// Sets the host URL.
    pub fn with_host_url(mut self, host_url: impl Into<String>) -> Self {
        self.host_url = Some(host_url.into());
        self
    }

    /// Returns the host URL, falling back to [`DEFAULT_HOST_URL`].
    pub fn host_url_or_default(&self) -> &str {
        self.host_url.as_deref().unwrap_or(DEFAULT_HOST_URL)
    }
}

/// How two target paths are compared for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathComparison {
    /// Paths are equal when their text matches ignoring case.
    CaseInsensitive,
    /// Paths are equal only when byte-identical.
    Exact,
}

impl PathComparison {
    /// Returns the rule of the platform's default filesystem.
    pub fn platform() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            Self::CaseInsensitive
        } else {
            Self::Exact
        }
    }

    /// Returns the key under which `path` is de-duplicated.
    pub fn key(&self, path: &Path) -> String {
        let text = path.to_string_lossy();
        match self {
            Self::CaseInsensitive => text.to_lowercase(),
            Self::Exact => text.into_owned(),
        }
    }

    /// Returns `true` if both paths identify the same target.
    pub fn same(&self, a: &Path, b: &Path) -> bool {
        self.key(a) == self.key(b)
    }
}

impl Default for PathComparison {
    fn default() -> Self {
        Self::platform()
    }
}
