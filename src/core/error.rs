//! Error types for the zonewash library.
//!
//! Store operations return [`StoreError`], the batch surface returns
//! [`BatchError`], and every failure can be flattened into an [`ErrorKind`]
//! for reporting. The library never panics; all errors are returned as
//! `Result` values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A zone value outside the valid `[0,4]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid zone id {value}: must be between 0 and 4")]
pub struct InvalidZone {
    /// The rejected value.
    pub value: i64,
}

/// Flat error taxonomy used in batch outcomes and audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The target file does not exist.
    NotFound,
    /// A zone argument was outside `[0,4]`.
    InvalidZone,
    /// The filesystem refused access.
    AccessDenied,
    /// Any other I/O failure.
    Io,
    /// Another batch is already running.
    BatchBusy,
    /// The batch was stopped cooperatively.
    Cancelled,
}

impl ErrorKind {
    /// Returns the snake_case name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidZone => "invalid_zone",
            Self::AccessDenied => "access_denied",
            Self::Io => "io",
            Self::BatchBusy => "batch_busy",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for zone store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The target file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The requested zone is out of range.
    #[error(transparent)]
    InvalidZone(#[from] InvalidZone),

    /// Permission was denied while touching the file or its marker.
    #[error("access denied: {}: {source}", path.display())]
    AccessDenied {
        /// Path the operation was working on.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Any other I/O failure.
    #[error("I/O error during {context} on {}: {source}", path.display())]
    Io {
        /// Short description of the failing step.
        context: &'static str,
        /// Path the operation was working on.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Creates a `NotFound` error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Classifies an [`io::Error`] raised while working on `path`.
    pub fn from_io(context: &'static str, path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::not_found(path),
            io::ErrorKind::PermissionDenied => Self::AccessDenied {
                path: path.to_path_buf(),
                source,
            },
            _ => Self::Io {
                context,
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Creates the error for a host URL that cannot be stored.
    pub fn invalid_host_url(path: &Path) -> Self {
        Self::from_io(
            "validate host url",
            path,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "host url must be a single line",
            ),
        )
    }

    /// Returns the taxonomy entry for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidZone(_) => ErrorKind::InvalidZone,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Returns `true` if the target file was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Error type surfaced by the batch orchestrator to its caller.
#[derive(Debug, Error)]
pub enum BatchError {
    /// A batch is already running on this orchestrator.
    #[error("a batch is already running")]
    Busy,

    /// The background task driving a spawned batch failed.
    #[error("batch task failed: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl BatchError {
    /// Creates an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns the taxonomy entry for this error, if it has one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Busy => Some(ErrorKind::BatchBusy),
            _ => None,
        }
    }
}

/// A specialized `Result` type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A specialized `Result` type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
