//! Core types for the zonewash library.
//!
//! This module provides the fundamental building blocks used throughout
//! the library:
//!
//! - [`types`] - `ZoneId`, `ZoneMarker` and the path comparison rule
//! - [`marker`] - The `Zone.Identifier` text codec
//! - [`error`] - Structured error types and the `ErrorKind` taxonomy

pub mod error;
pub mod marker;
pub mod types;

// Re-export commonly used types at the core level
pub use error::{BatchError, BatchResult, ErrorKind, InvalidZone, StoreError, StoreResult};
pub use types::{PathComparison, ZoneId, ZoneMarker, DEFAULT_HOST_URL};
