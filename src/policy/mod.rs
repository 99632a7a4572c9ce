//! Zone transition policy.
//!
//! Pure functions deciding how a file's zone changes when it is washed.
//! Washing is monotonic de-escalation, one zone per pass, ending in marker
//! removal at zone 0.

mod transition;

pub use transition::{preview_next, validate_zone, wash_once, WashResult};
