//! Target intake.
//!
//! The [`TargetList`] is the caller's collection of files. It de-duplicates
//! paths, keeps each file's last observed zone with a wash preview, and
//! takes batch results back through [`TargetList::apply`].

mod list;

pub use list::{AddReport, FileTarget, IntakeSkip, TargetList};
