//! Zone transition rules.

use crate::core::{InvalidZone, ZoneId};

use serde::{Deserialize, Serialize};

/// What washing a file once should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WashResult {
    /// The file carries no marker; nothing to do.
    AlreadyClean,

    /// The file is at zone 0; the marker is deleted outright.
    Remove,

    /// The file moves one zone towards trusted.
    Reassign {
        /// The zone to write.
        zone: ZoneId,
    },
}

impl WashResult {
    /// Returns true if washing changes the marker.
    pub fn changes_marker(&self) -> bool {
        !matches!(self, Self::AlreadyClean)
    }

    /// Returns the zone the file ends up in, `None` meaning unmarked.
    pub fn resulting_zone(&self) -> Option<ZoneId> {
        match self {
            Self::Reassign { zone } => Some(*zone),
            Self::AlreadyClean | Self::Remove => None,
        }
    }
}

/// Computes the effect of washing a file currently in `current` once.
///
/// Washing lowers the zone by exactly one step. At zone 0 there is no more
/// trusted zone, so the marker is removed instead.
pub fn wash_once(current: Option<ZoneId>) -> WashResult {
    match current {
        None => WashResult::AlreadyClean,
        Some(zone) => match zone.lower() {
            Some(lower) => WashResult::Reassign { zone: lower },
            None => WashResult::Remove,
        },
    }
}

/// Returns the zone one wash would reassign to, for display.
///
/// `None` when the file is unmarked or already at zone 0.
pub fn preview_next(current: Option<ZoneId>) -> Option<ZoneId> {
    current.and_then(|zone| zone.lower())
}

/// Validates an explicit, caller-supplied target zone.
pub fn validate_zone(raw: i64) -> Result<ZoneId, InvalidZone> {
    ZoneId::new(raw)
}
