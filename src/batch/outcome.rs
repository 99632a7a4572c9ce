//! Batch operations, per-item outcomes and the batch summary.

use crate::batch::state::BatchState;
use crate::core::{ErrorKind, InvalidZone, StoreError, ZoneId};
use crate::policy::validate_zone;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The operation a batch applies to every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "zone", rename_all = "snake_case")]
pub enum BatchOperation {
    /// Read each target's current zone.
    Inspect,
    /// Set each target's zone to the given value, which must be in `[0,4]`.
    Mark(i64),
    /// Remove each target's marker.
    Unmark,
    /// Lower each target's zone by one step.
    Wash,
}

impl BatchOperation {
    /// Returns the operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inspect => "inspect",
            Self::Mark(_) => "mark",
            Self::Unmark => "unmark",
            Self::Wash => "wash",
        }
    }

    pub(crate) fn resolve(&self) -> Result<ResolvedOperation, InvalidZone> {
        Ok(match self {
            Self::Inspect => ResolvedOperation::Inspect,
            Self::Mark(raw) => ResolvedOperation::Mark(validate_zone(*raw)?),
            Self::Unmark => ResolvedOperation::Unmark,
            Self::Wash => ResolvedOperation::Wash,
        })
    }
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mark(zone) => write!(f, "mark (zone {zone})"),
            other => f.write_str(other.name()),
        }
    }
}

/// A [`BatchOperation`] whose arguments have been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolvedOperation {
    Inspect,
    Mark(ZoneId),
    Unmark,
    Wash,
}

/// Why a target was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Washing found no marker.
    AlreadyClean,
    /// The same path appeared earlier in the batch.
    DuplicateTarget,
}

/// The change a successful unit made, or observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppliedChange {
    /// The zone was read.
    Inspected {
        /// Current zone, `None` if unmarked.
        zone: Option<ZoneId>,
    },
    /// A marker was written.
    Marked {
        /// Zone before the write.
        previous: Option<ZoneId>,
        /// Zone written.
        zone: ZoneId,
    },
    /// The marker was removed.
    Unmarked {
        /// Zone before removal.
        previous: Option<ZoneId>,
    },
    /// Washing moved the file one zone down.
    Reassigned {
        /// Zone before washing.
        from: ZoneId,
        /// Zone after washing.
        to: ZoneId,
    },
    /// Washing removed a zone 0 marker.
    Removed {
        /// Zone before removal.
        from: ZoneId,
    },
}

impl AppliedChange {
    /// Returns the zone the file is in afterwards, `None` meaning unmarked.
    pub fn zone(&self) -> Option<ZoneId> {
        match self {
            Self::Inspected { zone } => *zone,
            Self::Marked { zone, .. } => Some(*zone),
            Self::Reassigned { to, .. } => Some(*to),
            Self::Unmarked { .. } | Self::Removed { .. } => None,
        }
    }
}

/// Result of processing one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Nothing was changed.
    Skipped {
        /// Why the target was skipped.
        reason: SkipReason,
    },
    /// The operation succeeded.
    Success {
        /// What happened.
        change: AppliedChange,
    },
    /// The operation failed for this target only.
    Failed {
        /// Error category.
        kind: ErrorKind,
        /// Human-readable detail.
        detail: String,
    },
}

impl BatchOutcome {
    /// Creates a `Skipped` outcome.
    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }

    /// Creates a `Success` outcome.
    pub fn success(change: AppliedChange) -> Self {
        Self::Success { change }
    }

    /// Creates a `Failed` outcome.
    pub fn failed(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            detail: detail.into(),
        }
    }

    /// Returns true if the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns true if the operation failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns the error category of a failed outcome.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the zone state known after this outcome.
    ///
    /// The outer `Option` is `None` when the outcome says nothing about the
    /// file's zone (a failure or a duplicate).
    pub fn known_zone(&self) -> Option<Option<ZoneId>> {
        match self {
            Self::Success { change } => Some(change.zone()),
            Self::Skipped {
                reason: SkipReason::AlreadyClean,
            } => Some(None),
            Self::Skipped {
                reason: SkipReason::DuplicateTarget,
            }
            | Self::Failed { .. } => None,
        }
    }
}

impl From<&StoreError> for BatchOutcome {
    fn from(err: &StoreError) -> Self {
        Self::failed(err.kind(), err.to_string())
    }
}

/// Outcome of one target, as delivered to the progress callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    /// Position of the target in the batch input.
    pub index: usize,
    /// The target path.
    pub path: PathBuf,
    /// What happened.
    pub outcome: BatchOutcome,
}

/// Counts per outcome category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Targets whose zone was read.
    pub inspected: usize,
    /// Targets that received a marker.
    pub marked: usize,
    /// Targets whose marker was removed by unmark.
    pub unmarked: usize,
    /// Targets washed one zone down.
    pub washed: usize,
    /// Targets whose zone 0 marker was removed by washing.
    pub removed: usize,
    /// Targets washing found without a marker.
    pub clean: usize,
    /// Targets skipped for other reasons.
    pub skipped: usize,
    /// Targets that failed.
    pub failed: usize,
}

impl OutcomeCounts {
    /// Adds one outcome to the counts.
    pub fn record(&mut self, outcome: &BatchOutcome) {
        match outcome {
            BatchOutcome::Success { change } => match change {
                AppliedChange::Inspected { .. } => self.inspected += 1,
                AppliedChange::Marked { .. } => self.marked += 1,
                AppliedChange::Unmarked { .. } => self.unmarked += 1,
                AppliedChange::Reassigned { .. } => self.washed += 1,
                AppliedChange::Removed { .. } => self.removed += 1,
            },
            BatchOutcome::Skipped {
                reason: SkipReason::AlreadyClean,
            } => self.clean += 1,
            BatchOutcome::Skipped { .. } => self.skipped += 1,
            BatchOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Returns the number of recorded outcomes.
    pub fn total(&self) -> usize {
        self.inspected
            + self.marked
            + self.unmarked
            + self.washed
            + self.removed
            + self.clean
            + self.skipped
            + self.failed
    }
}

/// Aggregate result of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Unique batch ID.
    pub id: Uuid,
    /// The operation applied.
    pub operation: BatchOperation,
    /// `Completed`, or `Cancelled` if the batch stopped early.
    pub state: BatchState,
    /// Number of targets submitted.
    pub total: usize,
    /// Number of targets processing was started for.
    pub attempted: usize,
    /// Counts per outcome category.
    pub counts: OutcomeCounts,
    /// Per-target reports in completion order.
    pub items: Vec<ItemReport>,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// When the batch finished.
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchSummary {
    pub(crate) fn new(id: Uuid, operation: BatchOperation, total: usize) -> Self {
        Self {
            id,
            operation,
            state: BatchState::Running,
            total,
            attempted: 0,
            counts: OutcomeCounts::default(),
            items: Vec::with_capacity(total),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub(crate) fn record(&mut self, report: ItemReport) {
        self.counts.record(&report.outcome);
        self.items.push(report);
    }

    pub(crate) fn finish(&mut self, state: BatchState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }

    /// Returns true if the batch stopped early.
    pub fn is_cancelled(&self) -> bool {
        self.state == BatchState::Cancelled
    }

    /// Returns the outcome recorded for `path`, if any.
    pub fn outcome_for(&self, path: impl AsRef<Path>) -> Option<&BatchOutcome> {
        let path = path.as_ref();
        self.items
            .iter()
            .find(|item| item.path == path)
            .map(|item| &item.outcome)
    }

    /// Returns the reports of failed targets.
    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|item| item.outcome.is_failed())
    }

    /// Wall-clock duration, once finished.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|end| end - self.started_at)
    }

    /// Renders the counts as a short status line, e.g.
    /// `"2 washed, 1 marker removed, 1 already clean"`.
    pub fn status_line(&self) -> String {
        let c = &self.counts;
        let mut parts = Vec::new();
        let mut push = |count: usize, label: &str| {
            if count > 0 {
                parts.push(format!("{count} {label}"));
            }
        };

        push(c.inspected, "inspected");
        push(c.marked, "marked");
        push(c.unmarked, "unmarked");
        push(c.washed, "washed");
        push(
            c.removed,
            if c.removed == 1 {
                "marker removed"
            } else {
                "markers removed"
            },
        );
        push(c.clean, "already clean");
        push(c.skipped, "skipped");
        push(c.failed, "failed");

        let mut line = if parts.is_empty() {
            "nothing processed".to_string()
        } else {
            parts.join(", ")
        };
        if self.is_cancelled() {
            line.push_str(&format!(
                " (cancelled after {} of {})",
                self.attempted, self.total
            ));
        }
        line
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.operation, self.state.name(), self.status_line())
    }
}
