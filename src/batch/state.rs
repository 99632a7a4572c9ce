//! Batch run state machine.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle state of an orchestrator's batch slot.
///
/// `Idle -> Running -> (Completed | Cancelled)`, and back to `Running` when
/// the next batch starts. Only one batch may be `Running` at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BatchState {
    /// No batch has run yet.
    #[default]
    Idle = 0,
    /// A batch is in progress.
    Running = 1,
    /// The last batch processed every target.
    Completed = 2,
    /// The last batch stopped early on request.
    Cancelled = 3,
}

impl BatchState {
    /// Returns `true` for `Completed` and `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns the name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Cancelled,
            _ => Self::Idle,
        }
    }
}

/// Atomic holder of the current [`BatchState`].
#[derive(Debug, Default)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn load(&self) -> BatchState {
        BatchState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves into `Running` unless a batch already is.
    ///
    /// The check and the transition are one atomic step.
    pub(crate) fn try_begin(self: &Arc<Self>) -> Option<RunGuard> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                (BatchState::from_u8(raw) != BatchState::Running)
                    .then_some(BatchState::Running as u8)
            })
            .ok()
            .map(|_| RunGuard {
                cell: Arc::clone(self),
                finished: false,
            })
    }

    fn store(&self, state: BatchState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Ownership of the `Running` slot.
///
/// Dropping the guard without calling [`RunGuard::finish`] (for example when
/// the batch future is dropped) leaves the slot `Cancelled`.
#[derive(Debug)]
pub(crate) struct RunGuard {
    cell: Arc<StateCell>,
    finished: bool,
}

impl RunGuard {
    pub(crate) fn finish(mut self, state: BatchState) {
        self.cell.store(state);
        self.finished = true;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.cell.store(BatchState::Cancelled);
        }
    }
}
