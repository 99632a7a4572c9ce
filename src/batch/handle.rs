//! Handle to a batch running in the background.

use crate::batch::outcome::BatchSummary;
use crate::core::{BatchError, BatchResult};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A handle to a spawned batch.
///
/// Dropping the handle does not stop the batch; call [`BatchHandle::cancel`]
/// for that.
#[derive(Debug)]
pub struct BatchHandle {
    /// Unique identifier of the batch, matching [`BatchSummary::id`].
    pub id: Uuid,
    cancel: CancellationToken,
    task: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    pub(crate) fn new(id: Uuid, cancel: CancellationToken, task: JoinHandle<BatchSummary>) -> Self {
        Self { id, cancel, task }
    }

    /// Requests cooperative cancellation.
    ///
    /// Units already running finish; no new unit starts.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns a clone of the batch's cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns true if the batch has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the batch to finish and returns its summary.
    pub async fn join(self) -> BatchResult<BatchSummary> {
        self.task
            .await
            .map_err(|e| BatchError::internal(e.to_string()))
    }
}
