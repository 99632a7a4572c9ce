//! Execution of one batch unit against the store.

use crate::audit::{emit_store_operation, StoreOperation};
use crate::batch::outcome::{AppliedChange, BatchOutcome, ResolvedOperation, SkipReason};
use crate::core::StoreResult;
use crate::policy::{wash_once, WashResult};
use crate::store::ZoneStore;

use std::path::Path;

/// Applies `operation` to one target. Never fails: store errors become
/// `BatchOutcome::Failed`.
pub(crate) async fn execute(
    store: &dyn ZoneStore,
    path: &Path,
    operation: ResolvedOperation,
    default_host_url: &str,
) -> BatchOutcome {
    match apply(store, path, operation, default_host_url).await {
        Ok(outcome) => outcome,
        Err(err) => BatchOutcome::from(&err),
    }
}

async fn apply(
    store: &dyn ZoneStore,
    path: &Path,
    operation: ResolvedOperation,
    default_host_url: &str,
) -> StoreResult<BatchOutcome> {
    emit_store_operation(StoreOperation::Check, path, store.check_target(path).await)?;
    let current = emit_store_operation(StoreOperation::Read, path, store.read(path).await)?;
    let current_zone = current.as_ref().map(|marker| marker.zone_id);

    let change = match operation {
        ResolvedOperation::Inspect => AppliedChange::Inspected { zone: current_zone },

        ResolvedOperation::Mark(zone) => {
            emit_store_operation(
                StoreOperation::Write,
                path,
                store.write(path, zone, Some(default_host_url)).await,
            )?;
            AppliedChange::Marked {
                previous: current_zone,
                zone,
            }
        }

        ResolvedOperation::Unmark => {
            emit_store_operation(StoreOperation::Remove, path, store.remove(path).await)?;
            AppliedChange::Unmarked {
                previous: current_zone,
            }
        }

        ResolvedOperation::Wash => {
            let Some(from) = current_zone else {
                return Ok(BatchOutcome::skipped(SkipReason::AlreadyClean));
            };

            match wash_once(Some(from)) {
                WashResult::AlreadyClean => {
                    return Ok(BatchOutcome::skipped(SkipReason::AlreadyClean));
                }
                WashResult::Remove => {
                    emit_store_operation(StoreOperation::Remove, path, store.remove(path).await)?;
                    AppliedChange::Removed { from }
                }
                WashResult::Reassign { zone: to } => {
                    // Washing keeps the recorded origin.
                    let host_url = current
                        .as_ref()
                        .and_then(|marker| marker.host_url.as_deref())
                        .unwrap_or(default_host_url);
                    emit_store_operation(
                        StoreOperation::Write,
                        path,
                        store.write(path, to, Some(host_url)).await,
                    )?;
                    AppliedChange::Reassigned { from, to }
                }
            }
        }
    };

    Ok(BatchOutcome::success(change))
}
