//! The batch orchestrator implementation.

use crate::audit;
use crate::batch::handle::BatchHandle;
use crate::batch::outcome::{BatchOperation, BatchOutcome, BatchSummary, ItemReport, SkipReason};
use crate::batch::state::{BatchState, RunGuard, StateCell};
use crate::batch::unit;
use crate::core::marker;
use crate::core::{BatchError, BatchResult, ErrorKind, PathComparison, DEFAULT_HOST_URL};
use crate::store::{ArcZoneStore, ZoneStore};

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Default number of units processed in parallel.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Configuration for the batch orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of units in flight at once.
    pub max_workers: usize,

    /// Host URL written by `Mark`, and by `Wash` when the old marker had none.
    pub default_host_url: String,

    /// Whether repeated paths within one batch are skipped.
    pub dedupe_targets: bool,

    /// How paths are compared when de-duplicating.
    pub path_comparison: PathComparison,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            default_host_url: DEFAULT_HOST_URL.to_string(),
            dedupe_targets: true,
            path_comparison: PathComparison::platform(),
        }
    }
}

impl BatchConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> BatchResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BatchError::configuration(format!("invalid batch config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the orchestrator cannot run with.
    pub fn validate(&self) -> BatchResult<()> {
        if self.max_workers == 0 {
            return Err(BatchError::configuration("max_workers must be at least 1"));
        }
        if !marker::is_valid_host_url(&self.default_host_url) {
            return Err(BatchError::configuration(
                "default_host_url must be a single line",
            ));
        }
        Ok(())
    }

    /// Sets the maximum number of parallel units.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Sets the default host URL.
    pub fn with_default_host_url(mut self, url: impl Into<String>) -> Self {
        self.default_host_url = url.into();
        self
    }

    /// Enables or disables in-batch de-duplication.
    pub fn with_dedupe_targets(mut self, enabled: bool) -> Self {
        self.dedupe_targets = enabled;
        self
    }

    /// Sets the path comparison rule.
    pub fn with_path_comparison(mut self, comparison: PathComparison) -> Self {
        self.path_comparison = comparison;
        self
    }
}

/// Builder for creating a `BatchOrchestrator`.
#[derive(Default)]
pub struct BatchOrchestratorBuilder {
    store: Option<ArcZoneStore>,
    config: BatchConfig,
}

impl BatchOrchestratorBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the zone store.
    pub fn with_store<S: ZoneStore + 'static>(mut self, store: S) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Sets a zone store wrapped in an Arc.
    pub fn with_arc_store(mut self, store: ArcZoneStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the orchestrator.
    pub fn build(self) -> BatchResult<BatchOrchestrator> {
        let store = self
            .store
            .ok_or_else(|| BatchError::configuration("a zone store is required"))?;
        self.config.validate()?;

        Ok(BatchOrchestrator {
            store,
            config: self.config,
            state: Arc::new(StateCell::default()),
        })
    }
}

/// Drives a list of files through one operation.
///
/// Units run concurrently, up to [`BatchConfig::max_workers`] at a time.
/// Progress callbacks and summary counters are driven from the single task
/// running the batch, so callers see them strictly one at a time and need
/// no locking of their own. Only one batch runs per orchestrator; a second
/// start is rejected with [`BatchError::Busy`].
pub struct BatchOrchestrator {
    store: ArcZoneStore,
    config: BatchConfig,
    state: Arc<StateCell>,
}

impl BatchOrchestrator {
    /// Creates a new builder.
    pub fn builder() -> BatchOrchestratorBuilder {
        BatchOrchestratorBuilder::new()
    }

    /// Returns the state of the batch slot.
    pub fn state(&self) -> BatchState {
        self.state.load()
    }

    /// Returns true if a batch is running.
    pub fn is_running(&self) -> bool {
        self.state() == BatchState::Running
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Returns the zone store.
    pub fn store(&self) -> &ArcZoneStore {
        &self.store
    }

    /// Runs `operation` over `targets` and waits for the summary.
    ///
    /// `on_item` is called once per processed target, in completion order.
    /// Cancelling `cancel` stops new units from starting; the summary then
    /// reports [`BatchState::Cancelled`] with partial counts.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Busy`] if a batch is already running. Per-target
    /// failures never surface here; they are recorded in the summary.
    pub async fn run_batch<T, F>(
        &self,
        targets: &[T],
        operation: BatchOperation,
        cancel: &CancellationToken,
        on_item: F,
    ) -> BatchResult<BatchSummary>
    where
        T: AsRef<Path>,
        F: FnMut(&ItemReport) + Send,
    {
        let guard = self.state.try_begin().ok_or(BatchError::Busy)?;
        let paths = collect_paths(targets);

        Ok(self
            .drive(guard, Uuid::new_v4(), paths, operation, cancel.clone(), on_item)
            .await)
    }

    /// Starts a batch in the background and returns immediately.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Busy`] if a batch is already running.
    pub fn spawn_batch<T, F>(
        self: &Arc<Self>,
        targets: &[T],
        operation: BatchOperation,
        on_item: F,
    ) -> BatchResult<BatchHandle>
    where
        T: AsRef<Path>,
        F: FnMut(&ItemReport) + Send + 'static,
    {
        let guard = self.state.try_begin().ok_or(BatchError::Busy)?;
        let paths = collect_paths(targets);

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let orchestrator = Arc::clone(self);
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            orchestrator
                .drive(guard, id, paths, operation, token, on_item)
                .await
        });

        Ok(BatchHandle::new(id, cancel, task))
    }

    async fn drive<F>(
        &self,
        guard: RunGuard,
        id: Uuid,
        paths: Vec<PathBuf>,
        operation: BatchOperation,
        cancel: CancellationToken,
        mut on_item: F,
    ) -> BatchSummary
    where
        F: FnMut(&ItemReport) + Send,
    {
        let mut summary = BatchSummary::new(id, operation, paths.len());
        audit::emit_batch_started(&summary, self.store.name());

        let resolved = operation.resolve();
        let mut seen = HashSet::new();
        let mut workers: JoinSet<ItemReport> = JoinSet::new();
        let mut cancelled = false;

        for (index, path) in paths.into_iter().enumerate() {
            while workers.len() >= self.config.max_workers {
                if let Some(report) = next_report(&mut workers).await {
                    deliver(&mut summary, &mut on_item, report);
                }
            }

            // Checked before every unit; running units are never interrupted.
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            summary.attempted += 1;

            if self.config.dedupe_targets
                && !seen.insert(self.config.path_comparison.key(&path))
            {
                let report = ItemReport {
                    index,
                    path,
                    outcome: BatchOutcome::skipped(SkipReason::DuplicateTarget),
                };
                deliver(&mut summary, &mut on_item, report);
                continue;
            }

            let operation = match &resolved {
                Ok(operation) => *operation,
                Err(invalid) => {
                    let report = ItemReport {
                        index,
                        path,
                        outcome: BatchOutcome::failed(ErrorKind::InvalidZone, invalid.to_string()),
                    };
                    deliver(&mut summary, &mut on_item, report);
                    continue;
                }
            };

            let store = Arc::clone(&self.store);
            let host_url = self.config.default_host_url.clone();
            workers.spawn(async move {
                let outcome =
                    AssertUnwindSafe(unit::execute(store.as_ref(), &path, operation, &host_url))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            tracing::error!(path = %path.display(), "Batch unit panicked");
                            BatchOutcome::failed(ErrorKind::Io, "store operation panicked")
                        });
                ItemReport {
                    index,
                    path,
                    outcome,
                }
            });
        }

        while let Some(report) = next_report(&mut workers).await {
            deliver(&mut summary, &mut on_item, report);
        }

        let state = if cancelled {
            BatchState::Cancelled
        } else {
            BatchState::Completed
        };

        summary.finish(state);
        audit::emit_batch_completed(&summary);
        guard.finish(state);
        summary
    }
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("store", &self.store.name())
            .field("state", &self.state())
            .field("config", &self.config)
            .finish()
    }
}

fn collect_paths<T: AsRef<Path>>(targets: &[T]) -> Vec<PathBuf> {
    targets.iter().map(|t| t.as_ref().to_path_buf()).collect()
}

/// Waits for the next finished unit. `None` once no units are in flight.
async fn next_report(workers: &mut JoinSet<ItemReport>) -> Option<ItemReport> {
    loop {
        match workers.join_next().await? {
            Ok(report) => return Some(report),
            // Units catch their own panics, so this only happens on abort.
            Err(e) => tracing::warn!(error = %e, "Batch unit did not complete"),
        }
    }
}

fn deliver<F>(summary: &mut BatchSummary, on_item: &mut F, report: ItemReport)
where
    F: FnMut(&ItemReport),
{
    audit::emit_item_completed(&summary.id, &report);
    on_item(&report);
    summary.record(report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::outcome::AppliedChange;
    use crate::core::ZoneId;
    use crate::store::MemoryZoneStore;
    use crate::core::{StoreResult, ZoneMarker};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Wraps a store and records the most calls ever in flight at once.
    #[derive(Debug)]
    struct PeakTrackingStore {
        inner: MemoryZoneStore,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl PeakTrackingStore {
        fn new(inner: MemoryZoneStore) -> Self {
            Self {
                inner,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        async fn track<T>(&self, call: impl Future<Output = T>) -> T {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let result = call.await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    #[async_trait]
    impl ZoneStore for PeakTrackingStore {
        async fn check_target(&self, path: &Path) -> StoreResult<()> {
            self.track(self.inner.check_target(path)).await
        }

        async fn read(&self, path: &Path) -> StoreResult<Option<ZoneMarker>> {
            self.track(self.inner.read(path)).await
        }

        async fn write(
            &self,
            path: &Path,
            zone: ZoneId,
            host_url: Option<&str>,
        ) -> StoreResult<()> {
            self.track(self.inner.write(path, zone, host_url)).await
        }

        async fn remove(&self, path: &Path) -> StoreResult<()> {
            self.track(self.inner.remove(path)).await
        }
    }

    fn orchestrator(store: MemoryZoneStore) -> (BatchOrchestrator, Arc<MemoryZoneStore>) {
        let store = Arc::new(store);
        let orchestrator = BatchOrchestrator::builder()
            .with_arc_store(store.clone())
            .with_config(BatchConfig::new().with_path_comparison(PathComparison::CaseInsensitive))
            .build()
            .unwrap();
        (orchestrator, store)
    }

    #[tokio::test]
    async fn test_wash_end_to_end() {
        let (orchestrator, _store) = orchestrator(
            MemoryZoneStore::new()
                .with_marked_file("/dl/internet.exe", ZoneId::INTERNET)
                .with_marked_file("/dl/local.exe", ZoneId::LOCAL_MACHINE)
                .with_file("/dl/plain.txt"),
        );
        let targets = ["/dl/internet.exe", "/dl/local.exe", "/dl/plain.txt"];

        let summary = orchestrator
            .run_batch(&targets, BatchOperation::Wash, &CancellationToken::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(summary.state, BatchState::Completed);
        assert_eq!(summary.attempted, 3);
        assert_eq!(
            summary.outcome_for("/dl/internet.exe"),
            Some(&BatchOutcome::success(AppliedChange::Reassigned {
                from: ZoneId::INTERNET,
                to: ZoneId::TRUSTED,
            }))
        );
        assert_eq!(
            summary.outcome_for("/dl/local.exe"),
            Some(&BatchOutcome::success(AppliedChange::Removed {
                from: ZoneId::LOCAL_MACHINE,
            }))
        );
        assert_eq!(
            summary.outcome_for("/dl/plain.txt"),
            Some(&BatchOutcome::skipped(SkipReason::AlreadyClean))
        );
        assert_eq!(summary.counts.washed, 1);
        assert_eq!(summary.counts.removed, 1);
        assert_eq!(summary.counts.clean, 1);
        assert_eq!(summary.counts.failed, 0);
        assert_eq!(orchestrator.state(), BatchState::Completed);
    }

    #[tokio::test]
    async fn test_missing_target_is_isolated() {
        let (orchestrator, _store) = orchestrator(
            MemoryZoneStore::new()
                .with_marked_file("/dl/a.zip", ZoneId::RESTRICTED)
                .with_marked_file("/dl/b.zip", ZoneId::INTERNET),
        );
        let targets = ["/dl/a.zip", "/dl/missing.zip", "/dl/b.zip"];

        let summary = orchestrator
            .run_batch(&targets, BatchOperation::Wash, &CancellationToken::new(), |_| {})
            .await
            .unwrap();

        assert_eq!(
            summary
                .outcome_for("/dl/missing.zip")
                .and_then(BatchOutcome::error_kind),
            Some(ErrorKind::NotFound)
        );
        assert_eq!(summary.counts.washed, 2);
        assert_eq!(summary.counts.failed, 1);
        assert_eq!(summary.state, BatchState::Completed);
    }

    #[tokio::test]
    async fn test_overlapping_batch_is_busy() {
        let store = Arc::new(
            MemoryZoneStore::new()
                .with_marked_file("/dl/first.exe", ZoneId::INTERNET)
                .with_marked_file("/dl/second.exe", ZoneId::INTERNET)
                .with_latency(Duration::from_millis(20)),
        );
        let orchestrator = Arc::new(
            BatchOrchestrator::builder()
                .with_arc_store(store.clone())
                .build()
                .unwrap(),
        );

        let handle = orchestrator
            .spawn_batch(&["/dl/first.exe"], BatchOperation::Wash, |_| {})
            .unwrap();
        assert!(orchestrator.is_running());

        let second = orchestrator
            .run_batch(
                &["/dl/second.exe"],
                BatchOperation::Wash,
                &CancellationToken::new(),
                |_| {},
            )
            .await;
        assert!(matches!(second, Err(BatchError::Busy)));

        let spawned = orchestrator.spawn_batch(&["/dl/second.exe"], BatchOperation::Wash, |_| {});
        assert!(matches!(spawned, Err(BatchError::Busy)));

        let summary = handle.join().await.unwrap();
        assert_eq!(summary.counts.washed, 1);
        assert!(!store.was_touched(Path::new("/dl/second.exe")));

        // The slot is free again once the first batch finishes.
        let summary = orchestrator
            .run_batch(
                &["/dl/second.exe"],
                BatchOperation::Wash,
                &CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap();
        assert_eq!(summary.counts.washed, 1);
    }

    #[tokio::test]
    async fn test_worker_pool_is_bounded() {
        for max_workers in [1, 3] {
            let mut inner = MemoryZoneStore::new().with_latency(Duration::from_millis(10));
            let targets: Vec<PathBuf> = (0..12)
                .map(|i| PathBuf::from(format!("/dl/pool{i}.bin")))
                .collect();
            for path in &targets {
                inner = inner.with_marked_file(path, ZoneId::INTERNET);
            }
            let store = Arc::new(PeakTrackingStore::new(inner));
            let orchestrator = BatchOrchestrator::builder()
                .with_arc_store(store.clone())
                .with_config(BatchConfig::new().with_max_workers(max_workers))
                .build()
                .unwrap();

            let summary = orchestrator
                .run_batch(
                    &targets,
                    BatchOperation::Inspect,
                    &CancellationToken::new(),
                    |_| {},
                )
                .await
                .unwrap();

            assert_eq!(summary.counts.inspected, 12);
            if max_workers == 1 {
                assert_eq!(store.peak(), 1);
            } else {
                assert!(store.peak() > 1, "units never overlapped");
                assert!(store.peak() <= max_workers, "peak {} over bound", store.peak());
            }
        }
    }

    #[tokio::test]
    async fn test_cancel_mid_batch_keeps_in_flight_units() {
        let mut store = MemoryZoneStore::new().with_latency(Duration::from_millis(5));
        let targets: Vec<PathBuf> = (0..10)
            .map(|i| PathBuf::from(format!("/dl/file{i}.bin")))
            .collect();
        for path in &targets {
            store = store.with_marked_file(path, ZoneId::INTERNET);
        }
        let store = Arc::new(store);
        let orchestrator = BatchOrchestrator::builder()
            .with_arc_store(store.clone())
            .with_config(BatchConfig::new().with_max_workers(2))
            .build()
            .unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let summary = orchestrator
            .run_batch(&targets, BatchOperation::Wash, &cancel, move |_| trigger.cancel())
            .await
            .unwrap();

        assert_eq!(summary.state, BatchState::Cancelled);
        assert_eq!(summary.total, 10);
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.items.len(), 2);
        assert_eq!(summary.counts.washed, 2);
        assert_eq!(orchestrator.state(), BatchState::Cancelled);

        let untouched = targets
            .iter()
            .filter(|path| !store.was_touched(path))
            .count();
        assert_eq!(untouched, 8);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (orchestrator, store) =
            orchestrator(MemoryZoneStore::new().with_marked_file("/dl/a.exe", ZoneId::INTERNET));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = orchestrator
            .run_batch(&["/dl/a.exe"], BatchOperation::Wash, &cancel, |_| {})
            .await
            .unwrap();

        assert!(summary.is_cancelled());
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.counts.total(), 0);
        assert_eq!(store.operation_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_mark_zone_never_reaches_store() {
        let (orchestrator, store) = orchestrator(
            MemoryZoneStore::new()
                .with_file("/dl/a.txt")
                .with_file("/dl/b.txt"),
        );

        let summary = orchestrator
            .run_batch(
                &["/dl/a.txt", "/dl/b.txt"],
                BatchOperation::Mark(7),
                &CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(summary.counts.failed, 2);
        assert!(summary
            .items
            .iter()
            .all(|item| item.outcome.error_kind() == Some(ErrorKind::InvalidZone)));
        assert_eq!(store.operation_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_paths_are_skipped() {
        let (orchestrator, store) =
            orchestrator(MemoryZoneStore::new().with_marked_file("/dl/Setup.exe", ZoneId::INTERNET));

        let summary = orchestrator
            .run_batch(
                &["/dl/Setup.exe", "/DL/setup.EXE"],
                BatchOperation::Wash,
                &CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(summary.counts.washed, 1);
        assert_eq!(summary.counts.skipped, 1);
        assert_eq!(
            summary.outcome_for("/DL/setup.EXE"),
            Some(&BatchOutcome::skipped(SkipReason::DuplicateTarget))
        );
        assert_eq!(
            store.raw_marker(Path::new("/dl/Setup.exe")).as_deref(),
            Some("[ZoneTransfer]\r\nZoneId=2\r\nHostUrl=about:internet\r\n")
        );
    }

    #[tokio::test]
    async fn test_callback_sees_every_item_once() {
        let (orchestrator, _store) = orchestrator(
            MemoryZoneStore::new()
                .with_marked_file("/dl/a", ZoneId::RESTRICTED)
                .with_marked_file("/dl/b", ZoneId::TRUSTED)
                .with_file("/dl/c")
                .with_failure("/dl/d", ErrorKind::Io),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let summary = orchestrator
            .run_batch(
                &["/dl/a", "/dl/b", "/dl/c", "/dl/d"],
                BatchOperation::Inspect,
                &CancellationToken::new(),
                move |report| sink.lock().unwrap().push(report.index),
            )
            .await
            .unwrap();

        let mut seen = seen.lock().unwrap().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert_eq!(summary.counts.inspected, 3);
        assert_eq!(summary.counts.failed, 1);
        assert_eq!(
            summary.outcome_for("/dl/c"),
            Some(&BatchOutcome::success(AppliedChange::Inspected { zone: None }))
        );
    }

    #[tokio::test]
    async fn test_spawned_batch_cancel() {
        let mut store = MemoryZoneStore::new().with_latency(Duration::from_millis(10));
        let targets: Vec<PathBuf> = (0..20)
            .map(|i| PathBuf::from(format!("/dl/{i}.dat")))
            .collect();
        for path in &targets {
            store = store.with_file(path);
        }
        let orchestrator = Arc::new(
            BatchOrchestrator::builder()
                .with_store(store)
                .with_config(BatchConfig::new().with_max_workers(1))
                .build()
                .unwrap(),
        );

        let handle = orchestrator
            .spawn_batch(&targets, BatchOperation::Mark(3), |_| {})
            .unwrap();
        handle.cancel();
        assert!(handle.is_cancelled());

        let summary = handle.join().await.unwrap();
        assert!(summary.is_cancelled());
        assert!(summary.attempted < summary.total);
        assert_eq!(summary.counts.marked, summary.attempted);
    }

    #[test]
    fn test_builder_requires_store() {
        let result = BatchOrchestrator::builder().build();
        assert!(matches!(result, Err(BatchError::Configuration { .. })));
    }

    #[test]
    fn test_builder_rejects_zero_workers() {
        let result = BatchOrchestrator::builder()
            .with_store(MemoryZoneStore::new())
            .with_config(BatchConfig::new().with_max_workers(0))
            .build();
        assert!(matches!(result, Err(BatchError::Configuration { .. })));
    }

    #[test]
    fn test_builder_rejects_multiline_host_url() {
        let result = BatchOrchestrator::builder()
            .with_store(MemoryZoneStore::new())
            .with_config(BatchConfig::new().with_default_host_url("a\r\nZoneId=0"))
            .build();
        assert!(matches!(result, Err(BatchError::Configuration { .. })));
    }

    #[test]
    fn test_config_from_json() {
        let config =
            BatchConfig::from_json(r#"{"max_workers": 8, "path_comparison": "exact"}"#).unwrap();
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.path_comparison, PathComparison::Exact);
        assert_eq!(config.default_host_url, "about:internet");
        assert!(config.dedupe_targets);

        assert!(BatchConfig::from_json(r#"{"max_workers": 0}"#).is_err());
        assert!(BatchConfig::from_json("not json").is_err());
    }
}
