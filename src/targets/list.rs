//! The caller-owned list of files under management.

use crate::audit::{emit_store_operation, StoreOperation};
use crate::batch::BatchSummary;
use crate::core::{ErrorKind, PathComparison, StoreError, ZoneId};
use crate::policy::preview_next;
use crate::store::ZoneStore;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One file under management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTarget {
    /// Path of the file.
    pub path: PathBuf,

    /// Last observed zone, `None` when unmarked.
    pub current_zone: Option<ZoneId>,

    /// Zone the file would have after one wash, `None` when washing
    /// would leave it unmarked.
    pub next_zone: Option<ZoneId>,
}

impl FileTarget {
    /// Creates a target with a known zone and derives its preview.
    pub fn new(path: impl Into<PathBuf>, current_zone: Option<ZoneId>) -> Self {
        Self {
            path: path.into(),
            current_zone,
            next_zone: preview_next(current_zone),
        }
    }

    /// Records a newly observed zone.
    pub fn observe(&mut self, zone: Option<ZoneId>) {
        self.current_zone = zone;
        self.next_zone = preview_next(zone);
    }

    /// Returns true if washing this target would change its marker.
    pub fn needs_wash(&self) -> bool {
        self.current_zone.is_some()
    }
}

impl AsRef<Path> for FileTarget {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Why a path was not added to the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IntakeSkip {
    /// The path does not name an existing file.
    Missing,
    /// The list already holds this path.
    AlreadyPresent,
    /// The file exists but its marker could not be read.
    Unreadable {
        /// Error category.
        kind: ErrorKind,
        /// Error message.
        detail: String,
    },
}

impl From<&StoreError> for IntakeSkip {
    fn from(err: &StoreError) -> Self {
        if err.is_not_found() {
            Self::Missing
        } else {
            Self::Unreadable {
                kind: err.kind(),
                detail: err.to_string(),
            }
        }
    }
}

/// Result of adding paths to a [`TargetList`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddReport {
    /// Paths that were added, in input order.
    pub added: Vec<PathBuf>,
    /// Paths that were left out, with the reason.
    pub skipped: Vec<(PathBuf, IntakeSkip)>,
}

impl AddReport {
    /// Returns the number of paths skipped because they were already listed.
    pub fn duplicates(&self) -> usize {
        self.skipped
            .iter()
            .filter(|(_, reason)| *reason == IntakeSkip::AlreadyPresent)
            .count()
    }
}

/// An ordered, de-duplicated collection of [`FileTarget`]s.
///
/// The list is owned by the caller. Batches borrow it as a slice of targets
/// and report back through [`TargetList::apply`]; nothing in the batch layer
/// keeps a reference to it.
#[derive(Debug, Clone, Default)]
pub struct TargetList {
    targets: Vec<FileTarget>,
    keys: HashSet<String>,
    comparison: PathComparison,
}

impl TargetList {
    /// Creates an empty list using the platform's path comparison.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with an explicit path comparison.
    pub fn with_comparison(comparison: PathComparison) -> Self {
        Self {
            comparison,
            ..Self::default()
        }
    }

    /// Adds paths, reading each new file's current zone from `store`.
    ///
    /// Missing files and paths already present are skipped, as are files
    /// whose marker cannot be read.
    pub async fn add_paths<I, P>(&mut self, store: &dyn ZoneStore, paths: I) -> AddReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut report = AddReport::default();

        for path in paths {
            let path = path.into();
            let key = self.comparison.key(&path);
            if self.keys.contains(&key) {
                tracing::debug!(path = %path.display(), "Skipped, already present");
                report.skipped.push((path, IntakeSkip::AlreadyPresent));
                continue;
            }

            let checked =
                emit_store_operation(StoreOperation::Check, &path, store.check_target(&path).await);
            let zone = match checked {
                Ok(()) => emit_store_operation(StoreOperation::Read, &path, store.zone(&path).await),
                Err(e) => Err(e),
            };

            match zone {
                Ok(zone) => {
                    self.keys.insert(key);
                    self.targets.push(FileTarget::new(path.clone(), zone));
                    report.added.push(path);
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Skipped target");
                    report.skipped.push((path, IntakeSkip::from(&e)));
                }
            }
        }

        report
    }

    /// Updates zones from the outcomes of a finished batch.
    ///
    /// Returns the number of targets updated. Failed and duplicate items
    /// leave their target unchanged.
    pub fn apply(&mut self, summary: &BatchSummary) -> usize {
        let mut updated = 0;
        for item in &summary.items {
            let Some(zone) = item.outcome.known_zone() else {
                continue;
            };
            if let Some(target) = self.get_mut(&item.path) {
                target.observe(zone);
                updated += 1;
            }
        }
        updated
    }

    /// Removes a target. Returns it if it was present.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> Option<FileTarget> {
        let key = self.comparison.key(path.as_ref());
        if !self.keys.remove(&key) {
            return None;
        }
        let position = self
            .targets
            .iter()
            .position(|t| self.comparison.key(&t.path) == key)?;
        Some(self.targets.remove(position))
    }

    /// Removes every target.
    pub fn clear(&mut self) {
        self.targets.clear();
        self.keys.clear();
    }

    /// Returns the target for `path`.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&FileTarget> {
        let key = self.comparison.key(path.as_ref());
        self.targets
            .iter()
            .find(|t| self.comparison.key(&t.path) == key)
    }

    fn get_mut(&mut self, path: &Path) -> Option<&mut FileTarget> {
        let comparison = self.comparison;
        let key = comparison.key(path);
        self.targets
            .iter_mut()
            .find(|t| comparison.key(&t.path) == key)
    }

    /// Returns true if `path` is listed.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.keys.contains(&self.comparison.key(path.as_ref()))
    }

    /// Returns the targets in insertion order.
    pub fn as_slice(&self) -> &[FileTarget] {
        &self.targets
    }

    /// Returns an iterator over the targets.
    pub fn iter(&self) -> std::slice::Iter<'_, FileTarget> {
        self.targets.iter()
    }

    /// Returns the number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl<'a> IntoIterator for &'a TargetList {
    type Item = &'a FileTarget;
    type IntoIter = std::slice::Iter<'a, FileTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BatchOperation, BatchOrchestrator};
    use crate::store::MemoryZoneStore;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tokio_util::sync::CancellationToken;
    use tracing_subscriber::fmt::writer::MakeWriter;

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn audit_lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8_lossy(&bytes)
                .lines()
                .filter(|line| line.contains("zonewash::audit"))
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_add_paths_reads_zones() {
        let store = MemoryZoneStore::new()
            .with_marked_file("/dl/setup.exe", ZoneId::INTERNET)
            .with_file("/dl/notes.txt");
        let mut list = TargetList::with_comparison(PathComparison::CaseInsensitive);

        let report = list
            .add_paths(&store, ["/dl/setup.exe", "/dl/notes.txt", "/dl/gone.bin"])
            .await;

        assert_eq!(report.added.len(), 2);
        assert_eq!(
            report.skipped,
            vec![(PathBuf::from("/dl/gone.bin"), IntakeSkip::Missing)]
        );

        let setup = list.get("/dl/setup.exe").unwrap();
        assert_eq!(setup.current_zone, Some(ZoneId::INTERNET));
        assert_eq!(setup.next_zone, Some(ZoneId::TRUSTED));
        assert!(!list.get("/dl/notes.txt").unwrap().needs_wash());
    }

    #[tokio::test]
    async fn test_add_paths_emits_audit_events() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let store = MemoryZoneStore::new().with_marked_file("/dl/a.txt", ZoneId::INTERNET);
        let mut list = TargetList::new();
        list.add_paths(&store, ["/dl/a.txt", "/dl/missing.txt"]).await;

        let lines = logs.audit_lines();
        let count = |needle: &str| lines.iter().filter(|l| l.contains(needle)).count();
        assert_eq!(count("operation=check"), 2);
        assert_eq!(count("operation=read"), 1);
        assert_eq!(count("error_kind=Some(NotFound)"), 1);
    }

    #[tokio::test]
    async fn test_add_paths_skips_duplicates_case_insensitively() {
        let store = MemoryZoneStore::new().with_file("/dl/Report.PDF");
        let mut list = TargetList::with_comparison(PathComparison::CaseInsensitive);

        list.add_paths(&store, ["/dl/Report.PDF"]).await;
        let report = list.add_paths(&store, ["/DL/report.pdf"]).await;

        assert!(report.added.is_empty());
        assert_eq!(report.duplicates(), 1);
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_marker_is_skipped() {
        let store = MemoryZoneStore::new()
            .with_marked_file("/dl/locked.doc", ZoneId::RESTRICTED)
            .with_failure("/dl/locked.doc", ErrorKind::AccessDenied);
        let mut list = TargetList::new();

        let report = list.add_paths(&store, ["/dl/locked.doc"]).await;

        assert!(list.is_empty());
        assert!(matches!(
            report.skipped[0].1,
            IntakeSkip::Unreadable {
                kind: ErrorKind::AccessDenied,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_apply_updates_from_wash() {
        let store = Arc::new(
            MemoryZoneStore::new()
                .with_marked_file("/dl/a.exe", ZoneId::INTERNET)
                .with_marked_file("/dl/b.exe", ZoneId::LOCAL_MACHINE)
                .with_file("/dl/c.txt"),
        );
        let mut list = TargetList::new();
        list.add_paths(store.as_ref(), ["/dl/a.exe", "/dl/b.exe", "/dl/c.txt"])
            .await;

        let orchestrator = BatchOrchestrator::builder()
            .with_arc_store(store.clone())
            .build()
            .unwrap();
        let summary = orchestrator
            .run_batch(
                list.as_slice(),
                BatchOperation::Wash,
                &CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(list.apply(&summary), 3);

        let a = list.get("/dl/a.exe").unwrap();
        assert_eq!(a.current_zone, Some(ZoneId::TRUSTED));
        assert_eq!(a.next_zone, Some(ZoneId::INTRANET));
        let b = list.get("/dl/b.exe").unwrap();
        assert_eq!(b.current_zone, None);
        assert_eq!(b.next_zone, None);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_external_changes() {
        let store = Arc::new(
            MemoryZoneStore::new()
                .with_marked_file("/dl/a.exe", ZoneId::INTERNET)
                .with_marked_file("/dl/b.exe", ZoneId::RESTRICTED),
        );
        let mut list = TargetList::new();
        list.add_paths(store.as_ref(), ["/dl/a.exe", "/dl/b.exe"]).await;

        // Changed behind the list's back.
        store
            .write(Path::new("/dl/a.exe"), ZoneId::INTRANET, None)
            .await
            .unwrap();
        store.remove(Path::new("/dl/b.exe")).await.unwrap();

        let orchestrator = BatchOrchestrator::builder()
            .with_arc_store(store.clone())
            .build()
            .unwrap();
        let summary = orchestrator
            .run_batch(
                list.as_slice(),
                BatchOperation::Inspect,
                &CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap();
        assert_eq!(list.apply(&summary), 2);

        let a = list.get("/dl/a.exe").unwrap();
        assert_eq!(a.current_zone, Some(ZoneId::INTRANET));
        assert_eq!(a.next_zone, Some(ZoneId::LOCAL_MACHINE));
        let b = list.get("/dl/b.exe").unwrap();
        assert_eq!(b.current_zone, None);
        assert!(!b.needs_wash());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = MemoryZoneStore::new().with_file("/dl/a").with_file("/dl/b");
        let mut list = TargetList::with_comparison(PathComparison::Exact);
        list.add_paths(&store, ["/dl/a", "/dl/b"]).await;

        assert!(list.remove("/dl/a").is_some());
        assert!(list.remove("/dl/a").is_none());
        assert!(!list.contains("/dl/a"));
        assert_eq!(list.len(), 1);

        list.clear();
        assert!(list.is_empty());

        // Removed paths can be added again.
        let report = list.add_paths(&store, ["/dl/a"]).await;
        assert_eq!(report.added, vec![PathBuf::from("/dl/a")]);
    }
}
