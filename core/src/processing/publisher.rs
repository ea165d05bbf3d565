use std::sync::Arc;
use tokio::sync::watch;

use crate::sonar_interface::detection::{DetectionRecord, DetectionTable};
use crate::telemetry::log::LogManager;

/// Single-producer hand-off point for committed detection snapshots.
///
/// A file's records are committed in full or not at all; readers hold an
/// immutable snapshot for the duration of one analysis pass and observe
/// a new table reference only after a commit completes.
pub struct TablePublisher {
    tx: watch::Sender<Arc<DetectionTable>>,
    // keeps the channel open so commits never fail for lack of readers
    _rx: watch::Receiver<Arc<DetectionTable>>,
    logger: LogManager,
}

impl TablePublisher {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(Arc::new(DetectionTable::new()));
        Self {
            tx,
            _rx: rx,
            logger: LogManager::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DetectionTable>> {
        self.tx.subscribe()
    }

    /// Current table snapshot.
    pub fn snapshot(&self) -> Arc<DetectionTable> {
        self.tx.borrow().clone()
    }

    /// Commits one fully extracted file; the merged table is re-sorted
    /// by timestamp before publication.
    pub fn commit_file(&self, records: Vec<DetectionRecord>) -> Arc<DetectionTable> {
        let committed = records.len();
        let mut merged = DetectionTable::clone(&self.snapshot());
        merged.extend(records);
        merged.sort_by_time();
        let merged = Arc::new(merged);
        let _ = self.tx.send(merged.clone());
        self.logger.record(&format!(
            "committed {} pings, table now {}",
            committed,
            merged.len()
        ));
        merged
    }

    /// Publishes an empty table, used when all source files are removed.
    pub fn reset(&self) {
        let _ = self.tx.send(Arc::new(DetectionTable::new()));
        self.logger.record("detection table reset");
    }
}

impl Default for TablePublisher {
    fn default() -> Self {
        Self::new()
    }
}
