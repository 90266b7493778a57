//! Progress events, notification hooks, and the end-of-run summary.

use std::time::Duration;

use crate::store::{Item, ItemId, Queue, QueueCounts};

/// How one dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Completed,
    Failed,
    /// Operator skip: the item went back to `pending`.
    Skipped,
}

/// Events emitted while a run is in flight, consumable by a terminal UI,
/// log writer, or test harness. Delivery uses `try_send` so a slow
/// consumer can drop events but never stalls the loop.
#[derive(Debug, Clone)]
pub enum RunEvent {
    ItemStarted {
        item_id: ItemId,
        title: String,
        /// 1-based position within this run's working set.
        position: usize,
        total: usize,
    },
    ItemFinished {
        item_id: ItemId,
        title: String,
        outcome: ItemOutcome,
        duration_secs: f64,
        error: Option<String>,
    },
    Paused,
    Resumed,
    Cancelled {
        /// Items never attempted in this run.
        remaining: usize,
    },
}

/// Notification hooks invoked by the scheduler. All default to no-ops;
/// implementations must bound their own I/O (a slow webhook is the hook's
/// problem, not the loop's).
pub trait Notifier: Send + Sync {
    fn on_item_succeeded(&self, _item: &Item, _duration_secs: f64) {}
    fn on_item_failed(&self, _item: &Item, _error: &str) {}
    fn on_queue_completed(&self, _queue: &Queue, _succeeded: i64, _total: i64) {}
}

/// The do-nothing notifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {}

/// End-of-run summary, assembled from the store after the loop exits.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub completed: i64,
    pub failed: i64,
    pub pending: i64,
    pub total: i64,
    pub elapsed: Duration,
}

impl RunSummary {
    pub(crate) fn from_counts(counts: QueueCounts, elapsed: Duration) -> Self {
        Self {
            completed: counts.completed,
            failed: counts.failed,
            pending: counts.pending + counts.downloading,
            total: counts.total(),
            elapsed,
        }
    }
}
