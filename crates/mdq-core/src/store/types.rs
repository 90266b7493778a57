//! Types used by the queue/item database.

use serde::{Deserialize, Serialize};

/// Queue identifier.
pub type QueueId = i64;

/// Item identifier.
pub type ItemId = i64;

/// Lifecycle state of a download item, stored as a string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Downloading,
    Completed,
    Failed,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Downloading => "downloading",
            ItemStatus::Completed => "completed",
            ItemStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => ItemStatus::Pending,
            "downloading" => ItemStatus::Downloading,
            "completed" => ItemStatus::Completed,
            "failed" => ItemStatus::Failed,
            _ => ItemStatus::Failed,
        }
    }
}

/// Lifecycle state of a queue. Transitions only `pending -> completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Pending,
    Completed,
}

impl QueueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "completed" => QueueStatus::Completed,
            _ => QueueStatus::Pending,
        }
    }
}

/// Order in which a queue's pending items are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadOrder {
    /// Store's natural order (insertion / playlist order).
    #[default]
    Insertion,
    /// Descending by upload date; items without a date sort last.
    NewestFirst,
    /// Ascending by upload date; items without a date sort first.
    OldestFirst,
}

impl DownloadOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadOrder::Insertion => "insertion",
            DownloadOrder::NewestFirst => "newest_first",
            DownloadOrder::OldestFirst => "oldest_first",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "newest_first" => DownloadOrder::NewestFirst,
            "oldest_first" => DownloadOrder::OldestFirst,
            _ => DownloadOrder::Insertion,
        }
    }
}

/// One playlist-level unit of work. Created by the queue builder; the
/// scheduler only ever touches `status` and `completed_at`.
#[derive(Debug, Clone)]
pub struct Queue {
    pub id: QueueId,
    pub source_url: String,
    pub title: String,
    /// `video` or `audio`; opaque to the scheduler, passed to the fetcher.
    pub format: String,
    pub quality: String,
    pub output_dir: String,
    pub order: DownloadOrder,
    pub status: QueueStatus,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

/// Fields for a new queue row; id and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewQueue {
    pub source_url: String,
    pub title: String,
    pub format: String,
    pub quality: String,
    pub output_dir: String,
    pub order: DownloadOrder,
}

/// One retrievable media unit within a queue.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: ItemId,
    pub queue_id: QueueId,
    pub url: String,
    pub title: String,
    pub status: ItemStatus,
    pub file_path: Option<String>,
    pub file_size: Option<i64>,
    pub file_hash: Option<String>,
    pub error: Option<String>,
    pub uploader: Option<String>,
    /// Upload date as `YYYYMMDD`; drives `newest_first`/`oldest_first` ordering.
    pub upload_date: Option<String>,
    /// Stable id at the media source (e.g. video id).
    pub source_id: Option<String>,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub duration_secs: Option<f64>,
}

/// Fields for a new item row, as produced by the queue builder.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub url: String,
    pub title: String,
    pub uploader: Option<String>,
    pub upload_date: Option<String>,
    pub source_id: Option<String>,
}

/// Per-queue record of an interrupted run. Exists iff the last run ended
/// abnormally with pending work remaining.
#[derive(Debug, Clone)]
pub struct ResumeMarker {
    pub queue_id: QueueId,
    pub title: String,
    pub pending_count: i64,
    pub interrupted_at: i64,
}

/// Per-status item counts for one queue; source of the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounts {
    pub pending: i64,
    pub downloading: i64,
    pub completed: i64,
    pub failed: i64,
}

impl QueueCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.downloading + self.completed + self.failed
    }
}

#[cfg(test)]
mod status_tests {
    use super::*;

    #[test]
    fn item_status_string_codec() {
        for s in [
            ItemStatus::Pending,
            ItemStatus::Downloading,
            ItemStatus::Completed,
            ItemStatus::Failed,
        ] {
            assert_eq!(ItemStatus::from_str(s.as_str()), s);
        }
        assert_eq!(ItemStatus::from_str("garbage"), ItemStatus::Failed);
    }

    #[test]
    fn order_string_codec() {
        for o in [
            DownloadOrder::Insertion,
            DownloadOrder::NewestFirst,
            DownloadOrder::OldestFirst,
        ] {
            assert_eq!(DownloadOrder::from_str(o.as_str()), o);
        }
        assert_eq!(DownloadOrder::from_str("unknown"), DownloadOrder::Insertion);
    }
}
