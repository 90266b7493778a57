//! The media-retrieval collaborator seam.
//!
//! The scheduler never downloads anything itself; it hands each item to a
//! `Fetcher` and persists whatever comes back. Failures are values, never
//! panics. Implementations are expected to block; the scheduler bridges
//! them with `spawn_blocking`.

use std::path::PathBuf;

use crate::control::SkipSignal;
use crate::store::Item;

/// Per-item fetch parameters, owned so the request can cross the
/// `spawn_blocking` boundary.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub title: String,
    pub output_dir: String,
    /// `video` or `audio`, opaque to the scheduler.
    pub format: String,
    pub quality: String,
    pub proxy: Option<String>,
}

impl FetchRequest {
    pub fn for_item(item: &Item, queue: &crate::store::Queue, proxy: Option<&str>) -> Self {
        Self {
            url: item.url.clone(),
            title: item.title.clone(),
            output_dir: queue.output_dir.clone(),
            format: queue.format.clone(),
            quality: queue.quality.clone(),
            proxy: proxy.map(str::to_string),
        }
    }
}

/// Successful fetch result. Metadata fields are optional updates; the
/// scheduler only fills item fields that are currently empty.
#[derive(Debug, Clone, Default)]
pub struct FetchedMedia {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub hash: Option<String>,
    pub uploader: Option<String>,
    /// `YYYYMMDD`.
    pub upload_date: Option<String>,
    pub source_id: Option<String>,
}

/// Why a fetch produced no media.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The operator asked to skip and the fetcher aborted. Non-terminal:
    /// the item goes back to `pending`.
    #[error("skipped by operator")]
    Skipped,
    /// Anything else; recorded on the item as `failed`.
    #[error("{0}")]
    Failed(String),
}

/// External media-retrieval tool. One blocking call per item; safe to call
/// repeatedly from the same thread. The `skip` signal is best-effort: a
/// fetcher with no abort hook may ignore it.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, request: &FetchRequest, skip: &SkipSignal) -> Result<FetchedMedia, FetchError>;
}
