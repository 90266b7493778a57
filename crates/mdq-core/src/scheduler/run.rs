//! Run one queue: recover stale state, walk the working set in order, and
//! persist every transition.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::control::{ControlFlags, KeyListener, ListenerHandle};
use crate::fetcher::{FetchError, FetchRequest, Fetcher};
use crate::proxy::ProxyRotator;
use crate::store::db::unix_timestamp;
use crate::store::{Item, ItemStatus, Queue, QueueId, QueueStatus, Store};
use crate::throttle::Throttle;

use super::order::sort_items;
use super::progress::{ItemOutcome, Notifier, RunEvent, RunSummary};

/// Note recorded on an item when the operator skips it mid-fetch.
const SKIP_NOTE: &str = "skipped by operator";

/// Per-run options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Reset every item to `pending` first and fetch the whole queue again.
    pub force_redownload: bool,
    /// Include previously failed items in the working set.
    pub retry_failed: bool,
    /// Poll interval while paused.
    pub pause_poll: Duration,
    /// Attach the terminal key listener for the duration of the run.
    /// Headless callers and tests drive `ControlFlags` directly instead.
    pub attach_key_listener: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            force_redownload: false,
            retry_failed: true,
            pause_poll: Duration::from_millis(200),
            attach_key_listener: false,
        }
    }
}

/// How the run ended.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub cancelled: bool,
    pub summary: RunSummary,
}

/// Stops the key listener and clears control flags on every exit path,
/// including error propagation out of the loop.
struct ControlGuard {
    flags: ControlFlags,
    listener: Option<ListenerHandle>,
}

impl ControlGuard {
    fn new(flags: ControlFlags, attach_listener: bool) -> Self {
        flags.reset();
        let listener = attach_listener.then(|| KeyListener::spawn(flags.clone()));
        Self { flags, listener }
    }
}

impl Drop for ControlGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.stop();
        }
        self.flags.reset();
    }
}

/// Process a queue's pending items in order.
///
/// Recovers items stranded in `downloading` by a dead process, applies the
/// queue's ordering policy, and for each item: honors cancel/pause, picks a
/// proxy, waits for the throttle, fetches, and persists the outcome. A
/// fetch failure never aborts the run; only an operator cancel (which
/// writes a resume marker) or an unexpected error stops it early. On a
/// clean sweep the queue is marked completed and any marker is cleared.
#[allow(clippy::too_many_arguments)]
pub async fn run_queue(
    store: &Store,
    queue_id: QueueId,
    fetcher: Arc<dyn Fetcher>,
    throttle: &mut Throttle,
    proxies: &ProxyRotator,
    flags: &ControlFlags,
    notifier: &dyn Notifier,
    events: Option<&tokio::sync::mpsc::Sender<RunEvent>>,
    opts: &RunOptions,
) -> Result<RunOutcome> {
    let mut queue = store
        .get_queue(queue_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("queue {} not found", queue_id))?;

    let stale = store.reset_stale_downloading(queue_id).await?;
    if stale > 0 {
        tracing::info!(queue_id, stale, "reset items stranded in downloading state");
    }

    if opts.force_redownload {
        let reset = store.reset_all_items(queue_id).await?;
        tracing::info!(queue_id, reset, "force redownload: reset all items to pending");
    }

    let mut items = store
        .load_pending_items(queue_id, opts.retry_failed)
        .await?;
    sort_items(&mut items, queue.order);

    let run_start = Instant::now();
    if items.is_empty() {
        tracing::info!(queue_id, "nothing to do: no pending items");
        let counts = store.queue_counts(queue_id).await?;
        return Ok(RunOutcome {
            cancelled: false,
            summary: RunSummary::from_counts(counts, run_start.elapsed()),
        });
    }

    tracing::info!(
        queue_id,
        title = %queue.title,
        items = items.len(),
        order = queue.order.as_str(),
        "starting run"
    );

    let guard = ControlGuard::new(flags.clone(), opts.attach_key_listener);

    let total = items.len();
    let mut cancelled = false;
    let mut dispatch_count: u64 = 0;

    for (idx, item) in items.into_iter().enumerate() {
        if guard.flags.is_paused() && !guard.flags.is_cancelled() {
            tracing::info!("paused, waiting for resume");
            emit(events, RunEvent::Paused);
            while guard.flags.is_paused() && !guard.flags.is_cancelled() {
                tokio::time::sleep(opts.pause_poll).await;
            }
            if !guard.flags.is_cancelled() {
                tracing::info!("resumed");
                emit(events, RunEvent::Resumed);
            }
        }

        if guard.flags.is_cancelled() {
            let remaining = total - idx;
            tracing::info!(queue_id, remaining, "cancelled by operator");
            store
                .mark_interrupted(queue_id, remaining as i64, &queue.title)
                .await?;
            emit(events, RunEvent::Cancelled { remaining });
            cancelled = true;
            break;
        }

        let proxy = proxies.next(dispatch_count).map(str::to_string);
        throttle.acquire().await;

        run_one_item(
            store, &queue, item, &fetcher, proxy, &guard.flags, notifier, events, idx + 1, total,
        )
        .await?;

        // The counter drives proxy rotation and throttle bookkeeping, so it
        // advances on every outcome, including failures and skips.
        dispatch_count += 1;
    }

    if !cancelled {
        queue.status = QueueStatus::Completed;
        queue.completed_at = Some(unix_timestamp());
        if let Err(e) = store.save_queue(&queue).await {
            tracing::warn!(queue_id, "failed to persist queue completion: {e:#}");
        }
        if let Err(e) = store.clear_interrupted(queue_id).await {
            tracing::warn!(queue_id, "failed to clear resume marker: {e:#}");
        }
        let counts = store.queue_counts(queue_id).await?;
        notifier.on_queue_completed(&queue, counts.completed, counts.total());
        tracing::info!(
            queue_id,
            completed = counts.completed,
            failed = counts.failed,
            "queue completed"
        );
    }

    drop(guard);

    let counts = store.queue_counts(queue_id).await?;
    Ok(RunOutcome {
        cancelled,
        summary: RunSummary::from_counts(counts, run_start.elapsed()),
    })
}

/// Dispatch one item: mark downloading, fetch, and persist the outcome.
/// Errors from the fetcher or the store are recorded, never propagated.
#[allow(clippy::too_many_arguments)]
async fn run_one_item(
    store: &Store,
    queue: &Queue,
    mut item: Item,
    fetcher: &Arc<dyn Fetcher>,
    proxy: Option<String>,
    flags: &ControlFlags,
    notifier: &dyn Notifier,
    events: Option<&tokio::sync::mpsc::Sender<RunEvent>>,
    position: usize,
    total: usize,
) -> Result<()> {
    item.status = ItemStatus::Downloading;
    item.started_at = Some(unix_timestamp());
    item.error = None;
    if let Err(e) = store.save_item(&item).await {
        tracing::warn!(item_id = item.id, "failed to persist downloading state: {e:#}");
    }
    emit(
        events,
        RunEvent::ItemStarted {
            item_id: item.id,
            title: item.title.clone(),
            position,
            total,
        },
    );

    // A skip request left over from before this fetch started is stale.
    flags.take_skip();

    let request = FetchRequest::for_item(&item, queue, proxy.as_deref());
    let skip = flags.skip_signal();
    let fetcher = Arc::clone(fetcher);
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || fetcher.fetch(&request, &skip))
        .await
        .context("fetch task join")?;
    let duration = started.elapsed().as_secs_f64();
    let skipped_during_fetch = flags.take_skip();

    let outcome = match result {
        Ok(media) => {
            item.status = ItemStatus::Completed;
            item.file_path = Some(media.path.to_string_lossy().into_owned());
            item.file_size = Some(media.size_bytes as i64);
            if media.hash.is_some() {
                item.file_hash = media.hash;
            }
            if item.uploader.is_none() {
                item.uploader = media.uploader;
            }
            if item.upload_date.is_none() {
                item.upload_date = media.upload_date;
            }
            if item.source_id.is_none() {
                item.source_id = media.source_id;
            }
            item.finished_at = Some(unix_timestamp());
            item.duration_secs = Some(duration);
            ItemOutcome::Completed
        }
        Err(err) => {
            // A failure while the operator had asked to skip counts as the
            // skip, not as a failure; the fetcher may have no abort hook.
            let skipped = matches!(err, FetchError::Skipped) || skipped_during_fetch;
            if skipped {
                item.status = ItemStatus::Pending;
                item.error = Some(SKIP_NOTE.to_string());
                item.started_at = None;
                item.finished_at = None;
                item.duration_secs = None;
                ItemOutcome::Skipped
            } else {
                item.status = ItemStatus::Failed;
                item.error = Some(err.to_string());
                item.finished_at = Some(unix_timestamp());
                item.duration_secs = Some(duration);
                ItemOutcome::Failed
            }
        }
    };

    if let Err(e) = store.save_item(&item).await {
        tracing::warn!(item_id = item.id, "failed to persist item outcome: {e:#}");
    }

    match outcome {
        ItemOutcome::Completed => {
            tracing::info!(item_id = item.id, title = %item.title, duration, "item completed");
            notifier.on_item_succeeded(&item, duration);
        }
        ItemOutcome::Failed => {
            let error = item.error.clone().unwrap_or_default();
            tracing::warn!(item_id = item.id, title = %item.title, %error, "item failed");
            notifier.on_item_failed(&item, &error);
        }
        ItemOutcome::Skipped => {
            tracing::info!(item_id = item.id, title = %item.title, "item skipped");
        }
    }

    emit(
        events,
        RunEvent::ItemFinished {
            item_id: item.id,
            title: item.title.clone(),
            outcome,
            duration_secs: duration,
            error: item.error.clone(),
        },
    );

    Ok(())
}

fn emit(events: Option<&tokio::sync::mpsc::Sender<RunEvent>>, event: RunEvent) {
    if let Some(tx) = events {
        let _ = tx.try_send(event);
    }
}
