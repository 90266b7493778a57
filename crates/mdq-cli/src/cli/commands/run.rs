//! `mdq run` – process a queue's pending items.

use anyhow::{Context, Result};
use mdq_core::config::MdqConfig;
use mdq_core::control::ControlFlags;
use mdq_core::fetcher::Fetcher;
use mdq_core::proxy::ProxyRotator;
use mdq_core::scheduler::{run_queue, ItemOutcome, NoopNotifier, RunEvent, RunOptions};
use mdq_core::store::Store;
use mdq_core::throttle::Throttle;
use std::sync::Arc;
use std::time::Duration;

use crate::fetcher::CommandFetcher;

pub async fn run_scheduler(
    store: &Store,
    cfg: &MdqConfig,
    queue_id: i64,
    force_redownload: bool,
    no_retry_failed: bool,
) -> Result<()> {
    let template = cfg
        .fetch_command
        .clone()
        .context("no fetch_command configured; set it in config.toml")?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(CommandFetcher::new(template));

    let mut throttle = Throttle::from_config(&cfg.throttle);
    let proxies = ProxyRotator::from_config(&cfg.proxy);
    let flags = ControlFlags::new();
    let opts = RunOptions {
        force_redownload,
        retry_failed: cfg.retry_failed && !no_retry_failed,
        pause_poll: Duration::from_millis(cfg.pause_poll_ms),
        attach_key_listener: true,
    };

    println!("keys: [p]ause  [r]esume  [s]kip  [c]ancel");

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<RunEvent>(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            match event {
                RunEvent::ItemStarted {
                    position,
                    total,
                    title,
                    ..
                } => println!("[{position}/{total}] {title}"),
                RunEvent::ItemFinished {
                    outcome,
                    duration_secs,
                    error,
                    ..
                } => match outcome {
                    ItemOutcome::Completed => println!("  done in {duration_secs:.1}s"),
                    ItemOutcome::Failed => {
                        println!("  failed: {}", error.unwrap_or_default())
                    }
                    ItemOutcome::Skipped => println!("  skipped"),
                },
                RunEvent::Paused => println!("-- paused --"),
                RunEvent::Resumed => println!("-- resumed --"),
                RunEvent::Cancelled { remaining } => {
                    println!("-- cancelled, {remaining} item(s) not attempted --")
                }
            }
        }
    });

    let outcome = run_queue(
        store,
        queue_id,
        fetcher,
        &mut throttle,
        &proxies,
        &flags,
        &NoopNotifier,
        Some(&progress_tx),
        &opts,
    )
    .await?;
    drop(progress_tx);
    let _ = printer.await;

    let s = outcome.summary;
    println!(
        "{} completed, {} failed, {} pending of {} in {:.0}s",
        s.completed,
        s.failed,
        s.pending,
        s.total,
        s.elapsed.as_secs_f64()
    );
    if outcome.cancelled {
        println!("Run cancelled; `mdq run {queue_id}` picks up where it left off.");
    }
    Ok(())
}
