//! `mdq status` – show all queues with per-status item counts.

use anyhow::Result;
use mdq_core::store::Store;

pub async fn run_status(store: &Store) -> Result<()> {
    let queues = store.list_queues().await?;
    if queues.is_empty() {
        println!("No queues in database.");
        return Ok(());
    }

    println!(
        "{:<6} {:<10} {:>5} {:>5} {:>5} {}",
        "ID", "STATUS", "DONE", "FAIL", "PEND", "TITLE"
    );
    for q in queues {
        let counts = store.queue_counts(q.id).await?;
        println!(
            "{:<6} {:<10} {:>5} {:>5} {:>5} {}",
            q.id,
            q.status.as_str(),
            counts.completed,
            counts.failed,
            counts.pending + counts.downloading,
            q.title
        );
    }
    Ok(())
}
