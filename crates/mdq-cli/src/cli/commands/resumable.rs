//! `mdq resumable` – list queues with an interrupted-run marker.

use anyhow::Result;
use mdq_core::store::Store;

pub async fn run_resumable(store: &Store) -> Result<()> {
    let markers = store.list_interrupted().await?;
    if markers.is_empty() {
        println!("No interrupted runs.");
        return Ok(());
    }

    for m in markers {
        println!(
            "queue {:<6} {:>4} pending  '{}'  (run `mdq run {}`)",
            m.queue_id, m.pending_count, m.title, m.queue_id
        );
    }
    Ok(())
}
