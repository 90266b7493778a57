//! `mdq clear-resume` – drop the interrupted-run marker for a queue.

use anyhow::Result;
use mdq_core::store::Store;

pub async fn run_clear_resume(store: &Store, queue_id: i64) -> Result<()> {
    store.clear_interrupted(queue_id).await?;
    println!("Cleared resume marker for queue {queue_id}");
    Ok(())
}
