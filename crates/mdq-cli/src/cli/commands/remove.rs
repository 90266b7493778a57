//! `mdq remove` – delete a queue, its items, and any resume marker.

use anyhow::{Context, Result};
use mdq_core::store::Store;

pub async fn run_remove(store: &Store, queue_id: i64) -> Result<()> {
    let queue = store
        .get_queue(queue_id)
        .await?
        .with_context(|| format!("queue {queue_id} not found"))?;
    store.delete_queue(queue_id).await?;
    println!("Removed queue {} '{}'", queue.id, queue.title);
    Ok(())
}
