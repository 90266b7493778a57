//! `mdq items` – list a queue's items.

use anyhow::{Context, Result};
use mdq_core::store::Store;

pub async fn run_items(store: &Store, queue_id: i64) -> Result<()> {
    let queue = store
        .get_queue(queue_id)
        .await?
        .with_context(|| format!("queue {queue_id} not found"))?;

    let items = store.list_items(queue_id).await?;
    println!("Queue {} '{}': {} item(s)", queue.id, queue.title, items.len());
    if items.is_empty() {
        return Ok(());
    }

    println!("{:<6} {:<12} {:>12} {}", "ID", "STATUS", "SIZE", "TITLE");
    for item in items {
        let size = item
            .file_size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<12} {:>12} {}",
            item.id,
            item.status.as_str(),
            size,
            item.title
        );
        if let Some(error) = &item.error {
            println!("       {error}");
        }
    }
    Ok(())
}
