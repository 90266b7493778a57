//! Queue operations: create, read, save, remove.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::db::{unix_timestamp, Store};
use super::types::{DownloadOrder, NewQueue, Queue, QueueId, QueueStatus};

fn queue_from_row(row: &SqliteRow) -> Queue {
    let order: String = row.get("download_order");
    let status: String = row.get("status");
    Queue {
        id: row.get("id"),
        source_url: row.get("source_url"),
        title: row.get("title"),
        format: row.get("format"),
        quality: row.get("quality"),
        output_dir: row.get("output_dir"),
        order: DownloadOrder::from_str(&order),
        status: QueueStatus::from_str(&status),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    }
}

impl Store {
    /// Insert a new queue in `pending` state. Items are added separately by
    /// the queue builder via `add_item`.
    pub async fn create_queue(&self, new: &NewQueue) -> Result<QueueId> {
        let now = unix_timestamp();
        let id = sqlx::query(
            r#"
            INSERT INTO queues (
                source_url, title, format, quality, output_dir,
                download_order, status, created_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)
            "#,
        )
        .bind(&new.source_url)
        .bind(&new.title)
        .bind(&new.format)
        .bind(&new.quality)
        .bind(&new.output_dir)
        .bind(new.order.as_str())
        .bind(QueueStatus::Pending.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Fetch a single queue row.
    pub async fn get_queue(&self, id: QueueId) -> Result<Option<Queue>> {
        let row = sqlx::query(r#"SELECT * FROM queues WHERE id = ?1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(queue_from_row))
    }

    /// List all queues, newest first.
    pub async fn list_queues(&self) -> Result<Vec<Queue>> {
        let rows = sqlx::query(r#"SELECT * FROM queues ORDER BY created_at DESC, id DESC"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(queue_from_row).collect())
    }

    /// Upsert a queue's mutable fields (status and completion timestamp).
    pub async fn save_queue(&self, queue: &Queue) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE queues
            SET title = ?1,
                status = ?2,
                completed_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(&queue.title)
        .bind(queue.status.as_str())
        .bind(queue.completed_at)
        .bind(queue.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Permanently remove a queue, its items, and any resume marker.
    /// Operator action only; the scheduler never deletes.
    pub async fn delete_queue(&self, id: QueueId) -> Result<()> {
        sqlx::query(r#"DELETE FROM items WHERE queue_id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query(r#"DELETE FROM resume_markers WHERE queue_id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query(r#"DELETE FROM queues WHERE id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
