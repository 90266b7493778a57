//! Item operations: insert, working-set load, state transitions, counts.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::db::Store;
use super::types::{Item, ItemId, ItemStatus, NewItem, QueueCounts, QueueId};

fn item_from_row(row: &SqliteRow) -> Item {
    let status: String = row.get("status");
    Item {
        id: row.get("id"),
        queue_id: row.get("queue_id"),
        url: row.get("url"),
        title: row.get("title"),
        status: ItemStatus::from_str(&status),
        file_path: row.get("file_path"),
        file_size: row.get("file_size"),
        file_hash: row.get("file_hash"),
        error: row.get("error"),
        uploader: row.get("uploader"),
        upload_date: row.get("upload_date"),
        source_id: row.get("source_id"),
        started_at: row.get("started_at"),
        finished_at: row.get("finished_at"),
        duration_secs: row.get("duration_secs"),
    }
}

impl Store {
    /// Insert a new item in `pending` state. Used by the queue builder only.
    pub async fn add_item(&self, queue_id: QueueId, new: &NewItem) -> Result<ItemId> {
        let id = sqlx::query(
            r#"
            INSERT INTO items (
                queue_id, url, title, status, uploader, upload_date, source_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(queue_id)
        .bind(&new.url)
        .bind(&new.title)
        .bind(ItemStatus::Pending.as_str())
        .bind(&new.uploader)
        .bind(&new.upload_date)
        .bind(&new.source_id)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// All items for a queue in insertion order.
    pub async fn list_items(&self, queue_id: QueueId) -> Result<Vec<Item>> {
        let rows = sqlx::query(r#"SELECT * FROM items WHERE queue_id = ?1 ORDER BY id"#)
            .bind(queue_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(item_from_row).collect())
    }

    /// The working set for a run: `pending` items, plus `failed` ones when
    /// `include_failed` is set (retry-by-rerun). Insertion order; the
    /// scheduler applies the queue's ordering policy on top.
    pub async fn load_pending_items(
        &self,
        queue_id: QueueId,
        include_failed: bool,
    ) -> Result<Vec<Item>> {
        let sql = if include_failed {
            r#"
            SELECT * FROM items
            WHERE queue_id = ?1 AND status IN ('pending', 'failed')
            ORDER BY id
            "#
        } else {
            r#"
            SELECT * FROM items
            WHERE queue_id = ?1 AND status = 'pending'
            ORDER BY id
            "#
        };
        let rows = sqlx::query(sql).bind(queue_id).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(item_from_row).collect())
    }

    /// Idempotent upsert of an item's mutable fields.
    pub async fn save_item(&self, item: &Item) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE items
            SET status = ?1,
                file_path = ?2,
                file_size = ?3,
                file_hash = ?4,
                error = ?5,
                uploader = ?6,
                upload_date = ?7,
                source_id = ?8,
                started_at = ?9,
                finished_at = ?10,
                duration_secs = ?11
            WHERE id = ?12
            "#,
        )
        .bind(item.status.as_str())
        .bind(&item.file_path)
        .bind(item.file_size)
        .bind(&item.file_hash)
        .bind(&item.error)
        .bind(&item.uploader)
        .bind(&item.upload_date)
        .bind(&item.source_id)
        .bind(item.started_at)
        .bind(item.finished_at)
        .bind(item.duration_secs)
        .bind(item.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Normalize any item left in `downloading` back to `pending` (the
    /// process that set it died). Call before scheduling.
    /// Returns the number of items reset.
    pub async fn reset_stale_downloading(&self, queue_id: QueueId) -> Result<u64> {
        let r = sqlx::query(
            r#"
            UPDATE items
            SET status = 'pending'
            WHERE queue_id = ?1 AND status = 'downloading'
            "#,
        )
        .bind(queue_id)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected())
    }

    /// Reset every item of a queue to `pending` for a forced full redownload.
    /// Prior outcomes (path, hash, error, timing) are cleared.
    pub async fn reset_all_items(&self, queue_id: QueueId) -> Result<u64> {
        let r = sqlx::query(
            r#"
            UPDATE items
            SET status = 'pending',
                file_path = NULL,
                file_size = NULL,
                file_hash = NULL,
                error = NULL,
                started_at = NULL,
                finished_at = NULL,
                duration_secs = NULL
            WHERE queue_id = ?1
            "#,
        )
        .bind(queue_id)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected())
    }

    /// Per-status item counts for one queue.
    pub async fn queue_counts(&self, queue_id: QueueId) -> Result<QueueCounts> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS n
            FROM items
            WHERE queue_id = ?1
            GROUP BY status
            "#,
        )
        .bind(queue_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = QueueCounts::default();
        for row in rows {
            let status: String = row.get("status");
            let n: i64 = row.get("n");
            match ItemStatus::from_str(&status) {
                ItemStatus::Pending => counts.pending = n,
                ItemStatus::Downloading => counts.downloading = n,
                ItemStatus::Completed => counts.completed = n,
                ItemStatus::Failed => counts.failed = n,
            }
        }
        Ok(counts)
    }
}
