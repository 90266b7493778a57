//! Resume markers: per-queue record of an interrupted run.

use anyhow::Result;
use sqlx::Row;

use super::db::{unix_timestamp, Store};
use super::types::{QueueId, ResumeMarker};

impl Store {
    /// Write (or overwrite) the resume marker for a queue. Called by the
    /// scheduler on the cancellation path only.
    pub async fn mark_interrupted(
        &self,
        queue_id: QueueId,
        pending_count: i64,
        title: &str,
    ) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            INSERT INTO resume_markers (queue_id, title, pending_count, interrupted_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (queue_id) DO UPDATE
            SET title = excluded.title,
                pending_count = excluded.pending_count,
                interrupted_at = excluded.interrupted_at
            "#,
        )
        .bind(queue_id)
        .bind(title)
        .bind(pending_count)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete the resume marker for a queue if present; a no-op if absent.
    pub async fn clear_interrupted(&self, queue_id: QueueId) -> Result<()> {
        sqlx::query(r#"DELETE FROM resume_markers WHERE queue_id = ?1"#)
            .bind(queue_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All resume markers, most recently interrupted first. Safe to call at
    /// any time, including while a run is in flight.
    pub async fn list_interrupted(&self) -> Result<Vec<ResumeMarker>> {
        let rows = sqlx::query(
            r#"
            SELECT queue_id, title, pending_count, interrupted_at
            FROM resume_markers
            ORDER BY interrupted_at DESC, queue_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(ResumeMarker {
                queue_id: row.get("queue_id"),
                title: row.get("title"),
                pending_count: row.get("pending_count"),
                interrupted_at: row.get("interrupted_at"),
            });
        }
        Ok(out)
    }
}
