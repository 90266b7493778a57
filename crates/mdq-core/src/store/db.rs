//! SQLite-backed store implementation.
//!
//! Handles connection, migrations, and timestamp helpers. Queue, item,
//! and resume-marker operations live in `queues`, `items`, `markers`.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the SQLite-backed queue database.
///
/// The database file is stored under the XDG state directory:
/// `~/.local/state/mdq/queues.db`.
#[derive(Clone)]
pub struct Store {
    pub(crate) pool: Pool<Sqlite>,
}

impl Store {
    /// Open (or create) the default queue database and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("mdq")?;
        let state_dir = xdg_dirs.get_state_home().join("mdq");
        let db_path = state_dir.join("queues.db");

        // Ensure parent directory exists.
        tokio::fs::create_dir_all(&state_dir).await?;

        let uri = path_to_sqlite_uri(&db_path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;

        let store = Store { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    /// Intended for tests so the DB can be placed in a temp directory.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;
        let store = Store { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        // Enum columns are stored as strings (see types.rs codecs), timestamps
        // as Unix seconds. resume_markers is keyed by queue_id: one marker per
        // queue, overwritten on each interruption.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS queues (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_url TEXT NOT NULL,
                title TEXT NOT NULL,
                format TEXT NOT NULL,
                quality TEXT NOT NULL,
                output_dir TEXT NOT NULL,
                download_order TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                completed_at INTEGER
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                queue_id INTEGER NOT NULL,
                url TEXT NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL,
                file_path TEXT,
                file_size INTEGER,
                file_hash TEXT,
                error TEXT,
                uploader TEXT,
                upload_date TEXT,
                source_id TEXT,
                started_at INTEGER,
                finished_at INTEGER,
                duration_secs REAL,
                FOREIGN KEY (queue_id) REFERENCES queues (id)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resume_markers (
                queue_id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                pending_count INTEGER NOT NULL,
                interrupted_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Current time as Unix seconds (for DB timestamps).
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<Store> {
    // Single connection to avoid the in-memory pool handing back a different empty DB.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let store = Store { pool };
    store.migrate().await?;
    Ok(store)
}
