//! `mdq add` – create a queue from a JSON item manifest.

use anyhow::{ensure, Context, Result};
use mdq_core::store::{DownloadOrder, NewItem, NewQueue, Store};
use serde::Deserialize;
use std::fs;

/// One entry of the manifest produced by an external queue builder.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    url: String,
    title: String,
    #[serde(default)]
    uploader: Option<String>,
    /// `YYYYMMDD`; drives date-based ordering when present.
    #[serde(default)]
    upload_date: Option<String>,
    #[serde(default)]
    source_id: Option<String>,
}

#[allow(clippy::too_many_arguments)]
pub async fn run_add(
    store: &Store,
    url: &str,
    title: &str,
    format: &str,
    quality: &str,
    order: &str,
    output_dir: Option<String>,
    manifest: &str,
) -> Result<()> {
    let data =
        fs::read_to_string(manifest).with_context(|| format!("read manifest {manifest}"))?;
    let entries: Vec<ManifestEntry> =
        serde_json::from_str(&data).with_context(|| format!("parse manifest {manifest}"))?;
    ensure!(!entries.is_empty(), "manifest {manifest} has no items");

    let output_dir = match output_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?.display().to_string(),
    };

    let queue_id = store
        .create_queue(&NewQueue {
            source_url: url.to_string(),
            title: title.to_string(),
            format: format.to_string(),
            quality: quality.to_string(),
            output_dir,
            order: DownloadOrder::from_str(order),
        })
        .await?;

    let count = entries.len();
    for entry in entries {
        store
            .add_item(
                queue_id,
                &NewItem {
                    url: entry.url,
                    title: entry.title,
                    uploader: entry.uploader,
                    upload_date: entry.upload_date,
                    source_id: entry.source_id,
                },
            )
            .await?;
    }

    println!("Added queue {queue_id} '{title}' with {count} item(s)");
    Ok(())
}
