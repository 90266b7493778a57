//! CLI for the mdq media download queue.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mdq_core::config;
use mdq_core::store::Store;

use commands::{
    run_add, run_clear_resume, run_completions, run_items, run_remove, run_resumable,
    run_scheduler, run_status,
};

/// Top-level CLI for the mdq media download queue.
#[derive(Debug, Parser)]
#[command(name = "mdq")]
#[command(about = "mdq: personal media download queue manager", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Create a download queue from a JSON item manifest.
    Add {
        /// Source playlist/channel URL the manifest was built from.
        #[arg(long)]
        url: String,

        /// Queue title.
        #[arg(long)]
        title: String,

        /// Target format: `video` or `audio`. Passed through to the fetch command.
        #[arg(long, default_value = "video")]
        format: String,

        /// Quality selector, opaque to mdq. Passed through to the fetch command.
        #[arg(long, default_value = "best")]
        quality: String,

        /// Processing order: `insertion`, `newest_first` or `oldest_first`.
        #[arg(long, default_value = "insertion")]
        order: String,

        /// Directory downloads are written to. Defaults to the current directory.
        #[arg(long)]
        output_dir: Option<String>,

        /// Path to the JSON manifest listing the queue's items.
        #[arg(long)]
        manifest: String,
    },

    /// Process a queue's pending items.
    Run {
        /// Queue identifier.
        queue_id: i64,

        /// Reset all items to pending and download the whole queue again.
        #[arg(long)]
        force_redownload: bool,

        /// Leave previously failed items out of this run.
        #[arg(long)]
        no_retry_failed: bool,
    },

    /// Show all queues with per-status item counts.
    Status,

    /// List a queue's items.
    Items {
        /// Queue identifier.
        queue_id: i64,
    },

    /// List queues whose last run was interrupted with work remaining.
    Resumable,

    /// Clear the interrupted-run marker for a queue.
    ClearResume {
        /// Queue identifier.
        queue_id: i64,
    },

    /// Remove a queue, its items, and any resume marker.
    Remove {
        /// Queue identifier.
        queue_id: i64,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Completions need no config or database.
        if let CliCommand::Completions { shell } = &cli.command {
            run_completions(*shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let store = Store::open_default().await?;

        match cli.command {
            CliCommand::Add {
                url,
                title,
                format,
                quality,
                order,
                output_dir,
                manifest,
            } => {
                run_add(
                    &store, &url, &title, &format, &quality, &order, output_dir, &manifest,
                )
                .await?;
            }
            CliCommand::Run {
                queue_id,
                force_redownload,
                no_retry_failed,
            } => {
                run_scheduler(&store, &cfg, queue_id, force_redownload, no_retry_failed).await?;
            }
            CliCommand::Status => run_status(&store).await?,
            CliCommand::Items { queue_id } => run_items(&store, queue_id).await?,
            CliCommand::Resumable => run_resumable(&store).await?,
            CliCommand::ClearResume { queue_id } => run_clear_resume(&store, queue_id).await?,
            CliCommand::Remove { queue_id } => run_remove(&store, queue_id).await?,
            CliCommand::Completions { .. } => unreachable!("handled above"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
