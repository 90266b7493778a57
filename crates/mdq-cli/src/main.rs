use mdq_core::logging;

mod cli;
mod fetcher;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // File logging first; fall back to stderr if the state dir is unwritable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("mdq error: {:#}", err);
        std::process::exit(1);
    }
}
