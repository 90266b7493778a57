//! Queue scheduler: sequential item loop with throttling, proxy rotation,
//! interactive control, and crash-safe resume.

mod order;
mod progress;
mod run;

pub use order::sort_items;
pub use progress::{ItemOutcome, Notifier, NoopNotifier, RunEvent, RunSummary};
pub use run::{run_queue, RunOptions, RunOutcome};
