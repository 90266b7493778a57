//! CLI command handlers. Each command is in its own file for clarity.

mod add;
mod clear_resume;
mod completions;
mod items;
mod remove;
mod resumable;
mod run;
mod status;

pub use add::run_add;
pub use clear_resume::run_clear_resume;
pub use completions::run_completions;
pub use items::run_items;
pub use remove::run_remove;
pub use resumable::run_resumable;
pub use run::run_scheduler;
pub use status::run_status;
