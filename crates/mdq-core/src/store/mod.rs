//! Persistent queue/item database (SQLite via sqlx).
//!
//! Stores playlist queues, their download items, and per-queue resume
//! markers written when a run is cancelled with work remaining.

pub mod db;
pub mod items;
pub mod markers;
pub mod queues;
pub mod types;

pub use db::*;
pub use types::*;

#[cfg(test)]
mod tests;
