pub mod config;
pub mod logging;

pub mod checksum;
pub mod control;
pub mod fetcher;
pub mod proxy;
pub mod scheduler;
pub mod store;
pub mod throttle;
