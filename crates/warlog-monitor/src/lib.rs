//! Process wiring for warlog: configuration, the snapshot fetcher and the
//! ingest scheduler. The `warlog` binary glues these to the HTTP API.

pub mod config;
pub mod fetch;
pub mod scheduler;

pub use config::MonitorConfig;
pub use fetch::{HttpSource, SnapshotSource};
pub use scheduler::{CycleError, Scheduler, stop_channel};
