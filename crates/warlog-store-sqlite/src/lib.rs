//! SQLite backend for warlog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] opened with
//! [`SqliteStore::open`] is the single writer; readers open their own
//! handles with [`SqliteStore::open_read_only`].

mod archive;
mod encode;
mod reconcile;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
