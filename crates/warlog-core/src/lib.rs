//! Core types and trait definitions for warlog.
//!
//! This crate knows how to read an upstream war snapshot and turn it into
//! typed records. It is free of HTTP and database dependencies; storage
//! backends implement the traits in [`store`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod derive;
pub mod error;
pub mod normalize;
pub mod query;
pub mod record;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
pub use normalize::{Normalized, normalize};
pub use snapshot::Snapshot;
