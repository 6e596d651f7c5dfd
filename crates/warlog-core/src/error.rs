//! Error types for `warlog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("snapshot is not valid JSON: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("snapshot root must be a JSON object, got {0}")]
  NotAnObject(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
