//! Runtime configuration, layered from `config.toml` and `WARLOG_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

/// Every field has a default, so an absent config file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
  pub api_url:              String,
  pub poll_interval_secs:   u64,
  pub error_backoff_secs:   u64,
  pub request_timeout_secs: u64,
  pub store_path:           PathBuf,
  pub host:                 String,
  pub port:                 u16,
}

impl Default for MonitorConfig {
  fn default() -> Self {
    Self {
      api_url:              "https://helldiverscompanion.com/api/hell-divers-2-api/get-all-api-data"
        .to_string(),
      poll_interval_secs:   900,
      error_backoff_secs:   60,
      request_timeout_secs: 30,
      store_path:           PathBuf::from("warlog.db"),
      host:                 "0.0.0.0".to_string(),
      port:                 5555,
    }
  }
}

impl MonitorConfig {
  /// Read `path` (if it exists), then let `WARLOG_*` variables override it.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    ::config::Config::builder()
      .add_source(::config::File::from(path).required(false))
      .add_source(::config::Environment::with_prefix("WARLOG"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise MonitorConfig")
  }

  pub fn poll_interval(&self) -> Duration { Duration::from_secs(self.poll_interval_secs) }

  pub fn error_backoff(&self) -> Duration { Duration::from_secs(self.error_backoff_secs) }

  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = MonitorConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg, MonitorConfig::default());
    assert_eq!(cfg.poll_interval(), Duration::from_secs(900));
    assert_eq!(cfg.address(), "0.0.0.0:5555");
  }

  #[test]
  fn file_values_override_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "poll_interval_secs = 60\nstore_path = \"/var/lib/warlog/war.db\"").unwrap();

    let cfg = MonitorConfig::load(file.path()).unwrap();
    assert_eq!(cfg.poll_interval_secs, 60);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/warlog/war.db"));
    assert_eq!(cfg.error_backoff_secs, 60);
    assert_eq!(cfg.port, 5555);
  }
}
