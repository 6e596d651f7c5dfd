//! The fixed-interval ingest loop.
//!
//! One [`Scheduler`] owns the writer store. Each cycle fetches a snapshot and
//! reconciles it; the next cycle starts only after the previous pass has
//! committed or rolled back.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use warlog_core::{record::PassReport, store::SnapshotStore};
use warlog_store_sqlite::SqliteStore;

use crate::fetch::SnapshotSource;

/// Granularity at which sleeps re-check the stop flag.
const TICK: Duration = Duration::from_secs(1);

/// Why a cycle did not store anything.
#[derive(Debug, Error)]
pub enum CycleError {
  #[error("fetch failed: {0:#}")]
  Fetch(anyhow::Error),

  #[error("reconcile failed: {0}")]
  Store(#[from] warlog_store_sqlite::Error),
}

/// A sender/receiver pair for requesting shutdown. Send `true` to stop.
pub fn stop_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) { watch::channel(false) }

pub struct Scheduler<S> {
  source:        S,
  store:         SqliteStore,
  poll_interval: Duration,
  error_backoff: Duration,
  stop:          watch::Receiver<bool>,
}

impl<S: SnapshotSource> Scheduler<S> {
  pub fn new(
    source: S,
    store: SqliteStore,
    poll_interval: Duration,
    error_backoff: Duration,
    stop: watch::Receiver<bool>,
  ) -> Self {
    Self { source, store, poll_interval, error_backoff, stop }
  }

  /// Fetch one snapshot and reconcile it.
  pub async fn run_once(&self) -> Result<PassReport, CycleError> {
    let snapshot = self.source.fetch().await.map_err(CycleError::Fetch)?;
    Ok(self.store.reconcile(snapshot).await?)
  }

  /// Loop until stopped, then close the store.
  pub async fn run(mut self) -> warlog_store_sqlite::Result<()> {
    tracing::info!(
      interval_secs = self.poll_interval.as_secs(),
      "monitor started"
    );

    while !self.stopped() {
      let wait = match self.run_once().await {
        Ok(_) => self.poll_interval,
        Err(CycleError::Fetch(e)) => {
          tracing::warn!(error = %format!("{e:#}"), "no snapshot this cycle");
          self.poll_interval
        }
        Err(e @ CycleError::Store(_)) => {
          tracing::error!(error = %e, backoff_secs = self.error_backoff.as_secs(), "cycle failed");
          self.error_backoff
        }
      };
      self.sleep(wait).await;
    }

    tracing::info!("monitor stopped");
    self.store.close().await
  }

  /// A dropped sender counts as a stop request.
  fn stopped(&self) -> bool { *self.stop.borrow() || self.stop.has_changed().is_err() }

  /// Sleep for `total` in [`TICK`] steps, waking early on a stop request.
  async fn sleep(&mut self, total: Duration) {
    let mut left = total;
    while !left.is_zero() && !self.stopped() {
      let tick = left.min(TICK);
      tokio::select! {
        _ = tokio::time::sleep(tick) => {}
        _ = self.stop.changed() => {}
      }
      left = left.saturating_sub(tick);
    }
  }
}
