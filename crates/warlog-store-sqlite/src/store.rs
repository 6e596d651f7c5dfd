//! [`SqliteStore`] — the SQLite implementation of [`SnapshotStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OpenFlags;
use warlog_core::{
  normalize, record::PassReport, snapshot::Snapshot, store::SnapshotStore,
};

use crate::{Result, reconcile, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A warlog store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every clone
/// talks to the same connection thread, so passes issued through clones are
/// still serialised.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the writer store at `path` and run schema creation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an independent read-only handle on an existing store.
  ///
  /// Schema creation is skipped; the writer owns the layout. With the
  /// writer in WAL mode, readers see only committed passes and never block
  /// it.
  pub async fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_with_flags(
      path,
      OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;
    Ok(Self { conn })
  }

  /// Open a read-only handle at `path`, first creating the file and schema
  /// if no writer has run there yet.
  pub async fn open_read_only_or_create(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let writer = Self::open(path).await?;
    // Attach before the writer closes so the WAL files stay in place.
    let reader = Self::open_read_only(path).await?;
    writer.close().await?;
    Ok(reader)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Close the connection, waiting for any in-flight call to finish first.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }
}

// ─── SnapshotStore impl ──────────────────────────────────────────────────────

impl SnapshotStore for SqliteStore {
  type Error = crate::Error;

  async fn reconcile_at(&self, snapshot: Snapshot, at: DateTime<Utc>) -> Result<PassReport> {
    // Stored instants are whole seconds.
    let at = at.trunc_subsecs(0);
    let pass = normalize(&snapshot, at);

    let result = self
      .conn
      .call(move |conn| {
        // Dropping `tx` on any error path rolls the whole pass back.
        let tx = conn.transaction()?;
        let report = reconcile::apply(&tx, &pass)?;
        tx.commit()?;
        Ok(report)
      })
      .await;

    match result {
      Ok(report) => {
        tracing::info!(
          timestamp = %report.timestamp,
          samples = report.samples_appended,
          reference_inserted = report.reference_inserted,
          news_inserted = report.news.inserted,
          news_updated = report.news.updated,
          "snapshot stored"
        );
        Ok(report)
      }
      Err(e) => {
        tracing::error!(timestamp = %at, error = %e, "snapshot pass rolled back");
        Err(e.into())
      }
    }
  }
}
