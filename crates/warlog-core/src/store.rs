//! The storage traits and their contracts.
//!
//! Writing and reading are split on purpose: the ingesting process holds a
//! [`SnapshotStore`], while the query surface is generic over
//! [`WarArchive`] and therefore cannot mutate anything.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  query::{
    NewsPage, NewsQuery, NewsStats, NewsTypeCount, OrderHistory, OrderSummary,
    PlanetDetails, PlanetsBySector, Window,
  },
  record::{
    GlobalResourceSample, NewsItem, PassReport, PlanetStatusSample,
    RegionStatusSample, WarStatsSample, WarStatusSample, pass_timestamp,
  },
  snapshot::Snapshot,
};

// ─── Write side ──────────────────────────────────────────────────────────────

/// The single writer of all warlog tables.
///
/// A reconciliation pass applies, per entity class:
///
/// - reference rows (planets, regions, order definitions): insert if the
///   natural key is absent, otherwise ignore;
/// - history samples: unconditional append;
/// - news: insert if absent, otherwise update only when the message differs.
///
/// Every write of one pass shares one timestamp and commits atomically. On
/// error nothing from the pass is persisted.
pub trait SnapshotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Reconcile `snapshot` under a caller-supplied pass timestamp.
  fn reconcile_at(
    &self,
    snapshot: Snapshot,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<PassReport, Self::Error>> + Send + '_;

  /// Reconcile `snapshot`, capturing the pass timestamp now.
  fn reconcile(
    &self,
    snapshot: Snapshot,
  ) -> impl Future<Output = Result<PassReport, Self::Error>> + Send + '_ {
    self.reconcile_at(snapshot, pass_timestamp())
  }
}

// ─── Read side ───────────────────────────────────────────────────────────────

/// Read-only lookups over committed passes.
///
/// "Not found" and "empty" are different answers: lookups keyed by an entity
/// return `Ok(None)` when the entity is unknown, and windowed history
/// returns an empty list when nothing falls in the window.
pub trait WarArchive: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn war_status_trend(
    &self,
    window: Window,
  ) -> impl Future<Output = Result<Vec<WarStatusSample>, Self::Error>> + Send + '_;

  fn war_stats_trend(
    &self,
    window: Window,
  ) -> impl Future<Output = Result<Vec<WarStatsSample>, Self::Error>> + Send + '_;

  fn global_resources_trend(
    &self,
    window: Window,
  ) -> impl Future<Output = Result<Vec<GlobalResourceSample>, Self::Error>> + Send + '_;

  fn planet_history(
    &self,
    planet_index: i64,
    window: Window,
  ) -> impl Future<Output = Result<Vec<PlanetStatusSample>, Self::Error>> + Send + '_;

  fn region_history(
    &self,
    planet_index: i64,
    region_index: i64,
    window: Window,
  ) -> impl Future<Output = Result<Vec<RegionStatusSample>, Self::Error>> + Send + '_;

  /// Planet states from the most recent pass. `None` if no planet has ever
  /// been sampled.
  fn planets_by_sector(
    &self,
  ) -> impl Future<Output = Result<Option<PlanetsBySector>, Self::Error>> + Send + '_;

  /// `None` if the planet is not in the catalogue.
  fn planet_details(
    &self,
    planet_index: i64,
  ) -> impl Future<Output = Result<Option<PlanetDetails>, Self::Error>> + Send + '_;

  /// `None` if the order has never been seen.
  fn order_history(
    &self,
    order_id: i64,
    window: Window,
  ) -> impl Future<Output = Result<Option<OrderHistory>, Self::Error>> + Send + '_;

  /// Orders whose latest sample still has time remaining, newest first,
  /// with liveness judged at `now`.
  fn active_orders(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<OrderSummary>, Self::Error>> + Send + '_;

  fn news(
    &self,
    query: NewsQuery,
  ) -> impl Future<Output = Result<NewsPage, Self::Error>> + Send + '_;

  /// The `limit` most recently published items, capped at
  /// [`crate::query::LATEST_NEWS_MAX`].
  fn latest_news(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<NewsItem>, Self::Error>> + Send + '_;

  fn news_item(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<NewsItem>, Self::Error>> + Send + '_;

  fn news_types(
    &self,
  ) -> impl Future<Output = Result<Vec<NewsTypeCount>, Self::Error>> + Send + '_;

  /// Totals over all news, with `recent_count` counting items first stored
  /// after `since`.
  fn news_stats(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<NewsStats, Self::Error>> + Send + '_;
}
