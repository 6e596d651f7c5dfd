//! Parameter and result types for the read-only query surface.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{
  MajorOrderDefinition, MajorOrderProgressSample, NewsItem, PlanetInfo,
  PlanetStatusSample, RegionInfo, RegionStatusSample,
};

// ─── Windows ─────────────────────────────────────────────────────────────────

/// Selects the most recent `limit` samples strictly after `since`, returned
/// oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  pub since: Option<DateTime<Utc>>,
  pub limit: usize,
}

impl Window {
  pub const DEFAULT_LIMIT: usize = 50;
  pub const MAX_LIMIT: usize = 1000;

  /// Samples from the last `hours` hours relative to `now`.
  pub fn last_hours(now: DateTime<Utc>, hours: i64, limit: usize) -> Self {
    let since = Duration::try_hours(hours).and_then(|d| now.checked_sub_signed(d));
    Self { since, limit: limit.min(Self::MAX_LIMIT) }
  }

  /// The latest `limit` samples regardless of age.
  pub fn latest(limit: usize) -> Self {
    Self { since: None, limit: limit.min(Self::MAX_LIMIT) }
  }
}

impl Default for Window {
  fn default() -> Self { Self::latest(Self::DEFAULT_LIMIT) }
}

// ─── Planets ─────────────────────────────────────────────────────────────────

/// A planet's catalogue entry joined with one status sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetState {
  pub info:   PlanetInfo,
  pub status: PlanetStatusSample,
}

/// Planet states from the most recent pass, grouped by sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetsBySector {
  pub timestamp: DateTime<Utc>,
  pub total:     usize,
  pub sectors:   BTreeMap<i64, Vec<PlanetState>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDetails {
  pub info:   RegionInfo,
  /// `None` if the region has never been sampled.
  pub latest: Option<RegionStatusSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetDetails {
  pub info:    PlanetInfo,
  /// `None` if the planet has never been sampled.
  pub latest:  Option<PlanetStatusSample>,
  pub regions: Vec<RegionDetails>,
}

// ─── Orders ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderHistory {
  pub definition: MajorOrderDefinition,
  /// Empty when the order is known but has no samples in the window.
  pub progress:   Vec<MajorOrderProgressSample>,
}

/// Latest progress for an order still counting down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
  pub definition:     MajorOrderDefinition,
  pub latest:         MajorOrderProgressSample,
  pub first_seen:     DateTime<Utc>,
  /// Hours between the first and latest progress samples.
  pub duration_hours: f64,
  /// See [`order_is_live`].
  pub is_active:      bool,
}

/// A sample older than this means polling has lost sight of the order.
pub const ORDER_STALE_AFTER_SECS: i64 = 20 * 60;

/// Whether `latest` still describes a running order at `now`: its deadline
/// has not passed and it was sampled within [`ORDER_STALE_AFTER_SECS`].
pub fn order_is_live(latest: &MajorOrderProgressSample, now: DateTime<Utc>) -> bool {
  let age = now - latest.timestamp;
  // A deadline too far out to represent has not passed.
  let not_expired = Duration::try_seconds(latest.expires_in)
    .and_then(|left| latest.timestamp.checked_add_signed(left))
    .is_none_or(|deadline| deadline >= now);
  not_expired && age < Duration::seconds(ORDER_STALE_AFTER_SECS)
}

// ─── News ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsQuery {
  /// Restrict to a single news `type`.
  pub kind:   Option<i64>,
  pub limit:  usize,
  pub offset: usize,
}

impl NewsQuery {
  pub const DEFAULT_LIMIT: usize = 20;
  pub const MAX_LIMIT: usize = 100;

  /// Clamp `limit` to [`Self::MAX_LIMIT`]. `offset` is kept as given; an
  /// offset past the end simply yields an empty page.
  pub fn clamped(self) -> Self {
    Self { limit: self.limit.min(Self::MAX_LIMIT), ..self }
  }

  /// `offset + returned < total`, without overflowing on huge offsets.
  pub fn has_more(&self, returned: usize, total: usize) -> bool {
    self.offset.saturating_add(returned) < total
  }
}

impl Default for NewsQuery {
  fn default() -> Self { Self { kind: None, limit: Self::DEFAULT_LIMIT, offset: 0 } }
}

/// Upper bound for [`crate::store::WarArchive::latest_news`].
pub const LATEST_NEWS_MAX: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsPage {
  pub items:       Vec<NewsItem>,
  pub total_count: usize,
  pub limit:       usize,
  pub offset:      usize,
  pub has_more:    bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsTypeCount {
  #[serde(rename = "type")]
  pub kind:  i64,
  pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsStats {
  pub total_count:        usize,
  pub latest_published:   Option<i64>,
  pub earliest_published: Option<i64>,
  /// Items first stored after the requested instant.
  pub recent_count:       usize,
  /// Most frequent types first.
  pub type_breakdown:     Vec<NewsTypeCount>,
}
