//! Encoding and decoding helpers between warlog records and SQLite columns.
//!
//! Instants are stored as Unix seconds. News tag lists are stored as compact
//! JSON arrays; an undecodable stored list reads back as empty with a warning
//! and is left as-is in the table.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use warlog_core::record::{
  GlobalResourceSample, MajorOrderDefinition, MajorOrderProgressSample,
  NewsItem, PlanetInfo, PlanetStatusSample, RegionInfo, RegionStatusSample,
  WarStatsSample, WarStatusSample,
};

// ─── Instants ────────────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> i64 { dt.timestamp() }

pub fn decode_ts(idx: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
  DateTime::from_timestamp(secs, 0)
    .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, secs))
}

/// Read the Unix-seconds column at `idx` as an instant.
pub fn ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
  decode_ts(idx, row.get(idx)?)
}

// ─── Tag ids ─────────────────────────────────────────────────────────────────

pub fn encode_tag_ids(tags: &[i64]) -> rusqlite::Result<String> {
  serde_json::to_string(tags)
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Decode a stored tag list. Never fails: bad text yields an empty list.
pub fn decode_tag_ids(news_id: i64, raw: &str) -> Vec<i64> {
  match serde_json::from_str(raw) {
    Ok(tags) => tags,
    Err(e) => {
      tracing::warn!(news_id, raw, error = %e, "stored tag_ids are not a JSON integer list");
      Vec::new()
    }
  }
}

// ─── Reference rows ──────────────────────────────────────────────────────────

pub const PLANET_INFO_COLUMNS: &str =
  "planet_index, sector, max_health, initial_owner, position_x, position_y";

/// Reads [`PLANET_INFO_COLUMNS`] starting at `at`.
pub fn planet_info_at(row: &Row<'_>, at: usize) -> rusqlite::Result<PlanetInfo> {
  Ok(PlanetInfo {
    index:         row.get(at)?,
    sector:        row.get(at + 1)?,
    max_health:    row.get(at + 2)?,
    initial_owner: row.get(at + 3)?,
    position_x:    row.get(at + 4)?,
    position_y:    row.get(at + 5)?,
  })
}

pub const REGION_INFO_COLUMNS: &str =
  "planet_index, region_index, max_health, region_size";

pub fn region_info_at(row: &Row<'_>, at: usize) -> rusqlite::Result<RegionInfo> {
  Ok(RegionInfo {
    planet_index: row.get(at)?,
    region_index: row.get(at + 1)?,
    max_health:   row.get(at + 2)?,
    region_size:  row.get(at + 3)?,
  })
}

pub const ORDER_COLUMNS: &str =
  "order_id, title, brief, task_type, target_value, created_at, expires_at";

pub fn order_at(row: &Row<'_>, at: usize) -> rusqlite::Result<MajorOrderDefinition> {
  Ok(MajorOrderDefinition {
    order_id:     row.get(at)?,
    title:        row.get(at + 1)?,
    brief:        row.get(at + 2)?,
    task_type:    row.get(at + 3)?,
    target_value: row.get(at + 4)?,
    created_at:   ts_column(row, at + 5)?,
    expires_at:   ts_column(row, at + 6)?,
  })
}

// ─── History rows ────────────────────────────────────────────────────────────

pub const WAR_STATUS_COLUMNS: &str = "timestamp, war_id, war_time, impact_multiplier, \
  total_planets, super_earth_planets, enemy_planets, total_players";

pub fn war_status_row(row: &Row<'_>) -> rusqlite::Result<WarStatusSample> {
  Ok(WarStatusSample {
    timestamp:           ts_column(row, 0)?,
    war_id:              row.get(1)?,
    war_time:            row.get(2)?,
    impact_multiplier:   row.get(3)?,
    total_planets:       row.get(4)?,
    super_earth_planets: row.get(5)?,
    enemy_planets:       row.get(6)?,
    total_players:       row.get(7)?,
  })
}

pub const PLANET_STATUS_COLUMNS: &str =
  "timestamp, planet_index, owner, health, players, regen_per_second";

pub fn planet_status_at(row: &Row<'_>, at: usize) -> rusqlite::Result<PlanetStatusSample> {
  Ok(PlanetStatusSample {
    timestamp:        ts_column(row, at)?,
    planet_index:     row.get(at + 1)?,
    owner:            row.get(at + 2)?,
    health:           row.get(at + 3)?,
    players:          row.get(at + 4)?,
    regen_per_second: row.get(at + 5)?,
  })
}

pub fn planet_status_row(row: &Row<'_>) -> rusqlite::Result<PlanetStatusSample> {
  planet_status_at(row, 0)
}

pub const REGION_STATUS_COLUMNS: &str = "timestamp, planet_index, region_index, owner, \
  health, regen_per_second, is_available, players";

pub fn region_status_row(row: &Row<'_>) -> rusqlite::Result<RegionStatusSample> {
  Ok(RegionStatusSample {
    timestamp:        ts_column(row, 0)?,
    planet_index:     row.get(1)?,
    region_index:     row.get(2)?,
    owner:            row.get(3)?,
    health:           row.get(4)?,
    regen_per_second: row.get(5)?,
    is_available:     row.get(6)?,
    players:          row.get(7)?,
  })
}

pub const WAR_STATS_COLUMNS: &str = "timestamp, missions_won, missions_lost, \
  mission_success_rate, bug_kills, automaton_kills, illuminate_kills, total_deaths, accuracy";

pub fn war_stats_row(row: &Row<'_>) -> rusqlite::Result<WarStatsSample> {
  Ok(WarStatsSample {
    timestamp:            ts_column(row, 0)?,
    missions_won:         row.get(1)?,
    missions_lost:        row.get(2)?,
    mission_success_rate: row.get(3)?,
    bug_kills:            row.get(4)?,
    automaton_kills:      row.get(5)?,
    illuminate_kills:     row.get(6)?,
    total_deaths:         row.get(7)?,
    accuracy:             row.get(8)?,
  })
}

pub const GLOBAL_RESOURCE_COLUMNS: &str =
  "timestamp, resource_id, current_value, max_value, percentage";

pub fn global_resource_row(row: &Row<'_>) -> rusqlite::Result<GlobalResourceSample> {
  Ok(GlobalResourceSample {
    timestamp:     ts_column(row, 0)?,
    resource_id:   row.get(1)?,
    current_value: row.get(2)?,
    max_value:     row.get(3)?,
    percentage:    row.get(4)?,
  })
}

pub const ORDER_PROGRESS_COLUMNS: &str =
  "timestamp, order_id, current_progress, progress_percentage, expires_in";

pub fn order_progress_at(
  row: &Row<'_>,
  at:  usize,
) -> rusqlite::Result<MajorOrderProgressSample> {
  Ok(MajorOrderProgressSample {
    timestamp:           ts_column(row, at)?,
    order_id:            row.get(at + 1)?,
    current_progress:    row.get(at + 2)?,
    progress_percentage: row.get(at + 3)?,
    expires_in:          row.get(at + 4)?,
  })
}

pub fn order_progress_row(row: &Row<'_>) -> rusqlite::Result<MajorOrderProgressSample> {
  order_progress_at(row, 0)
}

// ─── News ────────────────────────────────────────────────────────────────────

pub const NEWS_COLUMNS: &str =
  "news_id, published, type, tag_ids, message, stored_at, updated_at";

/// Columns read directly from a `news` row; tag ids still encoded.
pub struct RawNews {
  pub id:         i64,
  pub published:  i64,
  pub kind:       i64,
  pub tag_ids:    String,
  pub message:    String,
  pub stored_at:  i64,
  pub updated_at: i64,
}

impl RawNews {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      published:  row.get(1)?,
      kind:       row.get(2)?,
      tag_ids:    row.get(3)?,
      message:    row.get(4)?,
      stored_at:  row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_item(self) -> rusqlite::Result<NewsItem> {
    Ok(NewsItem {
      tag_ids:    decode_tag_ids(self.id, &self.tag_ids),
      id:         self.id,
      published:  self.published,
      kind:       self.kind,
      message:    self.message,
      stored_at:  decode_ts(5, self.stored_at)?,
      updated_at: decode_ts(6, self.updated_at)?,
    })
  }
}

pub fn news_row(row: &Row<'_>) -> rusqlite::Result<NewsItem> {
  RawNews::from_row(row)?.into_item()
}
