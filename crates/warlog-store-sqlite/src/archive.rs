//! [`WarArchive`] for [`SqliteStore`]: the read-only query surface.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, Row, params, params_from_iter};
use warlog_core::{
  query::{
    LATEST_NEWS_MAX, NewsPage, NewsQuery, NewsStats, NewsTypeCount,
    OrderHistory, OrderSummary, PlanetDetails, PlanetState, PlanetsBySector,
    RegionDetails, Window, order_is_live,
  },
  record::{
    GlobalResourceSample, NewsItem, PlanetStatusSample, RegionStatusSample,
    WarStatsSample, WarStatusSample,
  },
  store::WarArchive,
};

use crate::{
  Result,
  encode::{
    GLOBAL_RESOURCE_COLUMNS, NEWS_COLUMNS, ORDER_COLUMNS,
    ORDER_PROGRESS_COLUMNS, PLANET_INFO_COLUMNS, PLANET_STATUS_COLUMNS,
    REGION_INFO_COLUMNS, REGION_STATUS_COLUMNS, WAR_STATS_COLUMNS,
    WAR_STATUS_COLUMNS, decode_ts, encode_ts, global_resource_row, news_row,
    order_at, order_progress_at, order_progress_row, planet_info_at,
    planet_status_at, planet_status_row, region_info_at, region_status_row,
    war_stats_row, war_status_row,
  },
  store::SqliteStore,
};

// ─── Windowed history ────────────────────────────────────────────────────────

/// A history table plus an optional equality filter on key columns.
struct Series {
  table:   &'static str,
  columns: &'static str,
  /// Extra `AND col = ?` clauses, one `?` per key value.
  filter:  &'static str,
}

/// The newest `window.limit` rows of `series` strictly after `window.since`,
/// returned oldest first.
fn window_rows<T>(
  conn:   &Connection,
  series: &Series,
  keys:   &[i64],
  window: Window,
  map:    fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
  let sql = format!(
    "SELECT * FROM (
       SELECT {columns}, id FROM {table}
       WHERE timestamp > ? {filter}
       ORDER BY timestamp DESC, id DESC
       LIMIT ?
     ) ORDER BY timestamp ASC, id ASC",
    columns = series.columns,
    table = series.table,
    filter = series.filter,
  );

  let since = window.since.map(encode_ts).unwrap_or(i64::MIN);
  let limit = window.limit.min(Window::MAX_LIMIT) as i64;
  let values = std::iter::once(since)
    .chain(keys.iter().copied())
    .chain(std::iter::once(limit));

  let mut stmt = conn.prepare_cached(&sql)?;
  let rows = stmt
    .query_map(params_from_iter(values), map)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

static WAR_STATUS: Series = Series {
  table:   "war_status_history",
  columns: WAR_STATUS_COLUMNS,
  filter:  "",
};

static WAR_STATS: Series = Series {
  table:   "war_stats_history",
  columns: WAR_STATS_COLUMNS,
  filter:  "",
};

static GLOBAL_RESOURCES: Series = Series {
  table:   "global_resources_history",
  columns: GLOBAL_RESOURCE_COLUMNS,
  filter:  "",
};

static PLANET_STATUS: Series = Series {
  table:   "planet_status_history",
  columns: PLANET_STATUS_COLUMNS,
  filter:  "AND planet_index = ?",
};

static REGION_STATUS: Series = Series {
  table:   "planet_regions_history",
  columns: REGION_STATUS_COLUMNS,
  filter:  "AND planet_index = ? AND region_index = ?",
};

static ORDER_PROGRESS: Series = Series {
  table:   "major_orders_progress",
  columns: ORDER_PROGRESS_COLUMNS,
  filter:  "AND order_id = ?",
};

impl SqliteStore {
  async fn series<T: Send + 'static>(
    &self,
    series: &'static Series,
    keys:   Vec<i64>,
    window: Window,
    map:    fn(&Row<'_>) -> rusqlite::Result<T>,
  ) -> Result<Vec<T>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(window_rows(conn, series, &keys, window, map)?))
        .await?,
    )
  }
}

// ─── Latest-row lookups ──────────────────────────────────────────────────────

fn latest_region_sample(
  conn:         &Connection,
  planet_index: i64,
  region_index: i64,
) -> rusqlite::Result<Option<RegionStatusSample>> {
  conn
    .prepare_cached(&format!(
      "SELECT {REGION_STATUS_COLUMNS} FROM planet_regions_history
       WHERE planet_index = ?1 AND region_index = ?2
       ORDER BY timestamp DESC, id DESC LIMIT 1"
    ))?
    .query_row(params![planet_index, region_index], region_status_row)
    .optional()
}

fn planet_details(conn: &Connection, planet_index: i64) -> rusqlite::Result<Option<PlanetDetails>> {
  let info = conn
    .query_row(
      &format!("SELECT {PLANET_INFO_COLUMNS} FROM planets_info WHERE planet_index = ?1"),
      params![planet_index],
      |row| planet_info_at(row, 0),
    )
    .optional()?;
  let Some(info) = info else {
    return Ok(None);
  };

  let latest = conn
    .query_row(
      &format!(
        "SELECT {PLANET_STATUS_COLUMNS} FROM planet_status_history
         WHERE planet_index = ?1
         ORDER BY timestamp DESC, id DESC LIMIT 1"
      ),
      params![planet_index],
      planet_status_row,
    )
    .optional()?;

  let region_infos = conn
    .prepare(&format!(
      "SELECT {REGION_INFO_COLUMNS} FROM planet_regions_info
       WHERE planet_index = ?1 ORDER BY region_index"
    ))?
    .query_map(params![planet_index], |row| region_info_at(row, 0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let regions = region_infos
    .into_iter()
    .map(|info| {
      let latest = latest_region_sample(conn, info.planet_index, info.region_index)?;
      Ok(RegionDetails { info, latest })
    })
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some(PlanetDetails { info, latest, regions }))
}

fn planets_by_sector(conn: &Connection) -> rusqlite::Result<Option<PlanetsBySector>> {
  let latest: Option<i64> =
    conn.query_row("SELECT MAX(timestamp) FROM planet_status_history", [], |row| row.get(0))?;
  let Some(latest) = latest else {
    return Ok(None);
  };

  // Planets sampled before their catalogue entry arrived are left out.
  let states = conn
    .prepare(&format!(
      "SELECT p.*, s.* FROM
         (SELECT {PLANET_INFO_COLUMNS} FROM planets_info) p
       JOIN
         (SELECT {PLANET_STATUS_COLUMNS}, id FROM planet_status_history WHERE timestamp = ?1) s
       ON s.planet_index = p.planet_index
       ORDER BY p.sector, p.planet_index, s.id"
    ))?
    .query_map(params![latest], |row| {
      Ok(PlanetState { info: planet_info_at(row, 0)?, status: planet_status_at(row, 6)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let total = states.len();
  let mut sectors: BTreeMap<i64, Vec<PlanetState>> = BTreeMap::new();
  for state in states {
    sectors.entry(state.info.sector).or_default().push(state);
  }

  Ok(Some(PlanetsBySector { timestamp: decode_ts(0, latest)?, total, sectors }))
}

fn order_history(
  conn:     &Connection,
  order_id: i64,
  window:   Window,
) -> rusqlite::Result<Option<OrderHistory>> {
  let definition = conn
    .query_row(
      &format!("SELECT {ORDER_COLUMNS} FROM major_orders WHERE order_id = ?1"),
      params![order_id],
      |row| order_at(row, 0),
    )
    .optional()?;
  let Some(definition) = definition else {
    return Ok(None);
  };

  let progress = window_rows(conn, &ORDER_PROGRESS, &[order_id], window, order_progress_row)?;
  Ok(Some(OrderHistory { definition, progress }))
}

fn active_orders(conn: &Connection, now: DateTime<Utc>) -> rusqlite::Result<Vec<OrderSummary>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT o.*, p.*, f.first_seen FROM
       (SELECT {ORDER_COLUMNS} FROM major_orders) o
     JOIN
       (SELECT {ORDER_PROGRESS_COLUMNS} FROM major_orders_progress
        WHERE id IN (SELECT MAX(id) FROM major_orders_progress GROUP BY order_id)) p
     ON p.order_id = o.order_id
     JOIN
       (SELECT order_id, MIN(timestamp) AS first_seen
        FROM major_orders_progress GROUP BY order_id) f
     ON f.order_id = o.order_id
     WHERE p.expires_in > 0
     ORDER BY p.timestamp DESC, o.order_id DESC"
  ))?;

  let summaries = stmt
    .query_map([], |row| {
      let definition = order_at(row, 0)?;
      let latest = order_progress_at(row, 7)?;
      let first_seen = decode_ts(12, row.get(12)?)?;
      let duration_hours = (latest.timestamp - first_seen).num_seconds() as f64 / 3600.0;
      let is_active = order_is_live(&latest, now);
      Ok(OrderSummary { definition, latest, first_seen, duration_hours, is_active })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(summaries)
}

// ─── News ────────────────────────────────────────────────────────────────────

fn count(n: i64) -> usize { usize::try_from(n).unwrap_or(0) }

fn news_page(conn: &Connection, query: NewsQuery) -> rusqlite::Result<NewsPage> {
  let query = query.clamped();
  // SQLite reads a negative OFFSET as zero, so saturate instead of wrapping.
  let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

  let total_count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM news WHERE (?1 IS NULL OR type = ?1)",
    params![query.kind],
    |row| row.get(0),
  )?;

  let items = conn
    .prepare_cached(&format!(
      "SELECT {NEWS_COLUMNS} FROM news
       WHERE (?1 IS NULL OR type = ?1)
       ORDER BY published DESC, news_id DESC
       LIMIT ?2 OFFSET ?3"
    ))?
    .query_map(params![query.kind, query.limit as i64, offset], news_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let total_count = count(total_count);
  let has_more = query.has_more(items.len(), total_count);
  Ok(NewsPage {
    items,
    total_count,
    limit: query.limit,
    offset: query.offset,
    has_more,
  })
}

fn type_counts(conn: &Connection, order_by: &str) -> rusqlite::Result<Vec<NewsTypeCount>> {
  let counts = conn
    .prepare(&format!("SELECT type, COUNT(*) FROM news GROUP BY type ORDER BY {order_by}"))?
    .query_map([], |row| {
      Ok(NewsTypeCount { kind: row.get(0)?, count: count(row.get(1)?) })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(counts)
}

fn news_stats(conn: &Connection, since: i64) -> rusqlite::Result<NewsStats> {
  let (total, latest_published, earliest_published): (i64, Option<i64>, Option<i64>) = conn
    .query_row("SELECT COUNT(*), MAX(published), MIN(published) FROM news", [], |row| {
      Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })?;
  let recent: i64 = conn.query_row(
    "SELECT COUNT(*) FROM news WHERE stored_at > ?1",
    params![since],
    |row| row.get(0),
  )?;

  Ok(NewsStats {
    total_count: count(total),
    latest_published,
    earliest_published,
    recent_count: count(recent),
    type_breakdown: type_counts(conn, "COUNT(*) DESC, type ASC")?,
  })
}

// ─── WarArchive impl ─────────────────────────────────────────────────────────

impl WarArchive for SqliteStore {
  type Error = crate::Error;

  async fn war_status_trend(&self, window: Window) -> Result<Vec<WarStatusSample>> {
    self.series(&WAR_STATUS, Vec::new(), window, war_status_row).await
  }

  async fn war_stats_trend(&self, window: Window) -> Result<Vec<WarStatsSample>> {
    self.series(&WAR_STATS, Vec::new(), window, war_stats_row).await
  }

  async fn global_resources_trend(&self, window: Window) -> Result<Vec<GlobalResourceSample>> {
    self
      .series(&GLOBAL_RESOURCES, Vec::new(), window, global_resource_row)
      .await
  }

  async fn planet_history(
    &self,
    planet_index: i64,
    window: Window,
  ) -> Result<Vec<PlanetStatusSample>> {
    self
      .series(&PLANET_STATUS, vec![planet_index], window, planet_status_row)
      .await
  }

  async fn region_history(
    &self,
    planet_index: i64,
    region_index: i64,
    window: Window,
  ) -> Result<Vec<RegionStatusSample>> {
    self
      .series(&REGION_STATUS, vec![planet_index, region_index], window, region_status_row)
      .await
  }

  async fn planets_by_sector(&self) -> Result<Option<PlanetsBySector>> {
    Ok(self.conn.call(|conn| Ok(planets_by_sector(conn)?)).await?)
  }

  async fn planet_details(&self, planet_index: i64) -> Result<Option<PlanetDetails>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(planet_details(conn, planet_index)?))
        .await?,
    )
  }

  async fn order_history(&self, order_id: i64, window: Window) -> Result<Option<OrderHistory>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(order_history(conn, order_id, window)?))
        .await?,
    )
  }

  async fn active_orders(&self, now: DateTime<Utc>) -> Result<Vec<OrderSummary>> {
    Ok(self.conn.call(move |conn| Ok(active_orders(conn, now)?)).await?)
  }

  async fn news(&self, query: NewsQuery) -> Result<NewsPage> {
    Ok(self.conn.call(move |conn| Ok(news_page(conn, query)?)).await?)
  }

  async fn latest_news(&self, limit: usize) -> Result<Vec<NewsItem>> {
    let limit = limit.min(LATEST_NEWS_MAX) as i64;
    Ok(
      self
        .conn
        .call(move |conn| {
          let items = conn
            .prepare_cached(&format!(
              "SELECT {NEWS_COLUMNS} FROM news
               ORDER BY published DESC, news_id DESC LIMIT ?1"
            ))?
            .query_map(params![limit], news_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(items)
        })
        .await?,
    )
  }

  async fn news_item(&self, id: i64) -> Result<Option<NewsItem>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                &format!("SELECT {NEWS_COLUMNS} FROM news WHERE news_id = ?1"),
                params![id],
                news_row,
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn news_types(&self) -> Result<Vec<NewsTypeCount>> {
    Ok(self.conn.call(|conn| Ok(type_counts(conn, "type ASC")?)).await?)
  }

  async fn news_stats(&self, since: DateTime<Utc>) -> Result<NewsStats> {
    let since = encode_ts(since);
    Ok(self.conn.call(move |conn| Ok(news_stats(conn, since)?)).await?)
  }
}
