//! The write side of a reconciliation pass.
//!
//! [`apply`] runs inside a transaction opened by the caller and performs every
//! write of one pass. Any error propagates untouched so the caller can drop
//! the transaction, which rolls back everything written so far.

use rusqlite::{OptionalExtension as _, Transaction, params};
use warlog_core::{
  normalize::Normalized,
  record::{NewsSighting, NewsTally, PassReport},
};

use crate::encode::{encode_tag_ids, encode_ts};

/// What happened to one news sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NewsOutcome {
  Inserted,
  Updated,
  Unchanged,
}

/// Write one normalised pass: reference rows and order progress first, then
/// war status, planet, region, resource and stats samples, then news. Every
/// row carries `pass.at`.
pub fn apply(tx: &Transaction<'_>, pass: &Normalized) -> rusqlite::Result<PassReport> {
  let at = encode_ts(pass.at);
  let mut report = PassReport { timestamp: pass.at, ..Default::default() };
  let mut reference = |inserted: bool| {
    if inserted {
      report.reference_inserted += 1;
    } else {
      report.reference_ignored += 1;
    }
  };

  // ── Reference rows: first write wins ──────────────────────────────────────

  {
    let mut stmt = tx.prepare_cached(
      "INSERT INTO planets_info
         (planet_index, sector, max_health, initial_owner, position_x, position_y)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)
       ON CONFLICT (planet_index) DO NOTHING",
    )?;
    for p in &pass.planet_infos {
      let n = stmt.execute(params![
        p.index,
        p.sector,
        p.max_health,
        p.initial_owner,
        p.position_x,
        p.position_y,
      ])?;
      reference(n > 0);
    }
  }

  {
    let mut stmt = tx.prepare_cached(
      "INSERT INTO planet_regions_info (planet_index, region_index, max_health, region_size)
       VALUES (?1, ?2, ?3, ?4)
       ON CONFLICT (planet_index, region_index) DO NOTHING",
    )?;
    for r in &pass.region_infos {
      let n = stmt.execute(params![r.planet_index, r.region_index, r.max_health, r.region_size])?;
      reference(n > 0);
    }
  }

  {
    let mut define = tx.prepare_cached(
      "INSERT INTO major_orders
         (order_id, title, brief, task_type, target_value, created_at, expires_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
       ON CONFLICT (order_id) DO NOTHING",
    )?;
    let mut progress = tx.prepare_cached(
      "INSERT INTO major_orders_progress
         (timestamp, order_id, current_progress, progress_percentage, expires_in)
       VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for order in &pass.orders {
      let d = &order.definition;
      let n = define.execute(params![
        d.order_id,
        d.title,
        d.brief,
        d.task_type,
        d.target_value,
        encode_ts(d.created_at),
        encode_ts(d.expires_at),
      ])?;
      reference(n > 0);

      let p = &order.progress;
      progress.execute(params![
        at,
        p.order_id,
        p.current_progress,
        p.progress_percentage,
        p.expires_in,
      ])?;
    }
  }

  // ── History samples: unconditional append ─────────────────────────────────

  if let Some(ws) = &pass.war_status {
    tx.execute(
      "INSERT INTO war_status_history
         (timestamp, war_id, war_time, impact_multiplier, total_planets,
          super_earth_planets, enemy_planets, total_players)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      params![
        at,
        ws.war_id,
        ws.war_time,
        ws.impact_multiplier,
        ws.total_planets,
        ws.super_earth_planets,
        ws.enemy_planets,
        ws.total_players,
      ],
    )?;
  }

  {
    let mut stmt = tx.prepare_cached(
      "INSERT INTO planet_status_history
         (timestamp, planet_index, owner, health, players, regen_per_second)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for p in &pass.planet_statuses {
      stmt.execute(params![at, p.planet_index, p.owner, p.health, p.players, p.regen_per_second])?;
    }
  }

  {
    let mut stmt = tx.prepare_cached(
      "INSERT INTO planet_regions_history
         (timestamp, planet_index, region_index, owner, health, regen_per_second,
          is_available, players)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for r in &pass.region_statuses {
      stmt.execute(params![
        at,
        r.planet_index,
        r.region_index,
        r.owner,
        r.health,
        r.regen_per_second,
        r.is_available,
        r.players,
      ])?;
    }
  }

  {
    let mut stmt = tx.prepare_cached(
      "INSERT INTO global_resources_history
         (timestamp, resource_id, current_value, max_value, percentage)
       VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for r in &pass.global_resources {
      stmt.execute(params![at, r.resource_id, r.current_value, r.max_value, r.percentage])?;
    }
  }

  if let Some(s) = &pass.war_stats {
    tx.execute(
      "INSERT INTO war_stats_history
         (timestamp, missions_won, missions_lost, mission_success_rate, bug_kills,
          automaton_kills, illuminate_kills, total_deaths, accuracy)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
      params![
        at,
        s.missions_won,
        s.missions_lost,
        s.mission_success_rate,
        s.bug_kills,
        s.automaton_kills,
        s.illuminate_kills,
        s.total_deaths,
        s.accuracy,
      ],
    )?;
  }

  report.samples_appended = pass.sample_count();

  // ── News: content-diff upsert ─────────────────────────────────────────────

  let mut news = NewsTally { skipped: pass.skipped_news, ..Default::default() };
  for sighting in &pass.news {
    match upsert_news(tx, sighting, at)? {
      NewsOutcome::Inserted => news.inserted += 1,
      NewsOutcome::Updated => news.updated += 1,
      NewsOutcome::Unchanged => news.unchanged += 1,
    }
  }
  if news.inserted > 0 || news.updated > 0 {
    tracing::info!(inserted = news.inserted, updated = news.updated, "news reconciled");
  }
  report.news = news;

  Ok(report)
}

/// Insert a news item, or rewrite it if and only if its message changed.
///
/// The comparison reads the stored message inside the same transaction that
/// performs the update. `stored_at` is written once and never touched again.
fn upsert_news(
  tx:       &Transaction<'_>,
  sighting: &NewsSighting,
  at:       i64,
) -> rusqlite::Result<NewsOutcome> {
  let stored: Option<String> = tx
    .query_row(
      "SELECT message FROM news WHERE news_id = ?1",
      params![sighting.id],
      |row| row.get(0),
    )
    .optional()?;

  let tag_ids = encode_tag_ids(&sighting.tag_ids)?;

  match stored {
    None => {
      tx.execute(
        "INSERT INTO news (news_id, published, type, tag_ids, message, stored_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
          sighting.id,
          sighting.published,
          sighting.kind,
          tag_ids,
          sighting.message,
          at,
        ],
      )?;
      tracing::debug!(news_id = sighting.id, len = sighting.message.len(), "stored news item");
      Ok(NewsOutcome::Inserted)
    }
    Some(previous) if previous != sighting.message => {
      tx.execute(
        "UPDATE news
         SET published = ?2, type = ?3, tag_ids = ?4, message = ?5, updated_at = ?6
         WHERE news_id = ?1",
        params![
          sighting.id,
          sighting.published,
          sighting.kind,
          tag_ids,
          sighting.message,
          at,
        ],
      )?;
      tracing::debug!(
        news_id = sighting.id,
        old_len = previous.len(),
        new_len = sighting.message.len(),
        "updated news item"
      );
      Ok(NewsOutcome::Updated)
    }
    Some(_) => Ok(NewsOutcome::Unchanged),
  }
}
