//! Snapshot normaliser: walks a decoded [`Snapshot`] and extracts typed
//! records for each recognised section.
//!
//! Sections are handled independently. A missing or wrong-shaped section
//! yields nothing for that section; missing scalars take their defaults. The
//! only records ever dropped are list entries that are not objects and news
//! items without a usable id.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::{
  derive::{ControlTally, progress_percentage, resource_percentage},
  record::{
    GlobalResourceSample, MajorOrderDefinition, MajorOrderProgressSample,
    NewsSighting, OrderSighting, PlanetInfo, PlanetStatusSample, RegionInfo,
    RegionStatusSample, WarStatsSample, WarStatusSample,
  },
  snapshot::{Lenient as _, Snapshot, as_int},
};

/// Every record extracted from one snapshot, stamped with the pass instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
  pub at:               DateTime<Utc>,
  pub planet_infos:     Vec<PlanetInfo>,
  pub region_infos:     Vec<RegionInfo>,
  pub orders:           Vec<OrderSighting>,
  /// Present iff the snapshot carried a `warStatus` object.
  pub war_status:       Option<WarStatusSample>,
  pub planet_statuses:  Vec<PlanetStatusSample>,
  pub region_statuses:  Vec<RegionStatusSample>,
  pub global_resources: Vec<GlobalResourceSample>,
  /// Present iff the snapshot carried `warStats.galaxy_stats`.
  pub war_stats:        Option<WarStatsSample>,
  pub news:             Vec<NewsSighting>,
  pub skipped_news:     usize,
}

impl Normalized {
  /// Number of history rows this pass will append.
  pub fn sample_count(&self) -> usize {
    self.orders.len()
      + usize::from(self.war_status.is_some())
      + self.planet_statuses.len()
      + self.region_statuses.len()
      + self.global_resources.len()
      + usize::from(self.war_stats.is_some())
  }
}

/// Extract every recognised section of `snapshot`, stamping records with `at`.
pub fn normalize(snapshot: &Snapshot, at: DateTime<Utc>) -> Normalized {
  let mut out = Normalized { at, ..Default::default() };

  if let Some(war_info) = snapshot.object("warInfo") {
    out.planet_infos = objects(war_info.list("planetInfos")).map(planet_info).collect();
    out.region_infos = objects(war_info.list("planetRegions")).map(region_info).collect();
  }

  out.orders = objects(snapshot.array("majorOrders"))
    .map(|order| order_sighting(order, at))
    .collect();

  if let Some(war_status) = snapshot.object("warStatus") {
    out.planet_statuses = objects(war_status.list("planetStatus"))
      .map(|p| planet_status(p, at))
      .collect();
    out.region_statuses = objects(war_status.list("planetRegions"))
      .map(|r| region_status(r, at))
      .collect();
    out.global_resources = objects(war_status.list("globalResources"))
      .map(|r| global_resource(r, at))
      .collect();
    out.war_status = Some(war_status_sample(war_status, &out.planet_statuses, at));
  }

  if let Some(stats) = snapshot
    .object("warStats")
    .and_then(|s| s.object("galaxy_stats"))
  {
    out.war_stats = Some(war_stats(stats, at));
  }

  for item in snapshot.array("news") {
    match news_sighting(item) {
      Some(sighting) => out.news.push(sighting),
      None => out.skipped_news += 1,
    }
  }

  tracing::debug!(
    planets = out.planet_infos.len(),
    regions = out.region_infos.len(),
    orders = out.orders.len(),
    news = out.news.len(),
    skipped_news = out.skipped_news,
    "normalised snapshot"
  );

  out
}

fn objects(list: &[Value]) -> impl Iterator<Item = &Map<String, Value>> {
  list.iter().filter_map(Value::as_object)
}

// ─── warInfo ─────────────────────────────────────────────────────────────────

fn planet_info(p: &Map<String, Value>) -> PlanetInfo {
  let position = p.object("position");
  PlanetInfo {
    index:         p.int("index"),
    sector:        p.int("sector"),
    max_health:    p.int("maxHealth"),
    initial_owner: p.int("initialOwner"),
    position_x:    position.map(|pos| pos.float("x")).unwrap_or(0.0),
    position_y:    position.map(|pos| pos.float("y")).unwrap_or(0.0),
  }
}

fn region_info(r: &Map<String, Value>) -> RegionInfo {
  RegionInfo {
    planet_index: r.int("planetIndex"),
    region_index: r.int("regionIndex"),
    max_health:   r.int("maxHealth"),
    region_size:  r.int("regionSize"),
  }
}

// ─── majorOrders ─────────────────────────────────────────────────────────────

/// Third element of the first task's `values`, or `0`.
fn target_value(setting: Option<&Map<String, Value>>) -> i64 {
  setting
    .map(|s| s.list("tasks"))
    .and_then(<[Value]>::first)
    .and_then(Value::as_object)
    .map(|task| task.list("values"))
    .and_then(|values| values.get(2))
    .and_then(as_int)
    .unwrap_or(0)
}

fn order_sighting(order: &Map<String, Value>, at: DateTime<Utc>) -> OrderSighting {
  let order_id = order.int("id32");
  let setting = order.object("setting");
  let target_value = target_value(setting);
  let expires_in = order.int("expiresIn");
  let current_progress = order
    .list("progress")
    .first()
    .and_then(as_int)
    .unwrap_or(0);

  OrderSighting {
    definition: MajorOrderDefinition {
      order_id,
      title: setting.map(|s| s.text("overrideTitle")).unwrap_or_default(),
      brief: setting.map(|s| s.text("overrideBrief")).unwrap_or_default(),
      task_type: setting.map(|s| s.int("type")).unwrap_or(0),
      target_value,
      created_at: at,
      expires_at: Duration::try_seconds(expires_in)
        .and_then(|d| at.checked_add_signed(d))
        .unwrap_or(at),
    },
    progress:   MajorOrderProgressSample {
      timestamp: at,
      order_id,
      current_progress,
      progress_percentage: progress_percentage(current_progress, target_value),
      expires_in,
    },
  }
}

// ─── warStatus ───────────────────────────────────────────────────────────────

fn war_status_sample(
  war_status: &Map<String, Value>,
  planets:    &[PlanetStatusSample],
  at:         DateTime<Utc>,
) -> WarStatusSample {
  let tally = ControlTally::of(planets);
  WarStatusSample {
    timestamp:           at,
    war_id:              war_status.int("warId"),
    war_time:            war_status.int("time"),
    impact_multiplier:   war_status.float("impactMultiplier"),
    total_planets:       tally.total_planets,
    super_earth_planets: tally.super_earth_planets,
    enemy_planets:       tally.enemy_planets,
    total_players:       tally.total_players,
  }
}

fn planet_status(p: &Map<String, Value>, at: DateTime<Utc>) -> PlanetStatusSample {
  PlanetStatusSample {
    timestamp:        at,
    planet_index:     p.int("index"),
    owner:            p.int("owner"),
    health:           p.int("health"),
    players:          p.int("players"),
    regen_per_second: p.float("regenPerSecond"),
  }
}

fn region_status(r: &Map<String, Value>, at: DateTime<Utc>) -> RegionStatusSample {
  // Upstream spells this field `regerPerSecond` on regions.
  let regen = r
    .get("regerPerSecond")
    .or_else(|| r.get("regenPerSecond"))
    .and_then(Value::as_f64)
    .unwrap_or(0.0);

  RegionStatusSample {
    timestamp:        at,
    planet_index:     r.int("planetIndex"),
    region_index:     r.int("regionIndex"),
    owner:            r.int("owner"),
    health:           r.int("health"),
    regen_per_second: regen,
    is_available:     r.flag("isAvailable"),
    players:          r.int("players"),
  }
}

fn global_resource(r: &Map<String, Value>, at: DateTime<Utc>) -> GlobalResourceSample {
  let current_value = r.int("currentValue");
  let max_value = r.int("maxValue");
  GlobalResourceSample {
    timestamp: at,
    resource_id: r.int("id32"),
    current_value,
    max_value,
    percentage: resource_percentage(current_value, max_value),
  }
}

// ─── warStats ────────────────────────────────────────────────────────────────

fn war_stats(s: &Map<String, Value>, at: DateTime<Utc>) -> WarStatsSample {
  WarStatsSample {
    timestamp:            at,
    missions_won:         s.int("missionsWon"),
    missions_lost:        s.int("missionsLost"),
    mission_success_rate: s.float("missionSuccessRate"),
    bug_kills:            s.int("bugKills"),
    automaton_kills:      s.int("automatonKills"),
    illuminate_kills:     s.int("illuminateKills"),
    total_deaths:         s.int("deaths"),
    accuracy:             s.float("accuracy"),
  }
}

// ─── news ────────────────────────────────────────────────────────────────────

fn news_sighting(item: &Value) -> Option<NewsSighting> {
  let Some(obj) = item.as_object() else {
    tracing::warn!(item = %item, "news item is not an object, skipping");
    return None;
  };
  let Some(id) = obj.opt_int("id") else {
    tracing::warn!(item = %item, "news item has no id, skipping");
    return None;
  };

  let message = match obj.get("message").and_then(Value::as_str) {
    Some(m) => m.to_owned(),
    None => {
      tracing::warn!(news_id = id, "news item has no message, storing empty string");
      String::new()
    }
  };

  Some(NewsSighting {
    id,
    published: obj.int("published"),
    kind: obj.int("type"),
    tag_ids: obj.list("tagIds").iter().filter_map(as_int).collect(),
    message,
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use serde_json::json;

  use super::*;

  fn at() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() }

  #[test]
  fn empty_document_yields_nothing() {
    let n = normalize(&Snapshot::from(json!({})), at());
    assert_eq!(n, Normalized { at: at(), ..Default::default() });
    assert_eq!(n.sample_count(), 0);
  }

  #[test]
  fn planet_info_defaults_missing_position() {
    let snap = Snapshot::from(json!({
      "warInfo": {
        "planetInfos": [
          { "index": 7, "sector": 3, "maxHealth": 1000000, "initialOwner": 1,
            "position": { "x": 0.25, "y": -0.5 } },
          { "index": 8, "sector": null }
        ]
      }
    }));
    let n = normalize(&snap, at());

    assert_eq!(n.planet_infos.len(), 2);
    assert_eq!(n.planet_infos[0].position_x, 0.25);
    assert_eq!(n.planet_infos[0].position_y, -0.5);
    assert_eq!(n.planet_infos[1], PlanetInfo {
      index:         8,
      sector:        0,
      max_health:    0,
      initial_owner: 0,
      position_x:    0.0,
      position_y:    0.0,
    });
    assert!(n.region_infos.is_empty());
  }

  #[test]
  fn major_order_target_and_progress() {
    let snap = Snapshot::from(json!({
      "majorOrders": [{
        "id32": 42,
        "expiresIn": 3600,
        "progress": [250],
        "setting": {
          "overrideTitle": "MAJOR ORDER",
          "overrideBrief": "Hold the line.",
          "type": 4,
          "tasks": [{ "values": [1, 2, 1000] }]
        }
      }]
    }));
    let n = normalize(&snap, at());
    let order = &n.orders[0];

    assert_eq!(order.definition.order_id, 42);
    assert_eq!(order.definition.title, "MAJOR ORDER");
    assert_eq!(order.definition.task_type, 4);
    assert_eq!(order.definition.target_value, 1000);
    assert_eq!(order.definition.created_at, at());
    assert_eq!(order.definition.expires_at, at() + Duration::hours(1));
    assert_eq!(order.progress.current_progress, 250);
    assert_eq!(order.progress.progress_percentage, 25.0);
    assert_eq!(order.progress.expires_in, 3600);
  }

  #[test]
  fn major_order_without_tasks_has_zero_target() {
    let snap = Snapshot::from(json!({
      "majorOrders": [
        { "id32": 1, "progress": [5], "setting": { "tasks": [] } },
        { "id32": 2, "progress": [5], "setting": { "tasks": [{ "values": [1, 2] }] } },
        { "id32": 3 }
      ]
    }));
    let n = normalize(&snap, at());

    for order in &n.orders {
      assert_eq!(order.definition.target_value, 0);
      assert_eq!(order.progress.progress_percentage, 0.0);
    }
    assert_eq!(n.orders[2].progress.current_progress, 0);
    assert_eq!(n.orders[2].definition.title, "");
  }

  #[test]
  fn war_status_derives_control_counts() {
    let snap = Snapshot::from(json!({
      "warStatus": {
        "warId": 801,
        "time": 123456,
        "impactMultiplier": 0.015,
        "planetStatus": [
          { "index": 0, "owner": 1, "players": 100 },
          { "index": 1, "owner": 1, "players": 50 },
          { "index": 2, "owner": 2, "players": 25 }
        ]
      }
    }));
    let n = normalize(&snap, at());
    let ws = n.war_status.unwrap();

    assert_eq!(ws.total_planets, 3);
    assert_eq!(ws.super_earth_planets, 2);
    assert_eq!(ws.enemy_planets, 1);
    assert_eq!(ws.total_players, 175);
    assert_eq!(ws.war_time, 123456);
    assert_eq!(n.planet_statuses.len(), 3);
    assert!(n.planet_statuses.iter().all(|p| p.timestamp == at()));
  }

  #[test]
  fn region_regen_reads_upstream_spelling() {
    let snap = Snapshot::from(json!({
      "warStatus": {
        "planetRegions": [
          { "planetIndex": 5, "regionIndex": 1, "regerPerSecond": 2.5, "isAvailable": true },
          { "planetIndex": 5, "regionIndex": 2, "regenPerSecond": 1.5 }
        ]
      }
    }));
    let n = normalize(&snap, at());

    assert_eq!(n.region_statuses[0].regen_per_second, 2.5);
    assert!(n.region_statuses[0].is_available);
    assert_eq!(n.region_statuses[1].regen_per_second, 1.5);
    assert!(!n.region_statuses[1].is_available);
    // An empty warStatus still yields a war status sample.
    assert_eq!(n.war_status.unwrap().total_planets, 0);
  }

  #[test]
  fn global_resource_percentage() {
    let snap = Snapshot::from(json!({
      "warStatus": {
        "globalResources": [
          { "id32": 9, "currentValue": 30, "maxValue": 120 },
          { "id32": 10, "currentValue": 30 }
        ]
      }
    }));
    let n = normalize(&snap, at());

    assert_eq!(n.global_resources[0].percentage, 25.0);
    assert_eq!(n.global_resources[1].max_value, 0);
    assert_eq!(n.global_resources[1].percentage, 0.0);
  }

  #[test]
  fn war_stats_requires_galaxy_stats() {
    let n = normalize(&Snapshot::from(json!({ "warStats": {} })), at());
    assert!(n.war_stats.is_none());

    let snap = Snapshot::from(json!({
      "warStats": { "galaxy_stats": { "missionsWon": 10, "deaths": 99, "accuracy": 61.5 } }
    }));
    let stats = normalize(&snap, at()).war_stats.unwrap();
    assert_eq!(stats.missions_won, 10);
    assert_eq!(stats.total_deaths, 99);
    assert_eq!(stats.accuracy, 61.5);
    assert_eq!(stats.bug_kills, 0);
  }

  #[test]
  fn news_items_without_id_are_skipped() {
    let snap = Snapshot::from(json!({
      "news": [
        { "id": 5, "message": null },
        { "message": "no id" },
        { "id": "x", "message": "bad id" },
        "not an object",
        { "id": 6, "published": 77, "type": 1, "tagIds": [3, 4], "message": "hello" }
      ]
    }));
    let n = normalize(&snap, at());

    assert_eq!(n.skipped_news, 3);
    assert_eq!(n.news.len(), 2);
    assert_eq!(n.news[0].message, "");
    assert_eq!(n.news[0].tag_ids, Vec::<i64>::new());
    assert_eq!(n.news[1], NewsSighting {
      id:        6,
      published: 77,
      kind:      1,
      tag_ids:   vec![3, 4],
      message:   "hello".into(),
    });
  }
}
