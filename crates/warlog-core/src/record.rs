//! Typed records persisted by the reconciler.
//!
//! Three kinds of entity exist:
//!
//! - **Reference** rows ([`PlanetInfo`], [`RegionInfo`],
//!   [`MajorOrderDefinition`]) are keyed by a natural identifier. The first
//!   observed value for a key is permanent; later sightings are ignored even
//!   when upstream corrects itself.
//! - **History samples** are appended once per pass and never touched again.
//!   Every sample written by one pass carries that pass's timestamp.
//! - [`NewsItem`] is the single mutable entity, updated only when its message
//!   text changes.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};

/// The capture instant for a new reconciliation pass.
///
/// Truncated to whole seconds, which is the resolution the store keeps.
pub fn pass_timestamp() -> DateTime<Utc> { Utc::now().trunc_subsecs(0) }

// ─── Reference entities ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetInfo {
  pub index:         i64,
  pub sector:        i64,
  pub max_health:    i64,
  pub initial_owner: i64,
  pub position_x:    f64,
  pub position_y:    f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
  pub planet_index: i64,
  pub region_index: i64,
  pub max_health:   i64,
  pub region_size:  i64,
}

/// A major order as first seen. `expires_at` is derived from the
/// `expiresIn` countdown at that first sighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorOrderDefinition {
  pub order_id:     i64,
  pub title:        String,
  pub brief:        String,
  pub task_type:    i64,
  pub target_value: i64,
  pub created_at:   DateTime<Utc>,
  pub expires_at:   DateTime<Utc>,
}

// ─── History samples ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarStatusSample {
  pub timestamp:           DateTime<Utc>,
  pub war_id:              i64,
  pub war_time:            i64,
  pub impact_multiplier:   f64,
  pub total_planets:       i64,
  /// Planets whose owner is faction `1`.
  pub super_earth_planets: i64,
  pub enemy_planets:       i64,
  pub total_players:       i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetStatusSample {
  pub timestamp:        DateTime<Utc>,
  pub planet_index:     i64,
  pub owner:            i64,
  pub health:           i64,
  pub players:          i64,
  pub regen_per_second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStatusSample {
  pub timestamp:        DateTime<Utc>,
  pub planet_index:     i64,
  pub region_index:     i64,
  pub owner:            i64,
  pub health:           i64,
  pub regen_per_second: f64,
  pub is_available:     bool,
  pub players:          i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarStatsSample {
  pub timestamp:            DateTime<Utc>,
  pub missions_won:         i64,
  pub missions_lost:        i64,
  pub mission_success_rate: f64,
  pub bug_kills:            i64,
  pub automaton_kills:      i64,
  pub illuminate_kills:     i64,
  pub total_deaths:         i64,
  pub accuracy:             f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalResourceSample {
  pub timestamp:     DateTime<Utc>,
  pub resource_id:   i64,
  pub current_value: i64,
  pub max_value:     i64,
  pub percentage:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorOrderProgressSample {
  pub timestamp:           DateTime<Utc>,
  pub order_id:            i64,
  pub current_progress:    i64,
  pub progress_percentage: f64,
  pub expires_in:          i64,
}

// ─── News ────────────────────────────────────────────────────────────────────

/// A dispatch as it appears in one snapshot, before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSighting {
  pub id:        i64,
  pub published: i64,
  #[serde(rename = "type")]
  pub kind:      i64,
  pub tag_ids:   Vec<i64>,
  pub message:   String,
}

/// A stored dispatch.
///
/// `stored_at` is the pass that first saw the item and never changes.
/// `updated_at` moves only when a later pass carries a different message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
  pub id:         i64,
  pub published:  i64,
  #[serde(rename = "type")]
  pub kind:       i64,
  pub tag_ids:    Vec<i64>,
  pub message:    String,
  pub stored_at:  DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A major order sighting: the reference row to insert if absent, plus the
/// progress sample to append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSighting {
  pub definition: MajorOrderDefinition,
  pub progress:   MajorOrderProgressSample,
}

// ─── Pass report ─────────────────────────────────────────────────────────────

/// Outcome of the news section of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsTally {
  pub inserted:  usize,
  pub updated:   usize,
  pub unchanged: usize,
  /// Items dropped by the normaliser (no usable id).
  pub skipped:   usize,
}

/// What one committed reconciliation pass wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
  pub timestamp:          DateTime<Utc>,
  pub reference_inserted: usize,
  /// Reference sightings whose key already existed.
  pub reference_ignored:  usize,
  pub samples_appended:   usize,
  pub news:               NewsTally,
}
