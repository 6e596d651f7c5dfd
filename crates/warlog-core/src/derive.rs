//! Derived metrics computed once at reconciliation time and stored
//! denormalised alongside the samples they describe.

use crate::record::PlanetStatusSample;

/// The faction id upstream uses for Super Earth.
pub const SUPER_EARTH: i64 = 1;

/// `current / target * 100`, or `0` when there is no positive target.
pub fn progress_percentage(current: i64, target: i64) -> f64 {
  if target > 0 { current as f64 / target as f64 * 100.0 } else { 0.0 }
}

/// `current / max * 100`, or `0` when there is no positive maximum.
pub fn resource_percentage(current: i64, max: i64) -> f64 {
  if max > 0 { current as f64 / max as f64 * 100.0 } else { 0.0 }
}

/// Galaxy-wide control and population totals for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlTally {
  pub total_planets:       i64,
  pub super_earth_planets: i64,
  pub enemy_planets:       i64,
  pub total_players:       i64,
}

impl ControlTally {
  pub fn of(planets: &[PlanetStatusSample]) -> Self {
    let total_planets = planets.len() as i64;
    let super_earth_planets =
      planets.iter().filter(|p| p.owner == SUPER_EARTH).count() as i64;

    Self {
      total_planets,
      super_earth_planets,
      enemy_planets: total_planets - super_earth_planets,
      total_players: planets.iter().map(|p| p.players).sum(),
    }
  }
}
