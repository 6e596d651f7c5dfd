//! Handlers for `/planets` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/planets` | Latest pass grouped by sector; 404 before the first sample |
//! | `GET`  | `/planets/{index}` | 404 if the planet is not catalogued |
//! | `GET`  | `/planets/{index}/history` | `?hours=24&limit=50` |
//! | `GET`  | `/planets/{index}/regions/{region}/history` | `?hours=24&limit=50` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use warlog_core::{
  query::{PlanetDetails, PlanetsBySector},
  record::{PlanetStatusSample, RegionStatusSample},
  store::WarArchive,
};

use crate::{error::ApiError, params::HistoryParams};

const DEFAULT_HOURS: i64 = 24;

/// `GET /planets`
pub async fn by_sector<S: WarArchive>(
  State(store): State<Arc<S>>,
) -> Result<Json<PlanetsBySector>, ApiError> {
  let map = store
    .planets_by_sector()
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("no planet status recorded yet".into()))?;
  Ok(Json(map))
}

/// `GET /planets/{index}`
pub async fn details<S: WarArchive>(
  State(store): State<Arc<S>>,
  Path(index): Path<i64>,
) -> Result<Json<PlanetDetails>, ApiError> {
  let details = store
    .planet_details(index)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("planet {index} not found")))?;
  Ok(Json(details))
}

/// `GET /planets/{index}/history`
pub async fn history<S: WarArchive>(
  State(store): State<Arc<S>>,
  Path(index): Path<i64>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<PlanetStatusSample>>, ApiError> {
  let samples = store
    .planet_history(index, params.window(DEFAULT_HOURS)?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(samples))
}

/// `GET /planets/{index}/regions/{region}/history`
pub async fn region_history<S: WarArchive>(
  State(store): State<Arc<S>>,
  Path((index, region)): Path<(i64, i64)>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<RegionStatusSample>>, ApiError> {
  let samples = store
    .region_history(index, region, params.window(DEFAULT_HOURS)?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(samples))
}
