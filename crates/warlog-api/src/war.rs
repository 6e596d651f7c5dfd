//! Handlers for galaxy-wide trends.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/war/status` | `?hours=24&limit=50` |
//! | `GET`  | `/war/stats` | `?hours=24&limit=50` |
//! | `GET`  | `/war/resources` | `?hours=24&limit=50` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use warlog_core::{
  record::{GlobalResourceSample, WarStatsSample, WarStatusSample},
  store::WarArchive,
};

use crate::{error::ApiError, params::HistoryParams};

const DEFAULT_HOURS: i64 = 24;

/// `GET /war/status`
pub async fn status<S: WarArchive>(
  State(store): State<Arc<S>>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<WarStatusSample>>, ApiError> {
  let samples = store
    .war_status_trend(params.window(DEFAULT_HOURS)?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(samples))
}

/// `GET /war/stats`
pub async fn stats<S: WarArchive>(
  State(store): State<Arc<S>>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<WarStatsSample>>, ApiError> {
  let samples = store
    .war_stats_trend(params.window(DEFAULT_HOURS)?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(samples))
}

/// `GET /war/resources`
pub async fn resources<S: WarArchive>(
  State(store): State<Arc<S>>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<GlobalResourceSample>>, ApiError> {
  let samples = store
    .global_resources_trend(params.window(DEFAULT_HOURS)?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(samples))
}
