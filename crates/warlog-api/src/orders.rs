//! Handlers for `/orders` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::Utc;
use warlog_core::{
  query::{OrderHistory, OrderSummary},
  store::WarArchive,
};

use crate::{error::ApiError, params::HistoryParams};

/// Default look-back for order history.
const DEFAULT_HOURS: i64 = 48;

/// `GET /orders` — orders still counting down, newest first, each flagged
/// `is_active` if polling saw it recently.
pub async fn active<S: WarArchive>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<OrderSummary>>, ApiError> {
  let orders = store.active_orders(Utc::now()).await.map_err(ApiError::store)?;
  Ok(Json(orders))
}

/// `GET /orders/{id}/history[?hours=48&limit=50]`
pub async fn history<S: WarArchive>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<OrderHistory>, ApiError> {
  let history = store
    .order_history(id, params.window(DEFAULT_HOURS)?)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("major order {id} not found")))?;
  Ok(Json(history))
}
