//! Handlers for `/news` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/news` | `?type=<n>&limit=20&offset=0`, limit capped at 100 |
//! | `GET`  | `/news/latest` | `?limit=10`, capped at 50 |
//! | `GET`  | `/news/types` | Count per type |
//! | `GET`  | `/news/stats` | Totals; `recent_count` covers the last 24 hours |
//! | `GET`  | `/news/{id}` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use warlog_core::{
  query::{NewsPage, NewsQuery, NewsStats, NewsTypeCount},
  record::NewsItem,
  store::WarArchive,
};

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(rename = "type")]
  pub kind:   Option<i64>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /news[?type=<n>&limit=<n>&offset=<n>]`
pub async fn list<S: WarArchive>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<NewsPage>, ApiError> {
  let query = NewsQuery {
    kind:   params.kind,
    limit:  params.limit.unwrap_or(NewsQuery::DEFAULT_LIMIT),
    offset: params.offset.unwrap_or(0),
  };
  let page = store.news(query).await.map_err(ApiError::store)?;
  Ok(Json(page))
}

// ─── Latest ──────────────────────────────────────────────────────────────────

const LATEST_DEFAULT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct LatestParams {
  pub limit: Option<usize>,
}

/// `GET /news/latest[?limit=<n>]`
pub async fn latest<S: WarArchive>(
  State(store): State<Arc<S>>,
  Query(params): Query<LatestParams>,
) -> Result<Json<Vec<NewsItem>>, ApiError> {
  let items = store
    .latest_news(params.limit.unwrap_or(LATEST_DEFAULT))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// `GET /news/types`
pub async fn types<S: WarArchive>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<NewsTypeCount>>, ApiError> {
  let counts = store.news_types().await.map_err(ApiError::store)?;
  Ok(Json(counts))
}

/// `GET /news/stats`
pub async fn stats<S: WarArchive>(
  State(store): State<Arc<S>>,
) -> Result<Json<NewsStats>, ApiError> {
  let since = Utc::now() - Duration::hours(24);
  let stats = store.news_stats(since).await.map_err(ApiError::store)?;
  Ok(Json(stats))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /news/{id}`
pub async fn get_one<S: WarArchive>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<NewsItem>, ApiError> {
  let item = store
    .news_item(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("news item {id} not found")))?;
  Ok(Json(item))
}
