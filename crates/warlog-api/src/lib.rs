//! Read-only JSON API over the warlog archive.
//!
//! Exposes an axum [`Router`] backed by any [`warlog_core::store::WarArchive`].
//! The trait has no write methods, so nothing served here can mutate the
//! store. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", warlog_api::api_router(Arc::new(reader)))
//! ```

pub mod error;
pub mod news;
pub mod orders;
pub mod params;
pub mod planets;
pub mod war;

use std::sync::Arc;

use axum::{Router, routing::get};
use warlog_core::store::WarArchive;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: WarArchive + 'static,
{
  Router::new()
    // War
    .route("/war/status", get(war::status::<S>))
    .route("/war/stats", get(war::stats::<S>))
    .route("/war/resources", get(war::resources::<S>))
    // Planets
    .route("/planets", get(planets::by_sector::<S>))
    .route("/planets/{index}", get(planets::details::<S>))
    .route("/planets/{index}/history", get(planets::history::<S>))
    .route(
      "/planets/{index}/regions/{region}/history",
      get(planets::region_history::<S>),
    )
    // Orders
    .route("/orders", get(orders::active::<S>))
    .route("/orders/{id}/history", get(orders::history::<S>))
    // News
    .route("/news", get(news::list::<S>))
    .route("/news/latest", get(news::latest::<S>))
    .route("/news/types", get(news::types::<S>))
    .route("/news/stats", get(news::stats::<S>))
    .route("/news/{id}", get(news::get_one::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use warlog_core::{Snapshot, store::SnapshotStore};
  use warlog_store_sqlite::SqliteStore;

  use super::api_router;

  async fn seeded() -> Arc<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let snapshot = Snapshot::from(json!({
      "warInfo": {
        "planetInfos": [{ "index": 7, "sector": 3, "maxHealth": 1000000, "initialOwner": 1 }],
        "planetRegions": [{ "planetIndex": 7, "regionIndex": 0, "maxHealth": 5000 }]
      },
      "warStatus": {
        "warId": 801,
        "planetStatus": [{ "index": 7, "owner": 1, "health": 900000, "players": 12 }],
        "planetRegions": [{ "planetIndex": 7, "regionIndex": 0, "owner": 1, "health": 4000 }],
        "globalResources": [{ "id32": 1, "currentValue": 1, "maxValue": 4 }]
      },
      "warStats": { "galaxy_stats": { "missionsWon": 3 } },
      "majorOrders": [{
        "id32": 42, "expiresIn": 3600, "progress": [10],
        "setting": { "overrideTitle": "Hold", "tasks": [{ "values": [0, 0, 100] }] }
      }],
      "news": [
        { "id": 1, "published": 10, "type": 0, "message": "first" },
        { "id": 2, "published": 20, "type": 1, "message": "second" }
      ]
    }));
    store.reconcile(snapshot).await.unwrap();
    Arc::new(store)
  }

  async fn get(store: Arc<SqliteStore>, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = api_router(store).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
  }

  // ── War ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn war_trends_include_the_latest_pass() {
    let store = seeded().await;

    let (status, body) = get(store.clone(), "/war/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["super_earth_planets"], 1);

    let (_, stats) = get(store.clone(), "/war/stats?hours=1").await;
    assert_eq!(stats[0]["missions_won"], 3);

    let (_, resources) = get(store, "/war/resources").await;
    assert_eq!(resources[0]["percentage"], 25.0);
  }

  #[tokio::test]
  async fn out_of_range_hours_is_bad_request() {
    let store = seeded().await;
    for uri in ["/war/status?hours=0", "/war/status?hours=9223372036854775807"] {
      let (status, body) = get(store.clone(), uri).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
      assert!(body["error"].as_str().unwrap().contains("hours"));
    }
  }

  #[tokio::test]
  async fn huge_news_offset_is_an_empty_page() {
    let store = seeded().await;
    let (status, page) = get(store.clone(), "/news?offset=18446744073709551615").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"], json!([]));
    assert_eq!(page["has_more"], false);

    let (status, _) = get(store, "/news/latest").await;
    assert_eq!(status, StatusCode::OK);
  }

  // ── Planets ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn planets_before_any_sample_is_404() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let (status, _) = get(store, "/planets").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn planets_grouped_by_sector() {
    let (status, body) = get(seeded().await, "/planets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["sectors"]["3"][0]["status"]["health"], 900000);
  }

  #[tokio::test]
  async fn planet_details_and_history() {
    let store = seeded().await;

    let (status, body) = get(store.clone(), "/planets/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["sector"], 3);
    assert_eq!(body["regions"].as_array().unwrap().len(), 1);

    let (status, body) = get(store.clone(), "/planets/7/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = get(store, "/planets/7/regions/0/history").await;
    assert_eq!(body[0]["health"], 4000);
  }

  #[tokio::test]
  async fn unknown_planet_is_404_but_its_history_is_empty() {
    let store = seeded().await;

    let (status, body) = get(store.clone(), "/planets/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "planet 99 not found");

    let (status, body) = get(store, "/planets/99/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  // ── Orders ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn orders_active_and_history() {
    let store = seeded().await;

    let (status, body) = get(store.clone(), "/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["definition"]["title"], "Hold");
    assert_eq!(body[0]["latest"]["progress_percentage"], 10.0);
    assert_eq!(body[0]["is_active"], true);

    let (status, body) = get(store.clone(), "/orders/42/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"].as_array().unwrap().len(), 1);

    let (status, _) = get(store, "/orders/43/history").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── News ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn news_listing_and_lookup() {
    let store = seeded().await;

    let (status, page) = get(store.clone(), "/news?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_count"], 2);
    assert_eq!(page["has_more"], true);
    assert_eq!(page["items"][0]["id"], 2);

    let (_, page) = get(store.clone(), "/news?type=0").await;
    assert_eq!(page["total_count"], 1);
    assert_eq!(page["items"][0]["type"], 0);

    let (_, latest) = get(store.clone(), "/news/latest").await;
    assert_eq!(latest.as_array().unwrap().len(), 2);

    let (_, types) = get(store.clone(), "/news/types").await;
    assert_eq!(types, json!([{ "type": 0, "count": 1 }, { "type": 1, "count": 1 }]));

    let (_, stats) = get(store.clone(), "/news/stats").await;
    assert_eq!(stats["total_count"], 2);
    assert_eq!(stats["recent_count"], 2);
    assert_eq!(stats["latest_published"], 20);

    let (status, item) = get(store.clone(), "/news/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["message"], "first");

    let (status, _) = get(store.clone(), "/news/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(store, "/news/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
