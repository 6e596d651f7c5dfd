//! Where snapshots come from.

use std::{future::Future, time::Duration};

use anyhow::{Context as _, Result, anyhow};
use reqwest::Client;
use warlog_core::Snapshot;

/// Supplies one decoded snapshot per call.
pub trait SnapshotSource: Send + Sync {
  fn fetch(&self) -> impl Future<Output = Result<Snapshot>> + Send + '_;
}

/// Fetches the snapshot document over HTTP.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpSource {
  client: Client,
  url:    String,
}

impl HttpSource {
  pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, url: url.into() })
  }
}

impl SnapshotSource for HttpSource {
  async fn fetch(&self) -> Result<Snapshot> {
    let resp = self
      .client
      .get(&self.url)
      .send()
      .await
      .with_context(|| format!("GET {} failed", self.url))?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET {} → {}", self.url, resp.status()));
    }
    let body = resp.text().await.context("reading snapshot body")?;
    Snapshot::from_json(&body).context("decoding snapshot")
  }
}

#[cfg(test)]
mod tests {
  use axum::{Json, Router, http::StatusCode, routing::get};
  use serde_json::json;
  use tokio::net::TcpListener;

  use super::*;

  async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  #[tokio::test]
  async fn fetches_and_decodes_the_document() {
    let app = Router::new().route(
      "/snapshot",
      get(|| async { Json(json!({ "warStatus": { "warId": 801 } })) }),
    );
    let base = serve(app).await;

    let source = HttpSource::new(format!("{base}/snapshot"), Duration::from_secs(5)).unwrap();
    let snapshot = source.fetch().await.unwrap();
    assert_eq!(snapshot.object("warStatus").unwrap()["warId"], 801);
  }

  #[tokio::test]
  async fn error_status_is_a_failed_fetch() {
    let app = Router::new().route("/snapshot", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let base = serve(app).await;

    let source = HttpSource::new(format!("{base}/snapshot"), Duration::from_secs(5)).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(err.to_string().contains("503"), "{err}");
  }

  #[tokio::test]
  async fn non_object_body_is_rejected() {
    let app = Router::new().route("/snapshot", get(|| async { Json(json!([1, 2, 3])) }));
    let base = serve(app).await;

    let source = HttpSource::new(format!("{base}/snapshot"), Duration::from_secs(5)).unwrap();
    assert!(source.fetch().await.is_err());
  }
}
