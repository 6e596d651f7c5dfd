//! warlog binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and runs the ingest loop, the read-only HTTP API, or both.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::{Parser, Subcommand};
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use warlog_monitor::{HttpSource, MonitorConfig, Scheduler, stop_channel};
use warlog_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Galactic war status recorder")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Command {
  /// Only poll the upstream API and record snapshots.
  Monitor,
  /// Only serve the read-only HTTP API.
  Web,
  /// Poll and serve side by side.
  #[default]
  All,
  /// Fetch and record a single snapshot, then exit.
  Once,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = MonitorConfig::load(&cli.config)?;

  match cli.command.unwrap_or_default() {
    Command::Once => once(&cfg).await,
    Command::Monitor => {
      let (stop_tx, stop) = stop_channel();
      spawn_shutdown_listener(stop_tx);
      monitor(&cfg, stop).await
    }
    Command::Web => {
      let (stop_tx, stop) = stop_channel();
      spawn_shutdown_listener(stop_tx);
      let reader = open_reader(&cfg).await?;
      serve(reader, &cfg, stop).await
    }
    Command::All => {
      let (stop_tx, stop) = stop_channel();
      spawn_shutdown_listener(stop_tx);

      let writer = open_writer(&cfg).await?;
      let reader = open_reader(&cfg).await?;
      tracing::info!("web interface on http://{}", cfg.address());

      let web_cfg = cfg.clone();
      let web_stop = stop.clone();
      let web = tokio::spawn(async move { serve(reader, &web_cfg, web_stop).await });

      let source = HttpSource::new(cfg.api_url.clone(), cfg.request_timeout())?;
      Scheduler::new(source, writer, cfg.poll_interval(), cfg.error_backoff(), stop)
        .run()
        .await
        .context("monitor failed")?;

      web.await.context("web task panicked")?
    }
  }
}

async fn open_writer(cfg: &MonitorConfig) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))
}

async fn open_reader(cfg: &MonitorConfig) -> anyhow::Result<SqliteStore> {
  SqliteStore::open_read_only_or_create(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store read-only at {:?}", cfg.store_path))
}

async fn once(cfg: &MonitorConfig) -> anyhow::Result<()> {
  let store = open_writer(cfg).await?;
  let source = HttpSource::new(cfg.api_url.clone(), cfg.request_timeout())?;
  let (_stop_tx, stop) = stop_channel();

  let scheduler = Scheduler::new(source, store.clone(), cfg.poll_interval(), cfg.error_backoff(), stop);
  let report = scheduler.run_once().await?;
  tracing::info!(
    timestamp = %report.timestamp,
    samples = report.samples_appended,
    news_inserted = report.news.inserted,
    news_updated = report.news.updated,
    "single pass complete"
  );

  store.close().await.context("failed to close store")
}

async fn monitor(cfg: &MonitorConfig, stop: watch::Receiver<bool>) -> anyhow::Result<()> {
  let store = open_writer(cfg).await?;
  let source = HttpSource::new(cfg.api_url.clone(), cfg.request_timeout())?;
  Scheduler::new(source, store, cfg.poll_interval(), cfg.error_backoff(), stop)
    .run()
    .await
    .context("monitor failed")
}

async fn serve(
  store: SqliteStore,
  cfg: &MonitorConfig,
  mut stop: watch::Receiver<bool>,
) -> anyhow::Result<()> {
  let app = Router::new()
    .nest("/api", warlog_api::api_router(Arc::new(store)))
    .layer(TraceLayer::new_for_http());

  let address = cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(async move {
      // A closed channel also means shutdown.
      let _ = stop.wait_for(|stopped| *stopped).await;
    })
    .await
    .context("server error")
}

/// Flip the stop flag on Ctrl-C or, on Unix, SIGTERM.
fn spawn_shutdown_listener(stop: watch::Sender<bool>) {
  tokio::spawn(async move {
    shutdown_signal().await;
    tracing::info!("shutdown requested; finishing the current pass");
    let _ = stop.send(true);
  });
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "cannot listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "cannot listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {}
    _ = terminate => {}
  }
}
