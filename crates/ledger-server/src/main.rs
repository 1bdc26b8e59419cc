//! Ledger server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured event store, and serves the JSON API over HTTP.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use ledger_core::store::EventStore;
use ledger_store_fs::FsStore;
use ledger_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{Backend, ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "Event-sourced account ledger")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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
  let cfg = ServerConfig::load(&cli.config)?;
  let path = &cfg.store.path;

  match cfg.store.backend {
    Backend::Fs => {
      let store = FsStore::open(path)
        .await
        .with_context(|| format!("failed to open event directory {path:?}"))?;
      serve(store, &cfg).await
    }
    Backend::Sqlite => {
      let store = SqliteStore::open(path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      serve(store, &cfg).await
    }
  }
}

async fn serve<S>(store: S, cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: EventStore + 'static,
{
  let app = ledger_api::router(Arc::new(store)).layer(TraceLayer::new_for_http());
  let address = cfg.address();

  tracing::info!(backend = ?cfg.store.backend, store = ?cfg.store.path, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
