//! Sahaya server binary.
//!
//! Loads configuration from `config.toml` (override with `--config`), opens
//! the SQLite store, and serves the JSON API under `/api`.
//!
//! Every setting can also be supplied through the environment with a
//! `SAHAYA_` prefix, e.g. `SAHAYA_PORT=9000`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use sahaya_api::ApiState;
use sahaya_core::matching::MatchPolicy;
use sahaya_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sahaya scribe-matching server")]
struct Cli {
  /// TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:       String,
  #[serde(default = "default_port")]
  port:       u16,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
  /// Scoring weights and ranking cutoff; omitted sections fall back to the
  /// built-in policy.
  #[serde(default)]
  matching:   MatchPolicy,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("sahaya.db") }

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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SAHAYA"))
    .build()
    .context("could not read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("invalid configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("could not open store at {store_path:?}"))?;

  let state = ApiState {
    store:  Arc::new(store),
    policy: Arc::new(server_cfg.matching.clone()),
  };

  let app = Router::new()
    .nest("/api", sahaya_api::api_router(state))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("could not bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Resolve a leading `~/` against `$HOME`.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
