mod cache;
mod config;
mod github;
mod server;
mod stats;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "repostats")]
#[command(about = "Repository activity statistics service")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/repostats/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Bind address override, e.g. 127.0.0.1:8080
  #[arg(short, long)]
  bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| "repostats=info,tower_http=info".into()),
    ))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let args = Args::parse();
  let config = config::Config::load(args.config.as_deref())?;
  let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());

  let storage = cache::SqliteStorage::open(config.cache.path.as_deref())?;
  let day_cache = cache::DayCache::new(
    storage,
    config.cache.namespace.clone(),
    config.cache.ttl_secs,
  );
  let client = github::GitHubClient::new(&config.github)?;
  let service = stats::StatsService::new(client, day_cache);

  let app = server::router(server::AppState {
    service: Arc::new(service),
  });

  let listener = tokio::net::TcpListener::bind(&bind).await?;
  tracing::info!("repostats listening on {}", bind);

  axum::serve(listener, app).await?;

  Ok(())
}
