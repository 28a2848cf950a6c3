pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod notify;
pub mod plan;
pub mod routes;
pub mod seed;
pub mod strava;
pub mod sync;

#[cfg(test)]
mod test_utils;

use config::AppConfig;
use db::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "ultra_coach=info,tower_http=info";

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    )
    .init();

  let config = AppConfig::from_env()?;
  let pool = db::initialize_db(&config.database_url).await?;

  let bind_addr = config.bind_addr.clone();
  let state = Arc::new(AppState { db: pool, config });
  let app = routes::build_router(state);

  let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
  tracing::info!("Listening on {}", bind_addr);
  axum::serve(listener, app).await?;

  Ok(())
}
