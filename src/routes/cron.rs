use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

use super::require_cron_auth;
use crate::db::AppState;
use crate::email::Mailer;
use crate::error::ApiError;
use crate::notify::{send_daily_emails, NotifyResult};
use crate::sync::{sync_all, SyncResult};

/// POST /api/cron/strava-sync
pub async fn strava_sync(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<SyncResult>, ApiError> {
  require_cron_auth(&headers, &state.config.cron_secret)?;

  let result = sync_all(&state.db, &state.config.strava, Utc::now()).await?;
  Ok(Json(result))
}

/// POST /api/cron/daily-email
pub async fn daily_email(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<NotifyResult>, ApiError> {
  require_cron_auth(&headers, &state.config.cron_secret)?;

  let mailer = Mailer::new(&state.config.email);
  let mut rng = StdRng::from_os_rng();
  let result = send_daily_emails(
    &state.db,
    &mailer,
    &state.config.email.from,
    &state.config.app_base_url,
    Utc::now(),
    &mut rng,
  )
  .await?;
  Ok(Json(result))
}
