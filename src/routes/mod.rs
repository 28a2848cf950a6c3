//! HTTP surface
//!
//! Thin handlers over the seeder, sync job and notifier. Every handler takes
//! the shared `AppState`; business logic never touches the request types.

pub mod activities;
pub mod cron;
pub mod plan;
pub mod profile;
pub mod strava;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::{self, AppState, DbPool};
use crate::error::ApiError;
use crate::notify::profile_timezone;

pub fn build_router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/api/plan/seed", post(plan::seed))
    .route("/api/plan/today", get(plan::today))
    .route("/api/plan/week", get(plan::week))
    .route("/api/cron/strava-sync", post(cron::strava_sync))
    .route("/api/cron/daily-email", post(cron::daily_email))
    .route("/api/strava/connect", get(strava::connect))
    .route("/api/strava/callback", get(strava::callback))
    .route("/api/profile", post(profile::upsert))
    .route("/api/activities", get(activities::recent))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> Json<Value> {
  Json(json!({ "ok": true }))
}

/// Accept only `Authorization: Bearer <secret>` with a non-empty secret
pub fn require_cron_auth(headers: &HeaderMap, secret: &str) -> Result<(), ApiError> {
  let token = headers
    .get(AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .unwrap_or("");

  if token.is_empty() || token != secret {
    tracing::warn!("Rejected request with missing or bad bearer token");
    return Err(ApiError::Unauthorized);
  }
  Ok(())
}

/// `?user_id=` query shared by the per-user read endpoints
#[derive(Debug, Deserialize)]
pub struct UserQuery {
  pub user_id: Option<String>,
}

impl UserQuery {
  pub fn user_id(&self) -> Result<&str, ApiError> {
    self
      .user_id
      .as_deref()
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .ok_or_else(|| ApiError::Validation("Missing user_id".into()))
  }
}

/// The user's zone from their profile, UTC when there is none
pub(crate) async fn user_timezone(db: &DbPool, user_id: &str) -> Result<Tz, ApiError> {
  Ok(
    db::load_profile(db, user_id)
      .await?
      .map(|profile| profile_timezone(&profile))
      .unwrap_or(Tz::UTC),
  )
}
