use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Days, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{require_cron_auth, user_timezone, UserQuery};
use crate::db::{self, AppState};
use crate::error::ApiError;
use crate::models::PlanDay;
use crate::seed::{local_date, seed_plan, SeedRequest, SeedResult};

/// POST /api/plan/seed
///
/// A body that is not JSON is treated as `{}`, which then fails on the
/// missing user id.
pub async fn seed(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<SeedResult>, ApiError> {
  require_cron_auth(&headers, &state.config.cron_secret)?;

  let body: Value = serde_json::from_slice(&body).unwrap_or_else(|_| json!({}));
  let request = SeedRequest::from_json(&body);
  let result = seed_plan(&state.db, &request, state.config.plan_timezone, Utc::now()).await?;
  Ok(Json(result))
}

/// GET /api/plan/today
pub async fn today(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(query): Query<UserQuery>,
) -> Result<Json<PlanDay>, ApiError> {
  require_cron_auth(&headers, &state.config.cron_secret)?;
  let user_id = query.user_id()?;

  let date = local_date(Utc::now(), user_timezone(&state.db, user_id).await?);
  db::load_plan_day(&state.db, user_id, date)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("No plan for {}", date)))
}

/// GET /api/plan/week: today and the six days after it
pub async fn week(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(query): Query<UserQuery>,
) -> Result<Json<Vec<PlanDay>>, ApiError> {
  require_cron_auth(&headers, &state.config.cron_secret)?;
  let user_id = query.user_id()?;

  let from = local_date(Utc::now(), user_timezone(&state.db, user_id).await?);
  let to = from
    .checked_add_days(Days::new(6))
    .ok_or_else(|| ApiError::Validation(format!("Date out of range: {}", from)))?;

  Ok(Json(db::load_plan_days_between(&state.db, user_id, from, to).await?))
}
