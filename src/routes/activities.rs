use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;

use super::{require_cron_auth, UserQuery};
use crate::db::{self, AppState};
use crate::error::ApiError;
use crate::models::Activity;

const RECENT_ACTIVITY_LIMIT: i64 = 50;

/// GET /api/activities: most recent synced activities, newest first
pub async fn recent(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Activity>>, ApiError> {
  require_cron_auth(&headers, &state.config.cron_secret)?;
  let user_id = query.user_id()?;

  let activities = db::load_recent_activities(&state.db, user_id, RECENT_ACTIVITY_LIMIT).await?;
  Ok(Json(activities))
}
