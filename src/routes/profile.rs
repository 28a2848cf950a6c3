use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;
use std::sync::Arc;

use super::require_cron_auth;
use crate::db::{self, AppState};
use crate::error::ApiError;
use crate::models::{NewProfile, Profile};

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
  pub user_id: Option<String>,
  pub email: Option<String>,
  pub timezone: Option<String>,
  pub email_time_local: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ProfileRequest {
  fn validate(self) -> Result<NewProfile, ApiError> {
    let user_id = non_empty(self.user_id).ok_or_else(|| ApiError::Validation("Missing user_id".into()))?;

    let timezone = non_empty(self.timezone);
    if let Some(tz) = &timezone {
      tz.parse::<Tz>()
        .map_err(|_| ApiError::Validation(format!("Unknown timezone: {}", tz)))?;
    }

    let email_time_local = non_empty(self.email_time_local);
    if let Some(time) = &email_time_local {
      NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| ApiError::Validation(format!("Invalid email_time_local: {}", time)))?;
    }

    Ok(NewProfile {
      user_id,
      email: non_empty(self.email),
      timezone,
      email_time_local,
    })
  }
}

/// POST /api/profile
pub async fn upsert(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(request): Json<ProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
  require_cron_auth(&headers, &state.config.cron_secret)?;

  let profile = request.validate()?;
  db::upsert_profile(&state.db, &profile).await?;

  db::load_profile(&state.db, &profile.user_id)
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::Upstream("Profile vanished after upsert".into()))
}
