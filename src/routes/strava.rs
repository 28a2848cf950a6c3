use axum::extract::{Query, State};
use axum::response::Redirect;
use serde::Deserialize;
use std::sync::Arc;

use super::UserQuery;
use crate::db::{self, AppState};
use crate::error::ApiError;
use crate::strava::{build_auth_url, exchange_code_for_tokens};

/// GET /api/strava/connect: send the user to Strava's consent screen.
/// The user id travels in `state` and comes back on the callback.
pub async fn connect(
  State(state): State<Arc<AppState>>,
  Query(query): Query<UserQuery>,
) -> Result<Redirect, ApiError> {
  let user_id = query.user_id()?;
  let url = build_auth_url(&state.config.strava, user_id)?;
  Ok(Redirect::to(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
  pub code: Option<String>,
  pub state: Option<String>,
  pub error: Option<String>,
}

/// GET /api/strava/callback
pub async fn callback(
  State(state): State<Arc<AppState>>,
  Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
  if let Some(error) = query.error.filter(|e| !e.is_empty()) {
    return Err(ApiError::Validation(error));
  }
  let code = query
    .code
    .filter(|c| !c.is_empty())
    .ok_or_else(|| ApiError::Validation("Missing code".into()))?;
  let user_id = query
    .state
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ApiError::Validation("Missing state(userId)".into()))?;

  let tokens = exchange_code_for_tokens(&state.config.strava, &code).await?;
  db::save_tokens(&state.db, &user_id, &tokens).await?;

  tracing::info!(user_id = %user_id, athlete_id = ?tokens.athlete_id, "Strava connected");

  Ok(Redirect::to(&format!(
    "{}/settings?strava=connected",
    state.config.app_base_url
  )))
}
