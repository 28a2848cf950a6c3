//! Strava activity sync
//!
//! Walks every stored credential, refreshes the ones about to expire and
//! upserts the latest activities. One user's failure never stops the others;
//! the next scheduled run is the retry.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{self, DbPool};
use crate::strava::{fetch_activities, refresh_tokens, StravaConfig, StravaError, StravaTokens};

const ACTIVITIES_PER_SYNC: u32 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
  pub ok: bool,
  pub inserted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// Per-user failure; logged and skipped
#[derive(Debug, thiserror::Error)]
enum UserSyncError {
  #[error("token refresh failed: {0}")]
  Refresh(StravaError),

  #[error("saving refreshed tokens failed: {0}")]
  SaveTokens(sqlx::Error),

  #[error("activity fetch failed: {0}")]
  Fetch(StravaError),
}

/// Return tokens valid at `now`, refreshing and persisting them when needed
async fn ensure_fresh_tokens(
  db: &DbPool,
  config: &StravaConfig,
  user_id: &str,
  tokens: StravaTokens,
  now: DateTime<Utc>,
) -> Result<StravaTokens, UserSyncError> {
  if !tokens.needs_refresh_at(now) {
    return Ok(tokens);
  }

  let mut refreshed = refresh_tokens(config, &tokens.refresh_token)
    .await
    .map_err(UserSyncError::Refresh)?;
  refreshed.athlete_id = refreshed.athlete_id.or(tokens.athlete_id);

  db::save_tokens(db, user_id, &refreshed)
    .await
    .map_err(UserSyncError::SaveTokens)?;

  tracing::debug!(user_id, "Strava tokens refreshed");
  Ok(refreshed)
}

async fn sync_user(
  db: &DbPool,
  config: &StravaConfig,
  user_id: &str,
  tokens: StravaTokens,
  now: DateTime<Utc>,
) -> Result<usize, UserSyncError> {
  let tokens = ensure_fresh_tokens(db, config, user_id, tokens, now).await?;

  let activities = fetch_activities(config, &tokens.access_token, ACTIVITIES_PER_SYNC)
    .await
    .map_err(UserSyncError::Fetch)?;

  let mut written = 0;
  for (activity, raw) in &activities {
    match db::upsert_activity(db, user_id, activity, raw).await {
      Ok(()) => written += 1,
      Err(e) => tracing::warn!(user_id, activity_id = activity.id, "Failed to save activity: {}", e),
    }
  }

  Ok(written)
}

/// Sync every connected user; returns the number of activity rows written
pub async fn sync_all(
  db: &DbPool,
  config: &StravaConfig,
  now: DateTime<Utc>,
) -> Result<SyncResult, SyncError> {
  let credentials = db::load_all_tokens(db).await?;
  let users = credentials.len();

  let mut inserted = 0;
  for (user_id, tokens) in credentials {
    match sync_user(db, config, &user_id, tokens, now).await {
      Ok(written) => inserted += written,
      Err(e) => tracing::error!(user_id = %user_id, "Skipping Strava sync: {}", e),
    }
  }

  tracing::info!(users, inserted, "Strava sync complete");

  Ok(SyncResult { ok: true, inserted })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
