//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock configuration pointed at a mockito server
//! - Mock data factories

use crate::config::AppConfig;
use crate::email::EmailConfig;
use crate::models::plan::PlanPayload;
use crate::models::{NewProfile, Profile};
use crate::plan::{build_week, WeekIndex};
use crate::strava::{StravaActivity, StravaConfig, StravaTokens};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) so every query sees the same in-memory database
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Mock Configuration
/// ---------------------------------------------------------------------------

/// Strava config with every endpoint on `base_url`
pub fn mock_strava_config(base_url: &str) -> StravaConfig {
  StravaConfig {
    client_id: "12345".into(),
    client_secret: "strava-secret".into(),
    redirect_uri: "https://coach.example.com/api/strava/callback".into(),
    auth_url: String::new(),
    token_url: String::new(),
    api_base: String::new(),
  }
  .with_base_url(base_url)
}

/// Resend config posting to `{base_url}/emails`
pub fn mock_email_config(base_url: &str) -> EmailConfig {
  EmailConfig {
    api_key: "re_test".into(),
    from: "coach@example.com".into(),
    api_url: format!("{}/emails", base_url.trim_end_matches('/')),
  }
}

/// Full app config; both Strava and Resend point at `base_url`
pub fn mock_app_config(base_url: &str) -> AppConfig {
  AppConfig {
    cron_secret: "test-secret".into(),
    app_base_url: "https://coach.example.com".into(),
    database_url: "sqlite::memory:".into(),
    bind_addr: "127.0.0.1:0".into(),
    plan_timezone: chrono_tz::America::Phoenix,
    strava: mock_strava_config(base_url),
    email: mock_email_config(base_url),
  }
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn mock_tokens(expires_at: DateTime<Utc>) -> StravaTokens {
  StravaTokens {
    access_token: "access-token".into(),
    refresh_token: "refresh-token".into(),
    expires_at,
    athlete_id: None,
  }
}

pub fn mock_profile(user_id: &str, email: Option<&str>, timezone: Option<&str>) -> NewProfile {
  NewProfile {
    user_id: user_id.into(),
    email: email.map(String::from),
    timezone: timezone.map(String::from),
    email_time_local: None,
  }
}

/// A profile as it would come back from the database
pub fn mock_stored_profile(user_id: &str, email: Option<&str>, timezone: Option<&str>) -> Profile {
  Profile {
    id: user_id.into(),
    email: email.map(String::from),
    timezone: timezone.map(String::from),
    email_time_local: None,
    updated_at: Some(Utc::now()),
  }
}

pub fn mock_strava_activity(id: i64) -> StravaActivity {
  StravaActivity {
    id,
    name: format!("Run {}", id),
    activity_type: "Run".into(),
    start_date: Utc.with_ymd_and_hms(2024, 1, 2, 14, 0, 0).unwrap(),
    moving_time: Some(3600),
    distance: Some(9656.1),
    total_elevation_gain: Some(120.0),
  }
}

/// Week 1 Monday, without routine details
pub fn mock_plan_payload() -> PlanPayload {
  let week = WeekIndex::new(0).expect("week 0 exists");
  let [monday, ..] = build_week(week);
  PlanPayload {
    day: monday,
    strength_details: None,
    mobility_details: None,
    week_index: week.number(),
  }
}
