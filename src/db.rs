use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::config::AppConfig;
use crate::models::{Activity, NewProfile, PlanDay, PlanDayRow, PlanPayload, Profile};
use crate::strava::{StravaActivity, StravaTokens};

pub type DbPool = SqlitePool;

/// Application state shared by every request handler
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(database_url: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
  tracing::info!("Initializing database at: {}", database_url);

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect(database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!("Database initialized successfully");

  Ok(pool)
}

/// ---------------------------------------------------------------------------
/// Profiles
/// ---------------------------------------------------------------------------

pub async fn load_profiles(db: &DbPool) -> Result<Vec<Profile>, sqlx::Error> {
  sqlx::query_as::<_, Profile>(
    "SELECT id, email, timezone, email_time_local, updated_at FROM profiles ORDER BY id",
  )
  .fetch_all(db)
  .await
}

pub async fn load_profile(db: &DbPool, user_id: &str) -> Result<Option<Profile>, sqlx::Error> {
  sqlx::query_as::<_, Profile>(
    "SELECT id, email, timezone, email_time_local, updated_at FROM profiles WHERE id = ?1",
  )
  .bind(user_id)
  .fetch_optional(db)
  .await
}

pub async fn upsert_profile(db: &DbPool, profile: &NewProfile) -> Result<(), sqlx::Error> {
  sqlx::query(
    r#"
    INSERT INTO profiles (id, email, timezone, email_time_local, updated_at)
    VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
    ON CONFLICT(id) DO UPDATE SET
      email = excluded.email,
      timezone = excluded.timezone,
      email_time_local = excluded.email_time_local,
      updated_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(&profile.user_id)
  .bind(&profile.email)
  .bind(&profile.timezone)
  .bind(&profile.email_time_local)
  .execute(db)
  .await?;

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Strava Tokens
/// ---------------------------------------------------------------------------

/// Upsert the credential for one user
pub async fn save_tokens(db: &DbPool, user_id: &str, tokens: &StravaTokens) -> Result<(), sqlx::Error> {
  sqlx::query(
    r#"
    INSERT INTO strava_tokens (user_id, access_token, refresh_token, expires_at, athlete_id, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
    ON CONFLICT(user_id) DO UPDATE SET
      access_token = excluded.access_token,
      refresh_token = excluded.refresh_token,
      expires_at = excluded.expires_at,
      athlete_id = COALESCE(excluded.athlete_id, strava_tokens.athlete_id),
      updated_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(user_id)
  .bind(&tokens.access_token)
  .bind(&tokens.refresh_token)
  .bind(tokens.expires_at)
  .bind(tokens.athlete_id)
  .execute(db)
  .await?;

  Ok(())
}

/// Every stored credential, keyed by user id
pub async fn load_all_tokens(db: &DbPool) -> Result<Vec<(String, StravaTokens)>, sqlx::Error> {
  let rows = sqlx::query(
    "SELECT user_id, access_token, refresh_token, expires_at, athlete_id
     FROM strava_tokens ORDER BY user_id",
  )
  .fetch_all(db)
  .await?;

  rows
    .into_iter()
    .map(|row| -> Result<(String, StravaTokens), sqlx::Error> {
      let tokens = StravaTokens {
        access_token: row.try_get("access_token")?,
        refresh_token: row.try_get("refresh_token")?,
        expires_at: row.try_get("expires_at")?,
        athlete_id: row.try_get("athlete_id")?,
      };
      Ok((row.try_get("user_id")?, tokens))
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Activities
/// ---------------------------------------------------------------------------

/// Insert or refresh one activity for a user
pub async fn upsert_activity(
  db: &DbPool,
  user_id: &str,
  activity: &StravaActivity,
  raw: &serde_json::Value,
) -> Result<(), sqlx::Error> {
  sqlx::query(
    r#"
    INSERT INTO strava_activities (
      user_id, activity_id, start_date, name, activity_type,
      distance_m, moving_time_s, elevation_gain_m, raw_json, updated_at
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, CURRENT_TIMESTAMP)
    ON CONFLICT(user_id, activity_id) DO UPDATE SET
      start_date = excluded.start_date,
      name = excluded.name,
      activity_type = excluded.activity_type,
      distance_m = excluded.distance_m,
      moving_time_s = excluded.moving_time_s,
      elevation_gain_m = excluded.elevation_gain_m,
      raw_json = excluded.raw_json,
      updated_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(user_id)
  .bind(activity.id)
  .bind(activity.start_date)
  .bind(&activity.name)
  .bind(&activity.activity_type)
  .bind(activity.distance)
  .bind(activity.moving_time)
  .bind(activity.total_elevation_gain)
  .bind(raw.to_string())
  .execute(db)
  .await?;

  Ok(())
}

pub async fn load_recent_activities(
  db: &DbPool,
  user_id: &str,
  limit: i64,
) -> Result<Vec<Activity>, sqlx::Error> {
  sqlx::query_as::<_, Activity>(
    r#"
    SELECT user_id, activity_id, start_date, name, activity_type,
           distance_m, moving_time_s, elevation_gain_m, raw_json, updated_at
    FROM strava_activities
    WHERE user_id = ?1
    ORDER BY start_date DESC
    LIMIT ?2
    "#,
  )
  .bind(user_id)
  .bind(limit)
  .fetch_all(db)
  .await
}

/// ---------------------------------------------------------------------------
/// Plan Days
/// ---------------------------------------------------------------------------

/// Upsert a batch of plan days in one transaction
pub async fn upsert_plan_days(
  db: &DbPool,
  user_id: &str,
  days: &[(NaiveDate, PlanPayload)],
) -> Result<usize, sqlx::Error> {
  let mut tx = db.begin().await?;

  for (date, payload) in days {
    sqlx::query(
      r#"
      INSERT INTO plan_days (user_id, plan_date, week_index, payload_json, updated_at)
      VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
      ON CONFLICT(user_id, plan_date) DO UPDATE SET
        week_index = excluded.week_index,
        payload_json = excluded.payload_json,
        updated_at = CURRENT_TIMESTAMP
      "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(payload.week_index as i64)
    .bind(payload.to_json())
    .execute(&mut *tx)
    .await?;
  }

  tx.commit().await?;
  Ok(days.len())
}

fn decode_plan_day(row: PlanDayRow) -> Result<PlanDay, sqlx::Error> {
  PlanDay::try_from(row).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub async fn load_plan_day(
  db: &DbPool,
  user_id: &str,
  date: NaiveDate,
) -> Result<Option<PlanDay>, sqlx::Error> {
  let row = sqlx::query_as::<_, PlanDayRow>(
    "SELECT user_id, plan_date, week_index, payload_json, updated_at
     FROM plan_days WHERE user_id = ?1 AND plan_date = ?2",
  )
  .bind(user_id)
  .bind(date)
  .fetch_optional(db)
  .await?;

  row.map(decode_plan_day).transpose()
}

/// Plan days in `[from, to]`, oldest first
pub async fn load_plan_days_between(
  db: &DbPool,
  user_id: &str,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<PlanDay>, sqlx::Error> {
  let rows = sqlx::query_as::<_, PlanDayRow>(
    "SELECT user_id, plan_date, week_index, payload_json, updated_at
     FROM plan_days
     WHERE user_id = ?1 AND plan_date BETWEEN ?2 AND ?3
     ORDER BY plan_date",
  )
  .bind(user_id)
  .bind(from)
  .bind(to)
  .fetch_all(db)
  .await?;

  rows.into_iter().map(decode_plan_day).collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
