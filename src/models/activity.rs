use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A synced Strava activity as stored in `strava_activities`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
  pub user_id: String,
  pub activity_id: i64,
  pub start_date: DateTime<Utc>,
  pub name: String,
  pub activity_type: String,
  pub distance_m: Option<f64>,
  pub moving_time_s: Option<i64>,
  pub elevation_gain_m: Option<f64>,
  pub raw_json: Option<String>,
  pub updated_at: Option<DateTime<Utc>>,
}
