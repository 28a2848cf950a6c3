use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
  pub id: String,
  pub email: Option<String>,
  /// IANA zone name, e.g. "America/Denver"
  pub timezone: Option<String>,
  /// Preferred local send time ("HH:MM")
  pub email_time_local: Option<String>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// For inserting or updating a profile (without updated_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
  pub user_id: String,
  pub email: Option<String>,
  pub timezone: Option<String>,
  pub email_time_local: Option<String>,
}
