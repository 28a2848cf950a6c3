//! Plan seeding: expand the 8-week base phase into dated plan days.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;

use crate::db::{self, DbPool};
use crate::models::plan::PlanPayload;
use crate::plan::{
  build_week, mobility_routine_details, strength_routine_details, WeekIndex, DAYS_PER_WEEK,
  PLAN_WEEKS,
};

#[derive(Debug, Clone, Default)]
pub struct SeedRequest {
  pub user_id: Option<String>,
  /// "YYYY-MM-DD"; defaults to today in the plan time zone
  pub start_date: Option<String>,
  pub weeks: Option<f64>,
}

impl SeedRequest {
  /// Read the request field by field so one badly typed field does not
  /// hide the others. Anything that is not an object reads as `{}`.
  pub fn from_json(body: &Value) -> Self {
    let field = |name: &str| body.get(name).filter(|v| !v.is_null());

    Self {
      user_id: field("user_id").and_then(Value::as_str).map(String::from),
      start_date: field("start_date").map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
      }),
      weeks: field("weeks").map(weeks_from_json),
    }
  }
}

/// Numeric coercion for `weeks`: numbers as-is, numeric strings parsed,
/// booleans as 0/1, everything else NaN (which is never 8)
fn weeks_from_json(value: &Value) -> f64 {
  match value {
    Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
    Value::String(s) if s.trim().is_empty() => 0.0,
    Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
    Value::Bool(b) => f64::from(u8::from(*b)),
    _ => f64::NAN,
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedResult {
  pub ok: bool,
  pub start_date: NaiveDate,
  pub days_seeded: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
  #[error("Missing user_id")]
  MissingUserId,

  #[error("Only 8-week plans are supported (got {0})")]
  UnsupportedWeeks(f64),

  #[error("Invalid start_date: {0}")]
  InvalidStartDate(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// Calendar date in `tz` at instant `now`
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
  now.with_timezone(&tz).date_naive()
}

/// Every plan day of the phase, dated from `start`
pub fn build_plan_days(start: NaiveDate) -> Result<Vec<(NaiveDate, PlanPayload)>, SeedError> {
  let mut rows = Vec::with_capacity(PLAN_WEEKS * DAYS_PER_WEEK);

  for week in WeekIndex::all() {
    for (day, plan) in build_week(week).into_iter().enumerate() {
      let offset = (week.get() * DAYS_PER_WEEK + day) as u64;
      let date = start
        .checked_add_days(Days::new(offset))
        .ok_or_else(|| SeedError::InvalidStartDate(start.to_string()))?;

      let payload = PlanPayload {
        strength_details: plan.strength.as_ref().map(|s| strength_routine_details(s.routine)),
        mobility_details: plan.mobility.as_ref().map(|m| mobility_routine_details(m.routine)),
        week_index: week.number(),
        day: plan,
      };
      rows.push((date, payload));
    }
  }

  Ok(rows)
}

/// Validate the request, build the phase and upsert it for the user
pub async fn seed_plan(
  db: &DbPool,
  request: &SeedRequest,
  plan_timezone: Tz,
  now: DateTime<Utc>,
) -> Result<SeedResult, SeedError> {
  let user_id = request
    .user_id
    .as_deref()
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .ok_or(SeedError::MissingUserId)?;

  let weeks = request.weeks.unwrap_or(PLAN_WEEKS as f64);
  if weeks != PLAN_WEEKS as f64 {
    return Err(SeedError::UnsupportedWeeks(weeks));
  }

  let start_date = match request.start_date.as_deref().map(str::trim) {
    Some(raw) if !raw.is_empty() => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
      .map_err(|_| SeedError::InvalidStartDate(raw.to_string()))?,
    _ => local_date(now, plan_timezone),
  };

  let rows = build_plan_days(start_date)?;
  let days_seeded = db::upsert_plan_days(db, user_id, &rows).await?;

  tracing::info!(user_id, %start_date, days_seeded, "Seeded training plan");

  Ok(SeedResult {
    ok: true,
    start_date,
    days_seeded,
  })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
