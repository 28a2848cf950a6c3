use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
  Flat,
  MountainLoop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intensity {
  Z1,
  Z2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strides {
  pub reps: u32,
  pub seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
  pub title: String,
  pub distance_mi: f64,
  pub route: RouteKind,
  pub intensity: Intensity,
  pub notes: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub strides: Option<Strides>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthRoutine {
  A,
  B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobilityRoutine {
  AnkleHip,
  PostMountain,
  FullReset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthBlock {
  pub title: String,
  pub routine: StrengthRoutine,
  pub duration_min: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobilityBlock {
  pub title: String,
  pub routine: MobilityRoutine,
  pub duration_min: u32,
}

/// One day of the weekly template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub run: Option<Run>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub strength: Option<StrengthBlock>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mobility: Option<MobilityBlock>,
  #[serde(default)]
  pub supplements: Vec<String>,
  #[serde(default)]
  pub cue: String,
}

/// Stored document for a single calendar day: the day plan plus the
/// expanded routine details and the 1-based week number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPayload {
  #[serde(flatten)]
  pub day: DayPlan,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub strength_details: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mobility_details: Option<Vec<String>>,
  pub week_index: u8,
}

impl PlanPayload {
  pub fn to_json(&self) -> String {
    serde_json::to_string(self).unwrap_or_default()
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlanDayRow {
  pub user_id: String,
  pub plan_date: NaiveDate,
  pub week_index: i64,
  pub payload_json: String,
  pub updated_at: Option<DateTime<Utc>>,
}

/// A persisted plan day with its payload decoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanDay {
  pub user_id: String,
  pub plan_date: NaiveDate,
  pub week_index: u8,
  pub payload: PlanPayload,
}

impl TryFrom<PlanDayRow> for PlanDay {
  type Error = serde_json::Error;

  fn try_from(row: PlanDayRow) -> Result<Self, Self::Error> {
    let payload: PlanPayload = serde_json::from_str(&row.payload_json)?;
    Ok(Self {
      user_id: row.user_id,
      plan_date: row.plan_date,
      week_index: payload.week_index,
      payload,
    })
  }
}
