//! Daily plan email
//!
//! For each profile with an email address, resolve "today" in the profile's
//! time zone, load that day's plan and mail a plain-text summary.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rand::Rng;
use serde::Serialize;

use crate::db::{self, DbPool};
use crate::email::Mailer;
use crate::models::{PlanPayload, Profile};
use crate::seed::local_date;

pub const MOTIVATION_LINES: [&str; 5] = [
  "Boring miles build legendary legs.",
  "Strong is a habit. Today is a rep.",
  "You’re building the chassis for 100.",
  "Hike the steep. Own the descent.",
  "Consistency beats heroics — every time.",
];

#[derive(Debug, Clone, Serialize)]
pub struct NotifyResult {
  pub ok: bool,
  pub sent: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
  pub subject: String,
  pub text: String,
}

pub fn motivation_line<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
  MOTIVATION_LINES[rng.random_range(0..MOTIVATION_LINES.len())]
}

/// Profile zone, falling back to UTC when unset or unknown
pub fn profile_timezone(profile: &Profile) -> Tz {
  match profile.timezone.as_deref().map(str::trim) {
    Some(name) if !name.is_empty() => name.parse().unwrap_or_else(|_| {
      tracing::warn!(user_id = %profile.id, timezone = name, "Unknown time zone, using UTC");
      Tz::UTC
    }),
    _ => Tz::UTC,
  }
}

/// Render the plain-text summary for one plan day
pub fn render_email<R: Rng + ?Sized>(
  payload: &PlanPayload,
  date: NaiveDate,
  app_base_url: &str,
  rng: &mut R,
) -> RenderedEmail {
  let day = &payload.day;
  let mut lines: Vec<String> = Vec::new();

  lines.push(format!("Good morning — here’s your plan for {}:", date));
  lines.push(String::new());

  if let Some(run) = &day.run {
    lines.push(format!("RUN: {} ({} mi)", run.title, run.distance_mi));
    if !run.notes.is_empty() {
      lines.push(run.notes.clone());
    }
    if let Some(strides) = &run.strides {
      lines.push(format!("Strides: {} × {}s", strides.reps, strides.seconds));
    }
    lines.push(String::new());
  }

  if let Some(strength) = &day.strength {
    lines.push(format!("STRENGTH: {}", strength.title));
    for item in payload.strength_details.iter().flatten() {
      lines.push(format!("- {}", item));
    }
    lines.push(String::new());
  }

  if let Some(mobility) = &day.mobility {
    lines.push(format!("MOBILITY: {}", mobility.title));
    for item in payload.mobility_details.iter().flatten() {
      lines.push(format!("- {}", item));
    }
    lines.push(String::new());
  }

  if !day.supplements.is_empty() {
    lines.push(format!("SUPPLEMENTS: {}", day.supplements.join(", ")));
    lines.push(String::new());
  }

  if !day.cue.is_empty() {
    lines.push(format!("Cue: {}", day.cue));
  }
  lines.push(format!("Motivation: {}", motivation_line(rng)));
  lines.push(String::new());
  lines.push(format!("Log your workout: {}/today", app_base_url));

  RenderedEmail {
    subject: format!("Today's training — {}", date),
    text: lines.join("\n"),
  }
}

/// Mail today's plan to every profile that has one; returns the number sent
pub async fn send_daily_emails<R: Rng + ?Sized>(
  db: &DbPool,
  mailer: &Mailer,
  from: &str,
  app_base_url: &str,
  now: DateTime<Utc>,
  rng: &mut R,
) -> Result<NotifyResult, NotifyError> {
  let profiles = db::load_profiles(db).await?;

  let mut sent = 0;
  for profile in &profiles {
    let Some(email) = profile.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
      continue;
    };

    let plan_date = local_date(now, profile_timezone(profile));
    let Some(plan_day) = db::load_plan_day(db, &profile.id, plan_date).await? else {
      continue;
    };

    let rendered = render_email(&plan_day.payload, plan_date, app_base_url, rng);
    match mailer.send(from, email, &rendered.subject, &rendered.text).await {
      Ok(()) => sent += 1,
      Err(e) => tracing::error!(user_id = %profile.id, "Failed to send daily email: {}", e),
    }
  }

  tracing::info!(profiles = profiles.len(), sent, "Daily emails dispatched");

  Ok(NotifyResult { ok: true, sent })
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seed::{seed_plan, SeedRequest};
  use crate::test_utils::*;
  use chrono::TimeZone;
  use mockito::Matcher;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  async fn seed_for(pool: &DbPool, user_id: &str, start: &str) {
    let request = SeedRequest {
      user_id: Some(user_id.into()),
      start_date: Some(start.into()),
      weeks: None,
    };
    seed_plan(pool, &request, chrono_tz::UTC, Utc::now()).await.unwrap();
  }

  #[test]
  fn test_motivation_line_is_deterministic_with_seed() {
    let mut a = StdRng::seed_from_u64(7);
    let mut b = StdRng::seed_from_u64(7);
    for _ in 0..10 {
      let line = motivation_line(&mut a);
      assert_eq!(line, motivation_line(&mut b));
      assert!(MOTIVATION_LINES.contains(&line));
    }
  }

  #[test]
  fn test_render_thursday_email() {
    let rows = crate::seed::build_plan_days(ymd(2024, 1, 1)).unwrap();
    let (date, thursday) = &rows[3];

    let mut rng = StdRng::seed_from_u64(1);
    let email = render_email(thursday, *date, "https://coach.example.com", &mut rng);

    assert_eq!(email.subject, "Today's training — 2024-01-04");
    assert!(email.text.starts_with("Good morning — here’s your plan for 2024-01-04:"));
    assert!(email.text.contains("RUN: Easy Run + Strides (4 mi)"));
    assert!(email.text.contains("Strides: 6 × 20s"));
    assert!(email.text.contains("SUPPLEMENTS: Creatine 5g, "));
    assert!(email.text.contains("Cue: Strides are form practice, not a workout."));
    assert!(email.text.contains("Motivation: "));
    assert!(email.text.ends_with("Log your workout: https://coach.example.com/today"));
    assert!(!email.text.contains("STRENGTH:"));

    let mut again = StdRng::seed_from_u64(1);
    assert_eq!(email, render_email(thursday, *date, "https://coach.example.com", &mut again));
  }

  #[test]
  fn test_motivation_lines_match_published_copy() {
    assert_eq!(MOTIVATION_LINES[4], "Consistency beats heroics — every time.");
    assert_eq!(MOTIVATION_LINES[2], "You’re building the chassis for 100.");
  }

  #[test]
  fn test_render_strength_day_lists_details() {
    let rows = crate::seed::build_plan_days(ymd(2024, 1, 1)).unwrap();
    let (date, wednesday) = &rows[2];

    let mut rng = StdRng::seed_from_u64(3);
    let email = render_email(wednesday, *date, "https://coach.example.com", &mut rng);

    assert!(email.text.contains("STRENGTH: Strength A (Heavy + bone loading)"));
    assert!(email.text.contains("- Trap bar or barbell deadlift 4×5 (heavy, clean form)"));
    assert!(email.text.contains("MOBILITY: Post-Mountain Calves + Ankles"));
    assert!(email.text.contains("- Toe yoga 2 min"));
    assert!(!email.text.contains("RUN:"));
  }

  #[test]
  fn test_profile_timezone_fallbacks() {
    let mut profile = mock_stored_profile("u1", Some("a@example.com"), Some("America/Denver"));
    assert_eq!(profile_timezone(&profile), chrono_tz::America::Denver);
    profile.timezone = Some("Nowhere/Special".into());
    assert_eq!(profile_timezone(&profile), Tz::UTC);
    profile.timezone = None;
    assert_eq!(profile_timezone(&profile), Tz::UTC);
  }

  #[tokio::test]
  async fn test_send_daily_emails_skips_users_without_email_or_plan() {
    let pool = setup_test_db().await;
    let mut server = mockito::Server::new_async().await;

    db::upsert_profile(&pool, &mock_profile("with-plan", Some("runner@example.com"), Some("America/Phoenix")))
      .await
      .unwrap();
    db::upsert_profile(&pool, &mock_profile("no-email", None, None)).await.unwrap();
    db::upsert_profile(&pool, &mock_profile("no-plan", Some("idle@example.com"), None))
      .await
      .unwrap();
    seed_for(&pool, "with-plan", "2024-01-01").await;
    seed_for(&pool, "no-email", "2024-01-01").await;

    let mock = server
      .mock("POST", "/emails")
      .match_body(Matcher::PartialJson(serde_json::json!({
        "to": ["runner@example.com"],
        "subject": "Today's training — 2024-01-09"
      })))
      .with_status(200)
      .with_body(r#"{"id":"em_1"}"#)
      .expect(1)
      .create_async()
      .await;

    // 03:00 UTC Jan 10 is Jan 9 in Phoenix
    let now = Utc.with_ymd_and_hms(2024, 1, 10, 3, 0, 0).unwrap();
    let mailer = Mailer::new(&mock_email_config(&server.url()));
    let mut rng = StdRng::seed_from_u64(11);
    let result = send_daily_emails(&pool, &mailer, "coach@example.com", "https://coach.example.com", now, &mut rng)
      .await
      .unwrap();

    assert_eq!(result.sent, 1);
    mock.assert_async().await;

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_send_failure_is_not_counted() {
    let pool = setup_test_db().await;
    let mut server = mockito::Server::new_async().await;

    db::upsert_profile(&pool, &mock_profile("u1", Some("runner@example.com"), None))
      .await
      .unwrap();
    seed_for(&pool, "u1", "2024-01-01").await;

    server
      .mock("POST", "/emails")
      .with_status(500)
      .with_body("boom")
      .create_async()
      .await;

    let now = Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap();
    let mailer = Mailer::new(&mock_email_config(&server.url()));
    let mut rng = StdRng::seed_from_u64(11);
    let result = send_daily_emails(&pool, &mailer, "coach@example.com", "https://coach.example.com", now, &mut rng)
      .await
      .unwrap();

    assert!(result.ok);
    assert_eq!(result.sent, 0);

    teardown_test_db(pool).await;
  }
}
