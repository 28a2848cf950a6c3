//! Process configuration
//!
//! Everything environment-derived is read once here, at start-up, and then
//! handed to the rest of the crate by reference.

use chrono_tz::Tz;
use std::env;

use crate::email::EmailConfig;
use crate::strava::StravaConfig;

const DEFAULT_DATABASE_URL: &str = "sqlite://ultra-coach.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PLAN_TIMEZONE: &str = "America/Phoenix";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  Missing(String),

  #[error("Invalid value for {name}: {reason}")]
  Invalid { name: String, reason: String },
}

/// Read a required, non-empty variable
pub(crate) fn required(name: &str) -> Result<String, ConfigError> {
  match env::var(name) {
    Ok(value) if !value.trim().is_empty() => Ok(value),
    _ => Err(ConfigError::Missing(name.into())),
  }
}

pub(crate) fn optional(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Shared bearer secret for the seed and cron endpoints
  pub cron_secret: String,
  /// Public base URL of the deployment, without trailing slash
  pub app_base_url: String,
  pub database_url: String,
  pub bind_addr: String,
  /// Zone used to resolve "today" when a seed request has no start date
  pub plan_timezone: Tz,
  pub strava: StravaConfig,
  pub email: EmailConfig,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let app_base_url = required("APP_BASE_URL")?.trim_end_matches('/').to_string();

    let tz_name = optional("PLAN_TIMEZONE").unwrap_or_else(|| DEFAULT_PLAN_TIMEZONE.into());
    let plan_timezone: Tz = tz_name.parse().map_err(|_| ConfigError::Invalid {
      name: "PLAN_TIMEZONE".into(),
      reason: format!("unknown time zone '{}'", tz_name),
    })?;

    Ok(Self {
      cron_secret: required("CRON_SECRET")?,
      strava: StravaConfig::from_env(&app_base_url)?,
      email: EmailConfig::from_env()?,
      database_url: optional("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
      bind_addr: optional("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
      plan_timezone,
      app_base_url,
    })
  }
}
