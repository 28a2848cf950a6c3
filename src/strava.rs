use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{optional, required, ConfigError};

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const STRAVA_AUTH_URL: &str = "https://www.strava.com/oauth/authorize";
const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
const STRAVA_SCOPE: &str = "read,activity:read_all";
const TOKEN_REFRESH_BUFFER_SECONDS: i64 = 60;

/// ---------------------------------------------------------------------------
/// OAuth Data Structures
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StravaConfig {
  pub client_id: String,
  pub client_secret: String,
  pub redirect_uri: String,
  pub auth_url: String,
  pub token_url: String,
  pub api_base: String,
}

impl StravaConfig {
  /// `app_base_url` provides the default callback when STRAVA_REDIRECT_URI is unset
  pub fn from_env(app_base_url: &str) -> Result<Self, ConfigError> {
    Ok(Self {
      client_id: required("STRAVA_CLIENT_ID")?,
      client_secret: required("STRAVA_CLIENT_SECRET")?,
      redirect_uri: optional("STRAVA_REDIRECT_URI")
        .unwrap_or_else(|| format!("{}/api/strava/callback", app_base_url)),
      auth_url: STRAVA_AUTH_URL.into(),
      token_url: STRAVA_TOKEN_URL.into(),
      api_base: STRAVA_API_BASE.into(),
    })
  }

  /// Point every endpoint at `base` (a mock server in tests)
  pub fn with_base_url(mut self, base: &str) -> Self {
    let base = base.trim_end_matches('/');
    self.auth_url = format!("{}/oauth/authorize", base);
    self.token_url = format!("{}/oauth/token", base);
    self.api_base = base.to_string();
    self
  }
}

/// Response from Strava token endpoint
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
  pub refresh_token: String,
  pub expires_at: i64,
  pub token_type: Option<String>,
  pub athlete: Option<AthleteInfo>,
}

/// Basic athlete info returned with tokens
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct AthleteInfo {
  pub id: i64,
  pub firstname: Option<String>,
  pub lastname: Option<String>,
}

/// Stored token state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StravaTokens {
  pub access_token: String,
  pub refresh_token: String,
  pub expires_at: DateTime<Utc>,
  pub athlete_id: Option<i64>,
}

impl StravaTokens {
  pub fn from_response(resp: TokenResponse) -> Self {
    Self {
      access_token: resp.access_token,
      refresh_token: resp.refresh_token,
      expires_at: DateTime::from_timestamp(resp.expires_at, 0).unwrap_or_else(Utc::now),
      athlete_id: resp.athlete.map(|a| a.id),
    }
  }

  /// True when the token expires within the refresh buffer of `now`
  pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
    let buffer = Duration::seconds(TOKEN_REFRESH_BUFFER_SECONDS);
    self.expires_at <= now + buffer
  }

  pub fn needs_refresh(&self) -> bool {
    self.needs_refresh_at(Utc::now())
  }
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StravaError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("OAuth error: {0}")]
  OAuth(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Not authenticated with Strava")]
  NotAuthenticated,
}

/// ---------------------------------------------------------------------------
/// OAuth URL Generation
/// ---------------------------------------------------------------------------

/// Authorization URL; `state` carries the user id back to the callback
pub fn build_auth_url(config: &StravaConfig, state: &str) -> Result<String, StravaError> {
  let mut url = Url::parse(&config.auth_url).map_err(|e| StravaError::OAuth(e.to_string()))?;

  url
    .query_pairs_mut()
    .append_pair("client_id", &config.client_id)
    .append_pair("redirect_uri", &config.redirect_uri)
    .append_pair("response_type", "code")
    .append_pair("approval_prompt", "auto")
    .append_pair("scope", STRAVA_SCOPE)
    .append_pair("state", state);

  Ok(url.to_string())
}

/// ---------------------------------------------------------------------------
/// Token Exchange (Authorization Code -> Tokens)
/// ---------------------------------------------------------------------------

pub async fn exchange_code_for_tokens(
  config: &StravaConfig,
  code: &str,
) -> Result<StravaTokens, StravaError> {
  let client = Client::new();

  let response = client
    .post(&config.token_url)
    .form(&[
      ("client_id", config.client_id.as_str()),
      ("client_secret", config.client_secret.as_str()),
      ("code", code),
      ("grant_type", "authorization_code"),
    ])
    .send()
    .await?;

  if !response.status().is_success() {
    let error_text = response.text().await.unwrap_or_default();
    return Err(StravaError::OAuth(format!(
      "Token exchange failed: {}",
      error_text
    )));
  }

  let token_response: TokenResponse = response.json().await?;
  Ok(StravaTokens::from_response(token_response))
}

/// ---------------------------------------------------------------------------
/// Token Refresh
/// ---------------------------------------------------------------------------

pub async fn refresh_tokens(
  config: &StravaConfig,
  refresh_token: &str,
) -> Result<StravaTokens, StravaError> {
  let client = Client::new();

  let response = client
    .post(&config.token_url)
    .form(&[
      ("client_id", config.client_id.as_str()),
      ("client_secret", config.client_secret.as_str()),
      ("refresh_token", refresh_token),
      ("grant_type", "refresh_token"),
    ])
    .send()
    .await?;

  if !response.status().is_success() {
    let error_text = response.text().await.unwrap_or_default();
    return Err(StravaError::OAuth(format!(
      "Token refresh failed: {}",
      error_text
    )));
  }

  let token_response: TokenResponse = response.json().await?;
  Ok(StravaTokens::from_response(token_response))
}

/// ---------------------------------------------------------------------------
/// Strava API - Activity Fetching
/// ---------------------------------------------------------------------------

/// Activity summary from Strava API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StravaActivity {
  pub id: i64,
  #[serde(default)]
  pub name: String,
  /// Strava uses "type" for legacy and "sport_type" for newer activities
  #[serde(rename = "type", default)]
  pub activity_type: String,
  pub start_date: DateTime<Utc>,
  #[serde(default)]
  pub moving_time: Option<i64>,
  #[serde(default)]
  pub distance: Option<f64>,
  #[serde(default)]
  pub total_elevation_gain: Option<f64>,
}

/// Fetch recent activities from Strava.
///
/// Returns the parsed summaries alongside each raw JSON object so callers can
/// keep the full payload.
pub async fn fetch_activities(
  config: &StravaConfig,
  access_token: &str,
  per_page: u32,
) -> Result<Vec<(StravaActivity, serde_json::Value)>, StravaError> {
  let client = Client::new();

  let url = format!("{}/athlete/activities?per_page={}", config.api_base, per_page);

  let response = client
    .get(&url)
    .header("Authorization", format!("Bearer {}", access_token))
    .send()
    .await?;

  if response.status() == reqwest::StatusCode::UNAUTHORIZED {
    return Err(StravaError::NotAuthenticated);
  }

  if !response.status().is_success() {
    let error_text = response.text().await.unwrap_or_default();
    return Err(StravaError::Api(format!(
      "Failed to fetch activities: {}",
      error_text
    )));
  }

  let response_text = response.text().await?;

  let raw: Vec<serde_json::Value> = serde_json::from_str(&response_text).map_err(|e| {
    tracing::warn!(
      "Raw Strava response (first 1000 chars): {}",
      response_text.chars().take(1000).collect::<String>()
    );
    StravaError::Api(format!("Failed to parse activities: {}", e))
  })?;

  // A malformed element is dropped; the rest of the page is still usable
  let activities = raw
    .into_iter()
    .filter_map(|value| match serde_json::from_value::<StravaActivity>(value.clone()) {
      Ok(activity) => Some((activity, value)),
      Err(e) => {
        tracing::warn!(id = ?value.get("id"), "Skipping unparseable Strava activity: {}", e);
        None
      }
    })
    .collect();

  Ok(activities)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
