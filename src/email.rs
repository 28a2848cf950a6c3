//! Outbound email over the Resend HTTP API

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::{required, ConfigError};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EmailConfig {
  pub api_key: String,
  /// Sender, e.g. "Coach <coach@example.com>"
  pub from: String,
  pub api_url: String,
}

impl EmailConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Ok(Self {
      api_key: required("RESEND_API_KEY")?,
      from: required("EMAIL_FROM")?,
      api_url: RESEND_API_URL.into(),
    })
  }
}

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum EmailError {
  #[error("Request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("API error: {0}")]
  Api(String),
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
  from: &'a str,
  to: [&'a str; 1],
  subject: &'a str,
  text: &'a str,
}

/// ---------------------------------------------------------------------------
/// Mailer
/// ---------------------------------------------------------------------------

pub struct Mailer {
  client: Client,
  api_key: String,
  api_url: String,
}

impl Mailer {
  pub fn new(config: &EmailConfig) -> Self {
    Self {
      client: Client::new(),
      api_key: config.api_key.clone(),
      api_url: config.api_url.clone(),
    }
  }

  /// Send a plain-text email to a single recipient
  pub async fn send(&self, from: &str, to: &str, subject: &str, text: &str) -> Result<(), EmailError> {
    let request = SendRequest {
      from,
      to: [to],
      subject,
      text,
    };

    let response = self
      .client
      .post(&self.api_url)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(EmailError::Api(format!("HTTP {}: {}", status, body)));
    }

    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
