use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::notify::NotifyError;
use crate::seed::SeedError;
use crate::strava::StravaError;
use crate::sync::SyncError;

/// Error surfaced by an HTTP handler, rendered as `{"error": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("Unauthorized")]
  Unauthorized,

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Upstream(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!("{}", self);
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

impl From<sqlx::Error> for ApiError {
  fn from(e: sqlx::Error) -> Self {
    ApiError::Upstream(format!("Database error: {}", e))
  }
}

impl From<SeedError> for ApiError {
  fn from(e: SeedError) -> Self {
    match e {
      SeedError::Database(_) => ApiError::Upstream(e.to_string()),
      _ => ApiError::Validation(e.to_string()),
    }
  }
}

impl From<SyncError> for ApiError {
  fn from(e: SyncError) -> Self {
    ApiError::Upstream(e.to_string())
  }
}

impl From<NotifyError> for ApiError {
  fn from(e: NotifyError) -> Self {
    ApiError::Upstream(e.to_string())
  }
}

impl From<StravaError> for ApiError {
  fn from(e: StravaError) -> Self {
    ApiError::Upstream(e.to_string())
  }
}
