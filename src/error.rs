//! Errors surfaced by the practice flow and their HTTP mapping.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

use crate::speech::SpeechError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
  #[error("response is empty")]
  EmptyResponse,
  #[error("unknown scenario: {0}")]
  UnknownScenario(String),
  #[error("unknown prompt {prompt_id} in scenario {scenario_id}")]
  UnknownPrompt { scenario_id: String, prompt_id: String },
  #[error("no scenario available")]
  NoScenario,
  #[error(transparent)]
  Speech(#[from] SpeechError),
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      AppError::EmptyResponse => StatusCode::BAD_REQUEST,
      AppError::UnknownScenario(_) | AppError::UnknownPrompt { .. } | AppError::NoScenario => {
        StatusCode::NOT_FOUND
      }
      AppError::Speech(e) => e.status(),
    }
  }

  /// Stable machine-readable code, shared by HTTP bodies and WS errors.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::EmptyResponse => "empty_response",
      AppError::UnknownScenario(_) => "unknown_scenario",
      AppError::UnknownPrompt { .. } => "unknown_prompt",
      AppError::NoScenario => "no_scenario",
      AppError::Speech(e) => e.code(),
    }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let body = json!({ "error": self.to_string(), "code": self.code() });
    (self.status(), Json(body)).into_response()
  }
}
