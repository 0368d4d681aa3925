//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state), fields(difficulty = ?q.difficulty))]
pub async fn http_list_scenarios(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ScenarioQuery>,
) -> impl IntoResponse {
  let scenarios = list_scenarios(&state, q.difficulty).await;
  info!(target: "deutsch_ueben", count = scenarios.len(), "HTTP scenarios served");
  Json(scenarios)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_scenario(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
  Ok(Json(get_scenario(&state, &id)?))
}

#[instrument(level = "info", skip(state), fields(difficulty = ?q.difficulty, after = ?q.after))]
pub async fn http_next_scenario(
  State(state): State<Arc<AppState>>,
  Query(q): Query<NextQuery>,
) -> Result<impl IntoResponse, AppError> {
  Ok(Json(next_scenario(&state, q.difficulty, q.after.as_deref()).await?))
}

#[instrument(level = "info", skip(state, body), fields(%body.scenario_id, prompt_id = ?body.prompt_id, response_len = body.response.len()))]
pub async fn http_post_feedback(
  State(state): State<Arc<AppState>>,
  Json(body): Json<FeedbackIn>,
) -> Result<impl IntoResponse, AppError> {
  let out = submit_response(&state, &body.scenario_id, body.prompt_id.as_deref(), &body.response).await?;
  info!(target: "feedback", id = %out.scenario_id, score = out.feedback.score, attempts = out.attempts, "HTTP feedback served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(progress_overview(&state).await)
}

#[instrument(level = "info", skip(state), fields(%scenario_id))]
pub async fn http_get_scenario_progress(
  State(state): State<Arc<AppState>>,
  Path(scenario_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
  Ok(Json(scenario_progress(&state, &scenario_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let out = reset_progress(&state).await;
  info!(target: "progress", "HTTP progress reset");
  Json(out)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_speech(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(SpeechOut { info: state.speech.info() })
}

#[instrument(level = "info", skip(state, body), fields(audio_b64_len = body.audio_base64.len(), mime = %body.mime))]
pub async fn http_post_transcribe(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TranscribeIn>,
) -> Result<impl IntoResponse, AppError> {
  Ok(Json(transcribe(&state, &body.audio_base64, &body.mime).await?))
}
