//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Submitting a response (validate, score, record)
//!   - Progress overview and per-scenario queries
//!   - Scenario listing and "next scenario" selection
//!   - Speech transcription passthrough

use tracing::{info, instrument, warn};

use crate::domain::{Difficulty, Scenario, UserResponse};
use crate::error::AppError;
use crate::feedback::{generate_feedback, score_label};
use crate::progress::ProgressStore;
use crate::protocol::{
  to_summary, FeedbackOut, ProgressOut, PromptProgressOut, ScenarioProgressOut, ScenarioSummary,
};
use crate::speech::Recognition;
use crate::state::AppState;
use crate::util::{now_millis, trunc_for_log};

/// Score a learner response and record it. Blank input never reaches the engine.
#[instrument(level = "info", skip(state, response), fields(%scenario_id, prompt_id = ?prompt_id, response_len = response.len()))]
pub async fn submit_response(
  state: &AppState,
  scenario_id: &str,
  prompt_id: Option<&str>,
  response: &str,
) -> Result<FeedbackOut, AppError> {
  let response = response.trim();
  if response.is_empty() {
    warn!(target: "feedback", %scenario_id, "Rejected blank response");
    return Err(AppError::EmptyResponse);
  }

  let scenario = state
    .catalog
    .get(scenario_id)
    .ok_or_else(|| AppError::UnknownScenario(scenario_id.to_string()))?;
  let prompt = match prompt_id {
    Some(pid) => scenario.prompt(pid),
    None => scenario.first_prompt(),
  }
  .ok_or_else(|| AppError::UnknownPrompt {
    scenario_id: scenario_id.to_string(),
    prompt_id: prompt_id.unwrap_or_default().to_string(),
  })?;

  let feedback = generate_feedback(response, prompt, scenario);

  let stored = state.progress.write().await.record_response(UserResponse {
    scenario_id: scenario.id.clone(),
    prompt_id: prompt.id.clone(),
    response: response.to_string(),
    score: feedback.score,
    timestamp: now_millis(),
    attempts: 1,
  });

  info!(target: "feedback", scenario_id = %scenario.id, prompt_id = %prompt.id, score = feedback.score, attempts = stored.attempts, response = %trunc_for_log(response, 80), "Response scored");

  Ok(FeedbackOut {
    scenario_id: scenario.id.clone(),
    prompt_id: prompt.id.clone(),
    label: score_label(feedback.score),
    feedback,
    attempts: stored.attempts,
  })
}

fn scenario_row(store: &ProgressStore, s: &Scenario) -> ScenarioProgressOut {
  let q = store.query(&s.id);
  ScenarioProgressOut {
    scenario_id: s.id.clone(),
    title: s.title.clone(),
    icon: s.icon.clone(),
    completed: store.is_completed(&s.id),
    score: q.score,
    attempts: q.attempts,
    label: q.score.map(score_label),
    prompts: s
      .prompts
      .iter()
      .map(|p| {
        let pq = store.query_prompt(&s.id, &p.id);
        PromptProgressOut { prompt_id: p.id.clone(), score: pq.score, attempts: pq.attempts }
      })
      .collect(),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn progress_overview(state: &AppState) -> ProgressOut {
  let store = state.progress.read().await;
  ProgressOut {
    total_scenarios: state.catalog.len(),
    aggregate: store.aggregate(),
    scenarios: state.catalog.all().iter().map(|s| scenario_row(&store, s)).collect(),
  }
}

#[instrument(level = "info", skip(state), fields(%scenario_id))]
pub async fn scenario_progress(state: &AppState, scenario_id: &str) -> Result<ScenarioProgressOut, AppError> {
  let scenario = state
    .catalog
    .get(scenario_id)
    .ok_or_else(|| AppError::UnknownScenario(scenario_id.to_string()))?;
  let store = state.progress.read().await;
  Ok(scenario_row(&store, scenario))
}

#[instrument(level = "info", skip(state))]
pub async fn reset_progress(state: &AppState) -> ProgressOut {
  state.progress.write().await.reset();
  progress_overview(state).await
}

#[instrument(level = "info", skip(state), fields(difficulty = ?difficulty))]
pub async fn list_scenarios(state: &AppState, difficulty: Option<Difficulty>) -> Vec<ScenarioSummary> {
  let store = state.progress.read().await;
  state
    .catalog
    .by_difficulty(difficulty)
    .into_iter()
    .map(|s| to_summary(s, store.is_completed(&s.id), store.query(&s.id).score))
    .collect()
}

#[instrument(level = "info", skip(state), fields(%scenario_id))]
pub fn get_scenario(state: &AppState, scenario_id: &str) -> Result<Scenario, AppError> {
  state
    .catalog
    .get(scenario_id)
    .cloned()
    .ok_or_else(|| AppError::UnknownScenario(scenario_id.to_string()))
}

#[instrument(level = "info", skip(state), fields(difficulty = ?difficulty, after = ?after))]
pub async fn next_scenario(
  state: &AppState,
  difficulty: Option<Difficulty>,
  after: Option<&str>,
) -> Result<Scenario, AppError> {
  let store = state.progress.read().await;
  let chosen = state
    .catalog
    .pick_next(difficulty, after, |id| store.is_completed(id))
    .cloned()
    .ok_or(AppError::NoScenario)?;
  info!(target: "deutsch_ueben", id = %chosen.id, "Next scenario chosen");
  Ok(chosen)
}

#[instrument(level = "info", skip(state, audio_base64), fields(audio_b64_len = audio_base64.len(), %mime))]
pub async fn transcribe(state: &AppState, audio_base64: &str, mime: &str) -> Result<Recognition, AppError> {
  Ok(state.speech.recognize(audio_base64, mime).await?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;
  use crate::progress::MemoryStorage;
  use crate::speech::SpeechCapability;

  fn state() -> AppState {
    AppState::new(Catalog::build(vec![]), Box::new(MemoryStorage::new()), SpeechCapability::Unavailable)
  }

  #[tokio::test]
  async fn blank_response_is_rejected_without_mutation() {
    let st = state();
    let err = submit_response(&st, "small-talk", None, "   \n ").await.unwrap_err();
    assert!(matches!(err, AppError::EmptyResponse));
    assert_eq!(st.progress.read().await.aggregate().response_count, 0);
  }

  #[tokio::test]
  async fn unknown_ids_are_reported() {
    let st = state();
    let err = submit_response(&st, "nope", None, "Hallo").await.unwrap_err();
    assert!(matches!(err, AppError::UnknownScenario(_)));
    let err = submit_response(&st, "small-talk", Some("nope"), "Hallo").await.unwrap_err();
    assert!(matches!(err, AppError::UnknownPrompt { .. }));
  }

  #[tokio::test]
  async fn submission_defaults_to_first_prompt_and_counts_attempts() {
    let st = state();
    let first = submit_response(&st, "small-talk", None, "ja").await.unwrap();
    assert_eq!(first.prompt_id, "weekend");
    assert_eq!(first.feedback.score, 1);
    assert_eq!(first.attempts, 1);

    let second = submit_response(
      &st,
      "small-talk",
      Some("weekend"),
      "Mein Wochenende war schön, ich war mit Freunden und meiner Familie unterwegs. Und dein Wochenende?",
    )
    .await
    .unwrap();
    assert_eq!(second.attempts, 2);
    assert_eq!(second.feedback.score, 5);

    let overview = progress_overview(&st).await;
    assert_eq!(overview.aggregate.response_count, 1);
    assert_eq!(overview.aggregate.total_score, 5);
    assert_eq!(overview.aggregate.completed_count, 1);
    let row = overview.scenarios.iter().find(|r| r.scenario_id == "small-talk").unwrap();
    assert!(row.completed);
    assert_eq!(row.score, Some(5));
    assert_eq!(row.prompts[0].attempts, 2);
    assert_eq!(row.prompts[1].score, None);
  }

  #[tokio::test]
  async fn stored_response_is_trimmed() {
    let st = state();
    submit_response(&st, "introduce", None, "  Ich heiße Max.  ").await.unwrap();
    let store = st.progress.read().await;
    assert_eq!(store.data().responses[0].response, "Ich heiße Max.");
  }

  #[tokio::test]
  async fn reset_clears_overview() {
    let st = state();
    submit_response(&st, "introduce", None, "Ich heiße Max.").await.unwrap();
    let overview = reset_progress(&st).await;
    assert_eq!(overview.aggregate.completed_count, 0);
    assert!(overview.scenarios.iter().all(|r| r.score.is_none() && !r.completed));
  }

  #[tokio::test]
  async fn transcription_without_capability_is_unsupported() {
    let st = state();
    let err = transcribe(&st, "UklGRg==", "audio/wav").await.unwrap_err();
    assert_eq!(err.code(), "speech_unsupported");
  }

  #[tokio::test]
  async fn listing_marks_completed_scenarios() {
    let st = state();
    submit_response(&st, "ask-help", None, "Klar, ich helfe dir gerne").await.unwrap();
    let list = list_scenarios(&st, Some(Difficulty::Beginner)).await;
    let row = list.iter().find(|s| s.id == "ask-help").unwrap();
    assert!(row.completed);
    assert!(row.latest_score.is_some());
    assert!(list.iter().all(|s| s.difficulty == Difficulty::Beginner));
  }
}
