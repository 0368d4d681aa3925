//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::error::AppError;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::speech::SpeechError;
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "deutsch_ueben", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "deutsch_ueben", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let out = reply_for_text(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "deutsch_ueben", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "deutsch_ueben", "WebSocket disconnected");
}

/// Parse, dispatch, serialize response.
pub(crate) async fn reply_for_text(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "deutsch_ueben", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { code: "invalid_json".into(), message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "code": "serialization", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

fn error_message(e: AppError) -> ServerWsMessage {
  match e {
    AppError::Speech(SpeechError::Unsupported) => ServerWsMessage::SpeechUnsupported { message: e.to_string() },
    other => ServerWsMessage::Error { code: other.code().into(), message: other.to_string() },
  }
}

#[instrument(level = "info", skip(state, msg))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListScenarios { difficulty } => {
      let scenarios = list_scenarios(state, difficulty).await;
      ServerWsMessage::Scenarios { scenarios }
    }

    ClientWsMessage::SubmitResponse { scenario_id, prompt_id, response } => {
      match submit_response(state, &scenario_id, prompt_id.as_deref(), &response).await {
        Ok(result) => {
          info!(target: "feedback", id = %scenario_id, score = result.feedback.score, "WS submit_response scored");
          ServerWsMessage::Feedback { result }
        }
        Err(e) => error_message(e),
      }
    }

    ClientWsMessage::GetProgress => ServerWsMessage::Progress { overview: progress_overview(state).await },

    ClientWsMessage::ResetProgress => ServerWsMessage::Progress { overview: reset_progress(state).await },

    ClientWsMessage::Transcribe { audio_base64, mime } => {
      match transcribe(state, &audio_base64, &mime).await {
        Ok(recognition) => ServerWsMessage::Transcript { recognition },
        Err(e) => error_message(e),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;
  use crate::progress::MemoryStorage;
  use crate::speech::SpeechCapability;
  use serde_json::Value;

  fn state() -> AppState {
    AppState::new(Catalog::build(vec![]), Box::new(MemoryStorage::new()), SpeechCapability::Unavailable)
  }

  async fn call(st: &AppState, msg: &str) -> Value {
    serde_json::from_str(&reply_for_text(msg, st).await).unwrap()
  }

  #[tokio::test]
  async fn ping_pong() {
    let v = call(&state(), r#"{"type":"ping"}"#).await;
    assert_eq!(v["type"], "pong");
  }

  #[tokio::test]
  async fn submit_then_progress() {
    let st = state();
    let v = call(&st, r#"{"type":"submit_response","scenarioId":"small-talk","response":"ja"}"#).await;
    assert_eq!(v["type"], "feedback");
    assert_eq!(v["score"], 1);
    assert_eq!(v["promptId"], "weekend");
    assert_eq!(v["label"]["severity"], "destructive");
    assert_eq!(v["areasToImprove"], "Try to give more detailed responses to keep the conversation flowing naturally.");

    let v = call(&st, r#"{"type":"get_progress"}"#).await;
    assert_eq!(v["type"], "progress");
    assert_eq!(v["completedCount"], 1);
    assert_eq!(v["totalScenarios"], 5);
  }

  #[tokio::test]
  async fn blank_submission_is_an_error() {
    let v = call(&state(), r#"{"type":"submit_response","scenarioId":"small-talk","response":"  "}"#).await;
    assert_eq!(v["type"], "error");
    assert_eq!(v["code"], "empty_response");
  }

  #[tokio::test]
  async fn transcribe_without_capability() {
    let v = call(&state(), r#"{"type":"transcribe","audioBase64":"UklGRg==","mime":"audio/wav"}"#).await;
    assert_eq!(v["type"], "speech_unsupported");
  }

  #[tokio::test]
  async fn malformed_json() {
    let v = call(&state(), "{nope").await;
    assert_eq!(v["code"], "invalid_json");
  }
}
