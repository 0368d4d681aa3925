//! Deutsch üben · workplace-conversation trainer backend
//!
//! - Axum HTTP + WebSocket API
//! - Heuristic response scoring and local JSON progress snapshot
//! - Optional speech transcription (OpenAI-compatible, via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                    : u16 (default 3000)
//!   APP_CONFIG_PATH         : path to TOML config (storage, speech, extra scenarios)
//!   PROGRESS_PATH           : progress snapshot file (default ./data/deutsch-ueben-progress.json)
//!   SPEECH_LOCALE           : recognition locale hint (default "de-DE")
//!   OPENAI_API_KEY          : enables speech transcription if present
//!   OPENAI_BASE_URL         : default "https://api.openai.com/v1"
//!   OPENAI_TRANSCRIBE_MODEL : default "whisper-1"
//!   LOG_LEVEL               : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT              : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod catalog;
mod feedback;
mod progress;
mod speech;
mod openai;
mod error;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: catalog, progress store (loaded from disk), speech capability.
  let state = Arc::new(AppState::from_env());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "deutsch_ueben", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "deutsch_ueben", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "deutsch_ueben", error = %e, "Failed to listen for shutdown signal");
  }
}
