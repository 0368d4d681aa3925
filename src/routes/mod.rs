//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers); the app is single-user and local
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/scenarios", get(http::http_list_scenarios))
        .route("/api/v1/scenarios/:id", get(http::http_get_scenario))
        .route("/api/v1/scenario/next", get(http::http_next_scenario))
        .route("/api/v1/feedback", post(http::http_post_feedback))
        .route("/api/v1/progress", get(http::http_get_progress))
        .route("/api/v1/progress/reset", post(http::http_post_reset))
        .route("/api/v1/progress/:scenario_id", get(http::http_get_scenario_progress))
        .route("/api/v1/speech", get(http::http_get_speech))
        .route("/api/v1/speech/transcribe", post(http::http_post_transcribe))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::catalog::Catalog;
    use crate::progress::MemoryStorage;
    use crate::speech::SpeechCapability;

    fn app() -> Router {
        let state = AppState::new(
            Catalog::build(vec![]),
            Box::new(MemoryStorage::new()),
            SpeechCapability::Unavailable,
        );
        build_router(Arc::new(state))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = send(&app(), get_req("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn scenarios_list_and_detail() {
        let app = app();
        let (status, body) = send(&app, get_req("/api/v1/scenarios?difficulty=Fortgeschritten")).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert!(!list.is_empty());
        assert!(list.iter().all(|s| s["difficulty"] == "Fortgeschritten"));

        let (status, body) = send(&app, get_req("/api/v1/scenarios/explain-task")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["formality"], "Sie");
        assert_eq!(body["prompts"][0]["id"], "process");

        let (status, body) = send(&app, get_req("/api/v1/scenarios/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "unknown_scenario");
    }

    #[tokio::test]
    async fn feedback_flow_updates_progress() {
        let app = app();
        let req = post_json(
            "/api/v1/feedback",
            json!({
                "scenarioId": "explain-task",
                "promptId": "process",
                "response": "Ich würde gerne mit Ihnen über das Projekt sprechen und die nächsten Schritte besprechen"
            }),
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 5);
        assert_eq!(body["label"]["tier"], "excellent");
        assert_eq!(body["attempts"], 1);
        assert_eq!(
            body["areasToImprove"],
            "Consider adding a follow-up question to show interest in the conversation."
        );

        let (_, body) = send(&app, get_req("/api/v1/progress/explain-task")).await;
        assert_eq!(body["score"], 5);
        assert_eq!(body["completed"], true);

        let (_, body) = send(&app, get_req("/api/v1/progress")).await;
        assert_eq!(body["completedCount"], 1);
        assert_eq!(body["averageScore"], 5.0);

        let (status, body) = send(&app, post_json("/api/v1/progress/reset", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completedCount"], 0);
        assert_eq!(body["averageScore"], 0.0);
    }

    #[tokio::test]
    async fn blank_feedback_is_bad_request() {
        let req = post_json("/api/v1/feedback", json!({ "scenarioId": "small-talk", "response": " " }));
        let (status, body) = send(&app(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "empty_response");
    }

    #[tokio::test]
    async fn speech_reports_unavailable() {
        let app = app();
        let (_, body) = send(&app, get_req("/api/v1/speech")).await;
        assert_eq!(body["available"], false);

        let req = post_json("/api/v1/speech/transcribe", json!({ "audioBase64": "UklGRg==", "mime": "audio/wav" }));
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "speech_unsupported");
    }

    #[tokio::test]
    async fn next_scenario_respects_difficulty() {
        let (status, body) = send(&app(), get_req("/api/v1/scenario/next?difficulty=beginner&after=small-talk")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["difficulty"], "Anfänger");
        assert_ne!(body["id"], "small-talk");
    }
}
