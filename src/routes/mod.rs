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
/// - WebSocket at `/ws` (assistant chat)
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers); adjust for production if needed
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
        .route("/api/v1/sessions", post(http::http_create_session))
        .route("/api/v1/sessions/:id", get(http::http_get_session))
        .route("/api/v1/sessions/:id/goto", post(http::http_goto))
        .route("/api/v1/sessions/:id/restart", post(http::http_restart))
        .route("/api/v1/sessions/:id/design", post(http::http_submit_design))
        .route("/api/v1/sessions/:id/summary", get(http::http_get_summary))
        .route("/api/v1/sessions/:id/summary/print", get(http::http_print_summary))
        .route("/api/v1/sessions/:id/pascal", get(http::http_get_pascal))
        .route("/api/v1/sessions/:id/pascal/force", post(http::http_pascal_force))
        .route("/api/v1/sessions/:id/pascal/answer", post(http::http_pascal_answer))
        .route("/api/v1/sessions/:id/pascal/check", post(http::http_pascal_check))
        .route("/api/v1/sessions/:id/mechanics", get(http::http_get_mechanics))
        .route("/api/v1/sessions/:id/mechanics/match", post(http::http_mechanics_match))
        .route("/api/v1/sessions/:id/mechanics/material", post(http::http_mechanics_material))
        .route("/api/v1/sessions/:id/mechanics/check", post(http::http_mechanics_check))
        .route("/api/v1/assistant/ask", post(http::http_assistant_ask))
        .route("/api/v1/assistant/greeting", get(http::http_assistant_greeting))
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
