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

use crate::session::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
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
        .route(
            "/api/v1/missions",
            get(http::http_get_missions).put(http::http_put_missions),
        )
        .route("/api/v1/leaderboard", get(http::http_get_leaderboard))
        .route("/api/v1/navigate", post(http::http_post_navigate))
        .route("/api/v1/mission/start", post(http::http_post_start_mission))
        .route("/api/v1/stage", get(http::http_get_stage))
        .route("/api/v1/stage/advance", post(http::http_post_advance))
        .route("/api/v1/stage/retreat", post(http::http_post_retreat))
        .route("/api/v1/stage/match", post(http::http_post_select_match))
        .route("/api/v1/stage/match/submit", post(http::http_post_submit_matching))
        .route("/api/v1/report", post(http::http_post_report))
        .route("/api/v1/report/submit", post(http::http_post_submit_report))
        .route("/api/v1/mission/complete", post(http::http_post_complete))
        .route("/api/v1/tip", get(http::http_get_tip))
        .route("/api/v1/tip/current", get(http::http_get_tip_current))
        .route("/api/v1/edit/toggle", post(http::http_post_toggle_edit))
        .route("/api/v1/edit/field", post(http::http_post_edit_field))
        .route("/api/v1/edit/save", post(http::http_post_save_mission))
        .route("/api/v1/edit/category", post(http::http_post_add_category))
        .route("/api/v1/edit/mission", post(http::http_post_add_mission))
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
