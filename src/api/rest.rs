// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. There is no authentication — this is
// a single-user, read-only presentation surface. CORS is configured
// permissively for development.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::app_state::AppState;

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/snapshot", get(snapshot))
        .route("/api/v1/config", get(config))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    uptime_secs: u64,
    server_time: i64,
    last_refresh_at: Option<String>,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
        last_refresh_at: state.last_refresh_at.read().map(|t| t.to_rfc3339()),
    };
    Json(resp)
}

// =============================================================================
// Latest snapshot
// =============================================================================

#[derive(Serialize)]
struct WaitingResponse {
    status: &'static str,
    message: String,
}

/// Returns the latest `SignalSnapshot`, or 503 with a "waiting for data"
/// body while the engine has not yet produced one (startup warm-up or every
/// cycle so far failed).
async fn snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = state.last_snapshot.read().clone();
    match snap {
        Some(s) => Json(s).into_response(),
        None => {
            let message = state
                .last_error
                .read()
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "waiting for first refresh cycle".to_string());
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(WaitingResponse {
                    status: "waiting",
                    message,
                }),
            )
                .into_response()
        }
    }
}

// =============================================================================
// Config
// =============================================================================

async fn config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cfg = state.runtime_config.read().clone();
    Json(cfg)
}
