//! Axum router construction for the viewer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled so a browser front end on another origin can use it.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{control, handlers, ws};

/// Build the complete Axum router for the viewer API.
///
/// Read endpoints live under `/api`, commands under `/api/control`, and
/// the frame stream at `/ws/frames`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/frames", get(ws::ws_frames))
        // Read API
        .route("/api/status", get(handlers::get_status))
        .route("/api/map", get(handlers::get_map))
        .route("/api/map/point", get(handlers::get_point))
        .route("/api/frame", get(handlers::get_frame))
        .route("/api/inspector", get(handlers::get_inspector))
        .route("/api/log", get(handlers::get_log))
        // Control API
        .route("/api/control/pause", post(control::pause))
        .route("/api/control/resume", post(control::resume))
        .route("/api/control/toggle", post(control::toggle))
        .route("/api/control/speed", post(control::set_speed))
        .route("/api/control/step/next", post(control::next_step))
        .route("/api/control/step/prev", post(control::prev_step))
        .route("/api/control/match/next", post(control::next_match))
        .route("/api/control/match/prev", post(control::prev_match))
        .route("/api/control/select", post(control::select))
        .route("/api/control/log/toggle", post(control::toggle_log))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
