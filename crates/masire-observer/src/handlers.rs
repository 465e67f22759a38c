//! Read-only endpoint handlers for the viewer API.
//!
//! All handlers read from the published [`ViewerSnapshot`] via the shared
//! [`AppState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/status` | Playback state, counters and server info |
//! | `GET` | `/api/map` | Map view of the current match |
//! | `GET` | `/api/frame` | Markers and overlays of the displayed step |
//! | `GET` | `/api/inspector` | Inspector panel |
//! | `GET` | `/api/log` | Log panel |
//! | `GET` | `/api/map/point` | Coordinate popup text |
//!
//! [`ViewerSnapshot`]: masire_core::session::ViewerSnapshot

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use masire_core::map_view::describe_point;
use masire_core::session::{Cursor, Phase};
use masire_types::{MatchInfo, SimulationInfo};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/map/point`.
#[derive(Debug, serde::Deserialize)]
pub struct PointQuery {
    /// Latitude of the clicked point.
    pub lat: f64,
    /// Longitude of the clicked point.
    pub lon: f64,
}

/// Response body for `GET /api/status`.
#[derive(Debug, serde::Serialize)]
pub struct StatusResponse {
    /// Playback phase.
    pub phase: Phase,
    /// Whether the step timer runs once a match is loaded.
    pub playing: bool,
    /// Step interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Displayed position.
    pub cursor: Cursor,
    /// `"{step} of {total}"`.
    pub step_counter: String,
    /// `"{match} of {total}"`.
    pub match_counter: String,
    /// Actors in the displayed step.
    pub active_agents: usize,
    /// Static simulation configuration, once fetched.
    pub simulation_info: Option<SimulationInfo>,
    /// Latest match counters.
    pub match_info: Option<MatchInfo>,
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page with the playback state and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let phase = format!("{:?}", snapshot.phase);
    let step = &snapshot.step_counter;
    let matches = &snapshot.match_counter;
    let agents = snapshot.active_agents;
    let interval = snapshot.tick_interval_ms;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>MASIRE Monitor</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>MASIRE Monitor</h1>
    <p class="subtitle">Disaster simulation replay</p>

    <div>
        <div class="metric"><div class="label">Phase</div><div class="value">{phase}</div></div>
        <div class="metric"><div class="label">Step</div><div class="value">{step}</div></div>
        <div class="metric"><div class="label">Match</div><div class="value">{matches}</div></div>
        <div class="metric"><div class="label">Active agents</div><div class="value">{agents}</div></div>
        <div class="metric"><div class="label">Interval (ms)</div><div class="value">{interval}</div></div>
    </div>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/status">/api/status</a> -- Playback state</li>
        <li>GET <a href="/api/map">/api/map</a> -- Map view</li>
        <li>GET <a href="/api/frame">/api/frame</a> -- Markers and overlays</li>
        <li>GET <a href="/api/inspector">/api/inspector</a> -- Inspector panel</li>
        <li>GET <a href="/api/log">/api/log</a> -- Log panel</li>
        <li>POST /api/control/{{pause,resume,toggle,speed,step/next,step/prev,match/next,match/prev,select,log/toggle}}</li>
        <li><code>ws://host:port/ws/frames</code> -- Live frame stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/status
// ---------------------------------------------------------------------------

/// Return the playback state and counters.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    Json(StatusResponse {
        phase: snapshot.phase,
        playing: snapshot.playing,
        tick_interval_ms: snapshot.tick_interval_ms,
        cursor: snapshot.cursor,
        step_counter: snapshot.step_counter.clone(),
        match_counter: snapshot.match_counter.clone(),
        active_agents: snapshot.active_agents,
        simulation_info: snapshot.simulation_info.clone(),
        match_info: snapshot.match_info,
    })
}

// ---------------------------------------------------------------------------
// GET /api/map, GET /api/frame
// ---------------------------------------------------------------------------

/// Return the map view of the current match.
pub async fn get_map(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    let view = snapshot
        .map
        .as_ref()
        .ok_or_else(|| ObserverError::NotFound("no match loaded yet".to_owned()))?;
    Ok(Json(serde_json::to_value(view)?))
}

/// Return the markers and overlays of the displayed step.
pub async fn get_frame(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    let view = snapshot
        .map
        .as_ref()
        .ok_or_else(|| ObserverError::NotFound("no match loaded yet".to_owned()))?;
    Ok(Json(serde_json::json!({
        "match_index": view.match_index,
        "step": snapshot.cursor.step,
        "map_view_id": view.id,
        "frame": view.frame,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/inspector, GET /api/log
// ---------------------------------------------------------------------------

/// Return the inspector panel.
pub async fn get_inspector(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    Json(snapshot.inspector.clone())
}

/// Return the log panel, both as entries and as display lines.
pub async fn get_log(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let lines: Vec<String> = snapshot.log.iter().map(ToString::to_string).collect();
    Json(serde_json::json!({
        "visible": snapshot.log_visible,
        "count": snapshot.log.len(),
        "entries": snapshot.log,
        "lines": lines,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/map/point
// ---------------------------------------------------------------------------

/// Return the popup text for a right-clicked coordinate.
pub async fn get_point(Query(point): Query<PointQuery>) -> impl IntoResponse {
    Json(serde_json::json!({
        "lat": point.lat,
        "lon": point.lon,
        "text": describe_point(point.lat, point.lon),
    }))
}
