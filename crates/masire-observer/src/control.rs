//! Control endpoints: the viewer's buttons, keys and marker clicks.
//!
//! Each handler forwards one [`Command`] to the playback controller and
//! answers with the session state right after it was applied. Rejected
//! commands come back as [`ObserverError::Playback`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/control/pause` | Stop the step timer |
//! | `POST` | `/api/control/resume` | Restart the step timer |
//! | `POST` | `/api/control/toggle` | Pause or resume |
//! | `POST` | `/api/control/speed` | Set the step interval (ms) |
//! | `POST` | `/api/control/step/next` | Next step |
//! | `POST` | `/api/control/step/prev` | Previous step |
//! | `POST` | `/api/control/match/next` | Next match |
//! | `POST` | `/api/control/match/prev` | Previous match |
//! | `POST` | `/api/control/select` | Select an entity |
//! | `POST` | `/api/control/log/toggle` | Show or hide the log |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use masire_core::controller::{Command, CommandAck};
use masire_types::entity::id_text;
use masire_types::{EntityRef, EntityType};
use tracing::debug;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/control/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New step interval in milliseconds (minimum 100).
    pub tick_interval_ms: u64,
}

/// Request body for `POST /api/control/select`.
#[derive(Debug, serde::Deserialize)]
pub struct SelectRequest {
    /// Entity type wire name, e.g. `victim` or `social_asset`.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// The entity's `identifier` or `token`, as string or number.
    pub id: serde_json::Value,
}

/// Response body of every control endpoint.
#[derive(Debug, serde::Serialize)]
struct ControlResponse {
    /// Whether the command was accepted.
    ok: bool,
    /// Human-readable message.
    message: String,
    /// Session state after the command.
    #[serde(flatten)]
    ack: CommandAck,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

async fn dispatch(
    state: &AppState,
    command: Command,
    message: impl FnOnce(&CommandAck) -> String,
) -> Result<Json<ControlResponse>, ObserverError> {
    let handle = state.playback.as_ref().ok_or(ObserverError::Unavailable)?;
    debug!(?command, "control command");
    let ack = handle.send(command).await?;
    Ok(Json(ControlResponse {
        ok: true,
        message: message(&ack),
        ack,
    }))
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

/// Stop the step timer.
pub async fn pause(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, Command::Pause, |_| "Paused.".to_owned()).await
}

/// Restart the step timer.
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, Command::Resume, |_| "Playing.".to_owned()).await
}

/// Pause when playing, resume when paused.
pub async fn toggle(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, Command::Toggle, |ack| {
        (if ack.playing { "Playing." } else { "Paused." }).to_owned()
    })
    .await
}

/// Change the step interval. A running timer restarts with it.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let command = Command::SetSpeed {
        tick_interval_ms: body.tick_interval_ms,
    };
    dispatch(&state, command, |ack| {
        format!("Step speed change to {} ms", ack.tick_interval_ms)
    })
    .await
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Go to the next step.
pub async fn next_step(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, Command::NextStep, step_message).await
}

/// Go to the previous step.
pub async fn prev_step(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, Command::PrevStep, step_message).await
}

/// Go to the next match.
pub async fn next_match(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, Command::NextMatch, match_message).await
}

/// Go to the previous match.
pub async fn prev_match(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, Command::PrevMatch, match_message).await
}

fn step_message(ack: &CommandAck) -> String {
    let step = ack.cursor.step.map_or(0, |s| s.saturating_add(1));
    format!("Loading step {step}")
}

fn match_message(ack: &CommandAck) -> String {
    let shown = ack.cursor.match_index.saturating_add(1);
    format!("Loading match {shown}")
}

// ---------------------------------------------------------------------------
// Selection and log
// ---------------------------------------------------------------------------

/// Select an entity of the displayed step, as clicking its marker would.
pub async fn select(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let entity_type = EntityType::parse(&body.entity_type).ok_or_else(|| {
        ObserverError::InvalidQuery(format!("Type not found: {}", body.entity_type))
    })?;
    let id = id_text(&body.id)
        .ok_or_else(|| ObserverError::InvalidQuery("id must be a string or number".to_owned()))?;
    let target = EntityRef::new(entity_type, id);
    let message = format!("Selected {entity_type} {}", target.id);
    dispatch(&state, Command::Select(target), |_| message).await
}

/// Show or hide the log panel.
pub async fn toggle_log(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, Command::ToggleLog, |ack| {
        (if ack.log_visible { "Showing Log." } else { "Hiding Log." }).to_owned()
    })
    .await
}
