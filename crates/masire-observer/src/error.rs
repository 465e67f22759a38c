//! Error types for the viewer API.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use masire_core::error::PlaybackError;

/// Errors that can occur in the viewer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource does not exist yet.
    #[error("not found: {0}")]
    NotFound(String),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An invalid query parameter or request body was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// No playback controller is attached to this server.
    #[error("playback controller not available")]
    Unavailable,

    /// The playback controller rejected the command.
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

impl ObserverError {
    /// The HTTP status this error is reported with.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Playback(e) => match e {
                PlaybackError::SpeedTooFast { .. } => StatusCode::BAD_REQUEST,
                PlaybackError::EntityNotFound { .. } => StatusCode::NOT_FOUND,
                PlaybackError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
                PlaybackError::NotStarted
                | PlaybackError::MatchLoading(_)
                | PlaybackError::FirstStep
                | PlaybackError::FirstMatch => StatusCode::CONFLICT,
            },
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::NotFound(msg) | Self::InvalidQuery(msg) => msg.clone(),
            Self::Serialization(e) => format!("JSON error: {e}"),
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
