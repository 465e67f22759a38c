//! Viewer server startup helper for embedding in the monitor binary.
//!
//! Provides [`spawn_observer`] which binds the viewer port and serves
//! the API on a background Tokio task, concurrently with the playback
//! controller.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, bind, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the viewer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the viewer HTTP server on a background Tokio task.
///
/// The port is bound before the task is spawned, so a taken or invalid
/// address is reported here rather than logged later. The server runs
/// until the runtime shuts down or the returned handle is aborted.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            tracing::error!(error = %e, "Viewer server exited with error");
        }
    });

    tracing::info!(host = %config.host, port = config.port, "Viewer server spawned on background task");

    Ok(handle)
}
