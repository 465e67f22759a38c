//! MASIRE monitor binary.
//!
//! Replays the matches of a MASIRE disaster simulation server step by
//! step and serves the resulting map, inspector and log over the viewer
//! API. It loads configuration, wires the sync client to the playback
//! controller, and runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `masire-monitor.yaml`
//! 3. Build the sync client for the simulation server
//! 4. Create the playback session and controller
//! 5. Start the viewer API server
//! 6. Run the controller until shutdown

mod error;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;

use masire_client::SyncClient;
use masire_core::config::MonitorConfig;
use masire_core::controller::PlaybackController;
use masire_core::session::PlaybackSession;
use masire_observer::server::ServerConfig;
use masire_observer::startup::spawn_observer;
use masire_observer::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::MonitorError;
use crate::observer_callback::ObserverCallback;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "masire-monitor.yaml";

/// Application entry point for the monitor.
///
/// # Errors
///
/// Returns an error if configuration, client setup or the viewer server
/// bind fails. Runtime fetch failures are logged, never returned.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("masire-monitor starting");
    run().await?;
    Ok(())
}

async fn run() -> Result<(), MonitorError> {
    // 2. Load configuration.
    let config = load_config()?;
    info!(
        base_url = config.server.base_url,
        tick_interval_ms = config.playback.tick_interval_ms,
        start_paused = config.playback.start_paused,
        observer_port = config.observer.port,
        "Configuration loaded"
    );

    // 3. Sync client.
    let client = SyncClient::new(&config.server.client_config())?;
    info!(base_url = client.base_url(), "Sync client ready");

    // 4. Session and controller.
    let session = PlaybackSession::new(&config);
    let (controller, handle) = PlaybackController::new(client, session);

    // 5. Viewer API.
    let app_state = Arc::new(AppState::with_playback(handle));
    let observer = spawn_observer(&ServerConfig::from(&config.observer), Arc::clone(&app_state))
        .await?;
    info!(port = config.observer.port, "Viewer API server started");

    // 6. Play until interrupted.
    let mut callback = ObserverCallback::new(app_state);
    let session = controller.run(&mut callback, shutdown_signal()).await;

    observer.abort();
    let cursor = session.cursor();
    info!(
        match_index = cursor.match_index,
        step = ?cursor.step,
        log_entries = session.log().len(),
        "masire-monitor shutdown complete"
    );

    Ok(())
}

/// Load the monitor configuration from [`CONFIG_FILE`].
///
/// A missing file means defaults; environment overrides apply either way.
fn load_config() -> Result<MonitorConfig, MonitorError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok(MonitorConfig::from_file(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        let mut config = MonitorConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Resolve on `Ctrl-C`. If the signal handler cannot be installed the
/// monitor runs until killed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
