//! Error types for the monitor binary.
//!
//! [`MonitorError`] wraps the startup failures `main` propagates with `?`.
//! Nothing after startup is fatal: fetch failures end up in the log panel.

/// Top-level error for the monitor binary.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: masire_core::config::ConfigError,
    },

    /// The HTTP client for the simulation server could not be built.
    #[error("client error: {source}")]
    Client {
        /// The underlying client error.
        #[from]
        source: masire_client::SyncError,
    },

    /// The viewer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: masire_observer::startup::StartupError,
    },
}
