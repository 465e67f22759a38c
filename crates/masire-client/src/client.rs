//! HTTP access to the simulation server.
//!
//! [`SimulatorApi`] is the seam between the playback controller and the
//! network. Its methods return `Send` futures so the controller can keep
//! several requests in flight at once. [`SyncClient`] implements it over
//! `reqwest` against the four read-only endpoints the server exposes:
//!
//! | Endpoint | Payload |
//! |----------|---------|
//! | `GET /simulator/info/config` | [`SimulationInfo`] |
//! | `GET /simulator/info/matches` | [`MatchInfo`] |
//! | `GET /simulator/match/{match}/info/map` | [`MapConfig`] |
//! | `GET /simulator/match/{match}/step/{step}` | [`StepData`] |

use std::future::Future;
use std::time::Duration;

use masire_types::{MapConfig, MatchInfo, SimulationInfo, StepData};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::SyncError;

/// A source of simulation data.
pub trait SimulatorApi: Send + Sync {
    /// Fetch the static simulation configuration.
    fn simulation_info(&self) -> impl Future<Output = Result<SimulationInfo, SyncError>> + Send;

    /// Fetch the global match counters.
    fn match_info(&self) -> impl Future<Output = Result<MatchInfo, SyncError>> + Send;

    /// Fetch the map configuration of a match.
    fn map_config(
        &self,
        match_index: u64,
    ) -> impl Future<Output = Result<MapConfig, SyncError>> + Send;

    /// Fetch one step of a match.
    fn step(
        &self,
        match_index: u64,
        step: u64,
    ) -> impl Future<Output = Result<StepData, SyncError>> + Send;
}

/// The server endpoints the monitor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /simulator/info/config`
    SimulationInfo,
    /// `GET /simulator/info/matches`
    MatchInfo,
    /// `GET /simulator/match/{match}/info/map`
    MapConfig {
        /// The match whose map is requested.
        match_index: u64,
    },
    /// `GET /simulator/match/{match}/step/{step}`
    Step {
        /// The match the step belongs to.
        match_index: u64,
        /// The step number.
        step: u64,
    },
}

impl Endpoint {
    /// The request path relative to the server's base URL.
    pub fn path(&self) -> String {
        match self {
            Self::SimulationInfo => String::from("/simulator/info/config"),
            Self::MatchInfo => String::from("/simulator/info/matches"),
            Self::MapConfig { match_index } => format!("/simulator/match/{match_index}/info/map"),
            Self::Step { match_index, step } => {
                format!("/simulator/match/{match_index}/step/{step}")
            }
        }
    }
}

impl core::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Connection settings for [`SyncClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the simulation server (e.g. `http://localhost:8000`).
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://127.0.0.1:8000"),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// `reqwest`-backed [`SimulatorApi`].
#[derive(Debug, Clone)]
pub struct SyncClient {
    client: reqwest::Client,
    base_url: String,
}

impl SyncClient {
    /// Build a client for the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Setup`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET an endpoint and decode its JSON body.
    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, SyncError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        debug!(%endpoint, "fetching");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SyncError::Transport {
                endpoint: endpoint.path(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SyncError::Transport {
            endpoint: endpoint.path(),
            message: format!("unable to read body: {e}"),
        })?;

        if !status.is_success() {
            return Err(SyncError::Status {
                endpoint: endpoint.path(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| SyncError::Decode {
            endpoint: endpoint.path(),
            message: e.to_string(),
        })
    }
}

impl SimulatorApi for SyncClient {
    async fn simulation_info(&self) -> Result<SimulationInfo, SyncError> {
        self.fetch(Endpoint::SimulationInfo).await
    }

    async fn match_info(&self) -> Result<MatchInfo, SyncError> {
        self.fetch(Endpoint::MatchInfo).await
    }

    async fn map_config(&self, match_index: u64) -> Result<MapConfig, SyncError> {
        self.fetch(Endpoint::MapConfig { match_index }).await
    }

    async fn step(&self, match_index: u64, step: u64) -> Result<StepData, SyncError> {
        self.fetch(Endpoint::Step { match_index, step }).await
    }
}

/// Pull the human-readable part out of an error body.
///
/// The server sends `{"message": "..."}` on failure; anything else is
/// surfaced whole.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(serde_json::Value::as_str)
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_owned())
}
