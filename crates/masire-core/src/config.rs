//! Configuration loading and typed config structures for the monitor.
//!
//! The configuration lives in `masire-monitor.yaml` next to the binary's
//! working directory. Every field has a default, so a missing file or a
//! partial one yields a usable configuration pointed at a local simulation
//! server.

use std::path::Path;
use std::time::Duration;

use masire_client::ClientConfig;
use serde::Deserialize;

/// Smallest accepted step timer interval.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level monitor configuration.
///
/// Mirrors the structure of `masire-monitor.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitorConfig {
    /// Where the simulation server lives.
    #[serde(default)]
    pub server: ServerSection,

    /// Playback timing.
    #[serde(default)]
    pub playback: PlaybackSection,

    /// Map view settings.
    #[serde(default)]
    pub map: MapSection,

    /// Log panel settings.
    #[serde(default)]
    pub log: LogSection,

    /// Viewer API server settings.
    #[serde(default)]
    pub observer: ObserverSection,
}

impl MonitorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `MONITOR_API_URL` overrides `server.base_url`
    /// - `MONITOR_OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override values with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override values from an arbitrary variable lookup.
    ///
    /// Unparseable port values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("MONITOR_API_URL") {
            self.server.base_url = url;
        }
        if let Some(port) = lookup("MONITOR_OBSERVER_PORT") {
            match port.parse() {
                Ok(port) => self.observer.port = port,
                Err(e) => tracing::warn!(value = %port, error = %e, "ignoring MONITOR_OBSERVER_PORT"),
            }
        }
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the tick interval is below
    /// [`MIN_TICK_INTERVAL_MS`] or the log capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.playback.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "playback.tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}, got {}",
                self.playback.tick_interval_ms
            )));
        }
        if self.log.capacity == 0 {
            return Err(ConfigError::Invalid(String::from(
                "log.capacity must be positive",
            )));
        }
        Ok(())
    }
}

/// Simulation server connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Base URL of the simulation server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSection {
    /// The sync client settings described by this section.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Playback timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackSection {
    /// Interval of both the bootstrap and the step timer, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Whether playback starts paused.
    #[serde(default)]
    pub start_paused: bool,
}

impl PlaybackSection {
    /// The tick interval as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for PlaybackSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            start_paused: false,
        }
    }
}

/// Map view settings handed to whatever draws the map.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MapSection {
    /// Initial zoom level of a new map view.
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Maximum zoom level of the tile layer.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders.
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Attribution shown under the tiles.
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            zoom: default_zoom(),
            max_zoom: default_max_zoom(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

/// Log panel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogSection {
    /// Maximum number of retained entries.
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,

    /// Whether the log panel starts visible.
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
            visible: true,
        }
    }
}

/// Viewer API server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverSection {
    /// Address to bind.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverSection {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_owned()
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_zoom() -> u8 {
    17
}

const fn default_max_zoom() -> u8 {
    19
}

fn default_tile_url() -> String {
    "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_owned()
}

fn default_attribution() -> String {
    "Map data &copy; <a href=\"https://www.openstreetmap.org/\">OpenStreetMap</a> contributors"
        .to_owned()
}

const fn default_log_capacity() -> usize {
    1000
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.playback.tick_interval_ms, 1000);
        assert_eq!(config.map.zoom, 17);
        assert_eq!(config.map.max_zoom, 19);
        assert_eq!(config.observer.port, 8080);
        assert!(config.log.visible);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  base_url: "http://sim.local:5000"
  request_timeout_ms: 1500

playback:
  tick_interval_ms: 250
  start_paused: true

map:
  zoom: 15
  max_zoom: 18
  tile_url: "https://tiles.example/{z}/{x}/{y}.png"
  attribution: "tiles"

log:
  capacity: 50
  visible: false

observer:
  host: "127.0.0.1"
  port: 9090
"#;

        let config = MonitorConfig::parse(yaml).unwrap();
        assert_eq!(config.server.base_url, "http://sim.local:5000");
        assert_eq!(
            config.server.client_config().request_timeout,
            Duration::from_millis(1500)
        );
        assert_eq!(config.playback.tick_interval(), Duration::from_millis(250));
        assert!(config.playback.start_paused);
        assert_eq!(config.map.zoom, 15);
        assert_eq!(config.log.capacity, 50);
        assert!(!config.log.visible);
        assert_eq!(config.observer.port, 9090);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = MonitorConfig::parse("playback:\n  tick_interval_ms: 500\n").unwrap();
        assert_eq!(config.playback.tick_interval_ms, 500);
        assert_eq!(config.server, ServerSection::default());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let yaml = include_str!("../../../masire-monitor.yaml");
        assert_eq!(MonitorConfig::parse(yaml).unwrap(), MonitorConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(MonitorConfig::parse("{}").unwrap(), MonitorConfig::default());
    }

    #[test]
    fn reject_fast_tick_interval() {
        let result = MonitorConfig::parse("playback:\n  tick_interval_ms: 10\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn reject_zero_log_capacity() {
        let result = MonitorConfig::parse("log:\n  capacity: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn overrides_apply_from_lookup() {
        let vars: BTreeMap<&str, &str> = [
            ("MONITOR_API_URL", "http://other:7000"),
            ("MONITOR_OBSERVER_PORT", "9999"),
        ]
        .into_iter()
        .collect();

        let mut config = MonitorConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| (*v).to_owned()));
        assert_eq!(config.server.base_url, "http://other:7000");
        assert_eq!(config.observer.port, 9999);
    }

    #[test]
    fn bad_port_override_is_ignored() {
        let mut config = MonitorConfig::default();
        config.apply_overrides(|name| {
            (name == "MONITOR_OBSERVER_PORT").then(|| String::from("not-a-port"))
        });
        assert_eq!(config.observer.port, 8080);
    }
}
