//! Simulation, match and map configuration payloads.

use serde::{Deserialize, Serialize};

use crate::location::{Location, lenient_f64};

/// Static configuration of the simulation server.
///
/// Served by `GET /simulator/info/config` and fetched once when the monitor
/// initializes. The monitor only displays these values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationInfo {
    /// URL of the simulation engine.
    #[serde(default)]
    pub simulation_url: String,
    /// URL of the agent-facing API.
    #[serde(default)]
    pub api_url: String,
    /// Maximum number of connected agents.
    #[serde(default)]
    pub max_agents: u64,
    /// Time allotted for the first step, in seconds.
    #[serde(default)]
    pub first_step_time: f64,
    /// Time allotted for every following step, in seconds.
    #[serde(default)]
    pub step_time: f64,
    /// Seconds before an unconnected social asset is dropped.
    #[serde(default)]
    pub social_asset_timeout: f64,
}

/// Global match counters.
///
/// Served by `GET /simulator/info/matches` and refreshed after every step
/// navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInfo {
    /// Number of steps in a match.
    pub total_steps: u64,
    /// Number of matches in the simulation.
    pub total_matches: u64,
}

/// Map configuration of a single match.
///
/// Served by `GET /simulator/match/{match}/info/map`. Receiving one
/// replaces the current map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Latitude of the map center.
    #[serde(rename = "centerLat", deserialize_with = "lenient_f64")]
    pub center_lat: f64,
    /// Longitude of the map center.
    #[serde(rename = "centerLon", deserialize_with = "lenient_f64")]
    pub center_lon: f64,
    /// Southern boundary.
    #[serde(rename = "minLat", deserialize_with = "lenient_f64")]
    pub min_lat: f64,
    /// Western boundary.
    #[serde(rename = "minLon", deserialize_with = "lenient_f64")]
    pub min_lon: f64,
    /// Northern boundary.
    #[serde(rename = "maxLat", deserialize_with = "lenient_f64")]
    pub max_lat: f64,
    /// Eastern boundary.
    #[serde(rename = "maxLon", deserialize_with = "lenient_f64")]
    pub max_lon: f64,
    /// Name of the OSM map file the match runs on.
    #[serde(default)]
    pub osm: String,
}

impl MapConfig {
    /// The configured map center.
    pub const fn center(&self) -> Location {
        Location::new(self.center_lat, self.center_lon)
    }

    /// The configured map boundary.
    pub const fn bounds(&self) -> Bounds {
        Bounds {
            south_west: Location::new(self.min_lat, self.min_lon),
            north_east: Location::new(self.max_lat, self.max_lon),
        }
    }
}

/// A rectangular area given by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Corner with the minimum latitude and longitude.
    pub south_west: Location,
    /// Corner with the maximum latitude and longitude.
    pub north_east: Location,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn map_config_accepts_string_coordinates() {
        let config: MapConfig = serde_json::from_value(serde_json::json!({
            "centerLat": "-22.81",
            "centerLon": -43.21,
            "minLat": -22.82,
            "minLon": "-43.22",
            "maxLat": -22.80,
            "maxLon": -43.20,
            "osm": "rio.osm"
        }))
        .unwrap();

        assert_eq!(config.center(), Location::new(-22.81, -43.21));
        assert_eq!(config.bounds().south_west, Location::new(-22.82, -43.22));
        assert_eq!(config.bounds().north_east, Location::new(-22.80, -43.20));
        assert_eq!(config.osm, "rio.osm");
    }

    #[test]
    fn map_config_without_osm_defaults_to_empty() {
        let config: MapConfig = serde_json::from_value(serde_json::json!({
            "centerLat": 1, "centerLon": 2,
            "minLat": 0, "minLon": 1, "maxLat": 2, "maxLon": 3
        }))
        .unwrap();
        assert!(config.osm.is_empty());
    }

    #[test]
    fn simulation_info_tolerates_missing_fields() {
        let info: SimulationInfo =
            serde_json::from_value(serde_json::json!({"max_agents": 20, "step_time": 0.5}))
                .unwrap();
        assert_eq!(info.max_agents, 20);
        assert!(info.simulation_url.is_empty());
    }
}
