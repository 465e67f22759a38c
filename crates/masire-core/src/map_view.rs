//! The map view of one match.
//!
//! A [`MapView`] is built from a match's [`MapConfig`] and lives until the
//! active match changes, at which point the session replaces it wholesale.
//! It has two layers: a constant one (boundary rectangle and center
//! marker) fixed at creation, and a variable one holding the current
//! [`Frame`], replaced on every rendered step.

use masire_types::{Bounds, Location, MapConfig};
use serde::Serialize;
use uuid::Uuid;

use crate::config::MapSection;
use crate::glyph::Glyph;
use crate::render::Frame;

/// Stroke weight of the boundary rectangle.
pub const BOUNDARY_WEIGHT: u8 = 1;

/// Unique identifier of a map view.
///
/// Every view gets a fresh, time-ordered id, so observers can tell a
/// replaced view from a redrawn one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MapViewId(pub Uuid);

impl MapViewId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MapViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for MapViewId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The simulated area outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Boundary {
    /// Corners of the area.
    pub bounds: Bounds,
    /// Stroke weight.
    pub weight: u8,
}

/// The marker placed on the map center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CentralMarker {
    /// Marker position.
    pub position: Location,
    /// Marker icon.
    pub glyph: Glyph,
}

/// Tile source of the base map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileLayer {
    /// URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    /// Attribution HTML.
    pub attribution: String,
    /// Highest zoom level served.
    pub max_zoom: u8,
}

/// Viewport and layers of the active match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// Identity of this view.
    pub id: MapViewId,
    /// The match this view belongs to.
    pub match_index: u64,
    /// Viewport center.
    pub center: Location,
    /// Viewport zoom level.
    pub zoom: u8,
    /// Name of the map file the match runs on.
    pub osm: String,
    /// Base map tiles.
    pub tiles: TileLayer,
    /// Constant layer: area outline.
    pub boundary: Boundary,
    /// Constant layer: center marker.
    pub central_marker: CentralMarker,
    /// Variable layer: the displayed step.
    pub frame: Frame,
}

impl MapView {
    /// Build a fresh view for `match_index` with an empty variable layer.
    pub fn new(match_index: u64, config: &MapConfig, section: &MapSection) -> Self {
        let center = config.center();
        Self {
            id: MapViewId::new(),
            match_index,
            center,
            zoom: section.zoom,
            osm: config.osm.clone(),
            tiles: TileLayer {
                url_template: section.tile_url.clone(),
                attribution: section.attribution.clone(),
                max_zoom: section.max_zoom,
            },
            boundary: Boundary {
                bounds: config.bounds(),
                weight: BOUNDARY_WEIGHT,
            },
            central_marker: CentralMarker {
                position: center,
                glyph: Glyph::Central,
            },
            frame: Frame::default(),
        }
    }

    /// Replace the variable layer.
    pub fn show(&mut self, frame: Frame) {
        self.frame = frame;
    }

    /// Empty the variable layer.
    pub fn clear(&mut self) {
        self.frame = Frame::default();
    }
}

/// Text shown for a right-clicked map coordinate.
pub fn describe_point(lat: f64, lon: f64) -> String {
    format!("Lat: {lat}\nLon:{lon}")
}
