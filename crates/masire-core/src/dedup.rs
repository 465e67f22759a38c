//! Marker de-overlapping.
//!
//! Several entities often share a location (an agent standing on a victim,
//! a photo taken at a flood center). Drawn as-is, only the topmost marker
//! would be clickable. Before a marker is placed its position is nudged
//! north in fixed increments until it no longer coincides with any marker
//! already placed in the same pass.
//!
//! Collisions resolve one increment at a time, so a long column of
//! identical points costs quadratic work. Steps carry few entities, which
//! keeps this cheap in practice.

use masire_types::Location;

/// Latitude increment applied per collision, in degrees.
pub const LATITUDE_STEP: f64 = 0.0001;

/// Shift `location` north until it coincides with none of `placed`.
///
/// `placed` is only read; the adjusted position is returned. A latitude
/// too large for the increment to register is returned as it stands.
pub fn format_location(location: Location, placed: &[Location]) -> Location {
    let mut candidate = location;
    while placed.iter().any(|p| p.coincides_with(&candidate)) {
        let next = candidate.lat + LATITUDE_STEP;
        if next.total_cmp(&candidate.lat).is_eq() {
            break;
        }
        candidate.lat = next;
    }
    candidate
}

/// The positions placed so far in one rendering pass.
///
/// Events and actors share one pass, so render order decides which of two
/// coincident entities keeps its true position.
#[derive(Debug, Clone, Default)]
pub struct PlacedLocations {
    placed: Vec<Location>,
}

impl PlacedLocations {
    /// Start an empty pass.
    pub const fn new() -> Self {
        Self { placed: Vec::new() }
    }

    /// Resolve `location` against the pass and record the result.
    pub fn place(&mut self, location: Location) -> Location {
        let resolved = format_location(location, &self.placed);
        self.placed.push(resolved);
        resolved
    }

    /// Positions placed so far, in placement order.
    pub fn as_slice(&self) -> &[Location] {
        &self.placed
    }
}
