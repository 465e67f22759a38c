//! Geographic points.
//!
//! The simulation server is not consistent about how it encodes numbers:
//! map configuration coordinates have been observed both as JSON numbers and
//! as numeric strings. [`lenient_f64`] accepts either.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl Location {
    /// Create a location from latitude and longitude.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates are exactly equal to `other`'s.
    ///
    /// Exact comparison is intended: two markers collide only when they
    /// would be drawn on the very same point.
    #[allow(clippy::float_cmp)]
    pub fn coincides_with(&self, other: &Self) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }

    /// Whether the point lies within `[-90, 90]` latitude and
    /// `[-180, 180]` longitude.
    pub fn is_on_globe(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// Read a location out of a JSON object with `lat` and `lon` members.
    ///
    /// Returns `None` when the value is not an object, either coordinate
    /// is missing or non-numeric, or the point is off the globe.
    pub fn from_value(value: &Value) -> Option<Self> {
        let lat = value.get("lat").and_then(number_like)?;
        let lon = value.get("lon").and_then(number_like)?;
        Some(Self { lat, lon }).filter(Self::is_on_globe)
    }
}

/// Interpret a JSON value as a finite float, accepting numeric strings.
pub fn number_like(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Serde helper deserializing an `f64` from a number or a numeric string.
///
/// # Errors
///
/// Fails when the value is neither a number nor a string parseable as one.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    number_like(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a coordinate, got {raw}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn coincidence_requires_both_coordinates() {
        let a = Location::new(1.5, 2.5);
        assert!(a.coincides_with(&Location::new(1.5, 2.5)));
        assert!(!a.coincides_with(&Location::new(1.5, 2.6)));
        assert!(!a.coincides_with(&Location::new(1.6, 2.5)));
    }

    #[test]
    fn from_value_reads_numbers_and_strings() {
        let loc = Location::from_value(&serde_json::json!({"lat": -22.8, "lon": "-43.2"}));
        assert_eq!(loc, Some(Location::new(-22.8, -43.2)));
    }

    #[test]
    fn from_value_rejects_incomplete_objects() {
        assert!(Location::from_value(&serde_json::json!({"lat": 1.0})).is_none());
        assert!(Location::from_value(&serde_json::json!({"lat": true, "lon": 1.0})).is_none());
        assert!(Location::from_value(&serde_json::json!([1.0, 2.0])).is_none());
    }

    #[test]
    fn non_finite_strings_are_not_numbers() {
        assert_eq!(number_like(&serde_json::json!("inf")), None);
        assert_eq!(number_like(&serde_json::json!("-infinity")), None);
        assert_eq!(number_like(&serde_json::json!("NaN")), None);
        assert_eq!(number_like(&serde_json::json!("1e3")), Some(1000.0));
    }

    #[test]
    fn from_value_rejects_points_off_the_globe() {
        assert!(Location::from_value(&serde_json::json!({"lat": 1e13, "lon": 0.0})).is_none());
        assert!(Location::from_value(&serde_json::json!({"lat": "inf", "lon": 0.0})).is_none());
        assert!(Location::from_value(&serde_json::json!({"lat": 0.0, "lon": -180.5})).is_none());
        assert!(Location::from_value(&serde_json::json!({"lat": -90.0, "lon": 180.0})).is_some());
    }

    #[test]
    fn lenient_f64_accepts_strings() {
        #[derive(Deserialize)]
        struct Coordinate {
            #[serde(deserialize_with = "lenient_f64")]
            value: f64,
        }

        let parsed: Coordinate = serde_json::from_str(r#"{"value": " 12.25 "}"#).unwrap();
        assert!((parsed.value - 12.25).abs() < f64::EPSILON);

        let bad = serde_json::from_str::<Coordinate>(r#"{"value": "north"}"#);
        assert!(bad.is_err());
    }
}
