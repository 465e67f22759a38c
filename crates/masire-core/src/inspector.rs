//! Inspector panel: details of the selected entity.
//!
//! The panel lists every field of the selected entity in server order,
//! with a handful of fields reformatted for reading. The selection itself
//! is a [`EntityRef`] that outlives the step it was made in: each rendered
//! frame is searched for an entity with the same type and id, and the
//! panel is refreshed from it or hidden when none is present.

use std::fmt;

use masire_types::{Entity, EntityRef, Location};
use serde::Serialize;
use serde_json::Value;

use crate::render::Frame;

/// Fields holding a distance in map units, shown in kilometres.
const DISTANCE_FIELDS: [&str; 2] = ["destination_distance", "radius"];

/// A displayed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Preformatted text.
    Text(String),
    /// A list of preformatted items.
    List(Vec<String>),
    /// The value as received.
    Raw(Value),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::List(items) => f.write_str(&items.join(",")),
            Self::Raw(Value::String(text)) => f.write_str(text),
            Self::Raw(value) => write!(f, "{value}"),
        }
    }
}

/// One line of the inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectorField {
    /// Field name.
    pub key: String,
    /// Formatted value.
    pub value: FieldValue,
}

impl fmt::Display for InspectorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

/// Which entity is selected and whether the displayed step contains it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// The selected entity, once something has been clicked.
    pub target: Option<EntityRef>,
    /// Whether the displayed step contains the target.
    pub active: bool,
}

/// The entity detail panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InspectorPanel {
    /// Whether the panel is shown.
    pub visible: bool,
    /// Formatted fields of the selected entity.
    pub fields: Vec<InspectorField>,
    /// Selection state.
    pub selection: Selection,
}

impl InspectorPanel {
    /// A hidden, empty panel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `entity` and make it the selection.
    ///
    /// Replaces the field list; calling it twice with the same entity
    /// leaves the same panel.
    pub fn set_current_entity(&mut self, entity: &Entity) {
        self.fields = format_fields(entity);
        self.visible = true;
        self.selection.target = entity.entity_ref().ok();
        self.selection.active = true;
    }

    /// Re-match the selection against a freshly rendered frame.
    ///
    /// Refreshes the panel from the matching entity, or hides it when the
    /// frame has none. Returns whether the selection is active.
    pub fn refresh(&mut self, frame: &Frame) -> bool {
        self.selection.active = false;
        self.visible = false;
        let found = self
            .selection
            .target
            .as_ref()
            .and_then(|target| frame.find(target));
        if let Some(marker) = found {
            self.set_current_entity(&marker.entity);
        }
        self.selection.active
    }

    /// Select the entity `target` points at in `frame`, as a marker click
    /// would. Returns `false` and leaves the panel untouched when the
    /// frame has no such entity.
    pub fn select(&mut self, frame: &Frame, target: &EntityRef) -> bool {
        let Some(marker) = frame.find(target) else {
            return false;
        };
        self.set_current_entity(&marker.entity);
        true
    }
}

/// Format every field of `entity`, in order.
pub fn format_fields(entity: &Entity) -> Vec<InspectorField> {
    entity
        .fields()
        .iter()
        .map(|(key, value)| InspectorField {
            key: key.clone(),
            value: format_field(key, value),
        })
        .collect()
}

/// Format a single field.
pub fn format_field(key: &str, value: &Value) -> FieldValue {
    match key {
        "location" => Location::from_value(value).map_or_else(
            || FieldValue::Raw(value.clone()),
            |loc| FieldValue::Text(format!("[{}, {}]", loc.lat, loc.lon)),
        ),
        "route" => value.as_array().map_or_else(
            || FieldValue::Raw(value.clone()),
            |points| {
                FieldValue::List(
                    points
                        .iter()
                        .filter_map(Location::from_value)
                        .map(|p| format!("[{},{}]", p.lat, p.lon))
                        .collect(),
                )
            },
        ),
        "social_assets" => FieldValue::Raw(strip_locations(value)),
        k if DISTANCE_FIELDS.contains(&k) => value.as_f64().map_or_else(
            || FieldValue::Raw(value.clone()),
            |v| FieldValue::Text(format_km(v)),
        ),
        _ => FieldValue::Raw(value.clone()),
    }
}

/// A map-unit distance in kilometres with two decimals.
pub fn format_km(value: f64) -> String {
    format!("{} km", two_decimals(value * 100.0))
}

/// `x` with two decimals, exact halfway cases rounded away from zero.
///
/// `{:.2}` alone rounds such ties to even, which turns `0.125` into
/// `0.12` where a browser shows `0.13`.
fn two_decimals(x: f64) -> String {
    let hundredths = x * 100.0;
    let is_tie = hundredths.fract().abs().total_cmp(&0.5).is_eq()
        && (hundredths / 100.0).total_cmp(&x).is_eq();
    if is_tie {
        let away = (hundredths.trunc() + hundredths.signum()) / 100.0;
        return format!("{away:.2}");
    }
    format!("{x:.2}")
}

/// Nested assets with their `location` removed.
fn strip_locations(value: &Value) -> Value {
    match value {
        Value::Array(assets) => Value::Array(
            assets
                .iter()
                .map(|asset| match asset {
                    Value::Object(fields) => {
                        let mut fields = fields.clone();
                        fields.remove("location");
                        Value::Object(fields)
                    }
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use masire_types::{EntityType, StepData};
    use serde_json::json;

    use super::*;
    use crate::render::render_step;

    fn entity(value: Value) -> Entity {
        Entity::from_value(value).unwrap()
    }

    fn frame(value: Value) -> Frame {
        let step: StepData = serde_json::from_value(value).unwrap();
        render_step(&step).frame
    }

    fn victim_frame(id: u64) -> Frame {
        frame(json!({
            "environment": {"events": [
                {"type": "victim", "identifier": id, "lifetime": 12,
                 "location": {"lat": 1.0, "lon": 2.0}}
            ]}
        }))
    }

    #[test]
    fn radius_is_shown_in_km() {
        assert_eq!(
            format_field("radius", &json!(0.05)),
            FieldValue::Text(String::from("5.00 km"))
        );
        assert_eq!(
            format_field("destination_distance", &json!(0.5)),
            FieldValue::Text(String::from("50.00 km"))
        );
    }

    #[test]
    fn halfway_distances_round_up() {
        assert_eq!(two_decimals(0.125), "0.13");
        assert_eq!(two_decimals(0.625), "0.63");
        assert_eq!(two_decimals(-0.125), "-0.13");
        // 1.005 is stored just below the halfway point.
        assert_eq!(two_decimals(1.005), "1.00");
        assert_eq!(two_decimals(2.0), "2.00");
    }

    #[test]
    fn location_and_route_formatting() {
        assert_eq!(
            format_field("location", &json!({"lat": -22.5, "lon": 1})).to_string(),
            "[-22.5, 1]"
        );
        assert_eq!(
            format_field("route", &json!([{"lat": 1, "lon": 2}, {"lat": 3.5, "lon": 4}])),
            FieldValue::List(vec![String::from("[1,2]"), String::from("[3.5,4]")])
        );
    }

    #[test]
    fn social_assets_lose_their_location() {
        let value = format_field(
            "social_assets",
            &json!([{"token": "s1", "profession": "nurse", "location": {"lat": 0, "lon": 0}}]),
        );
        assert_eq!(
            value,
            FieldValue::Raw(json!([{"token": "s1", "profession": "nurse"}]))
        );
    }

    #[test]
    fn other_fields_are_raw() {
        assert_eq!(format_field("lifetime", &json!(4)), FieldValue::Raw(json!(4)));
        assert_eq!(format_field("role", &json!("drone")).to_string(), "drone");
    }

    #[test]
    fn set_current_entity_is_idempotent() {
        let flood = entity(json!({
            "type": "flood", "identifier": 3, "radius": 0.05,
            "location": {"lat": 1.0, "lon": 2.0}
        }));
        let mut panel = InspectorPanel::new();
        panel.set_current_entity(&flood);
        let first = panel.clone();
        panel.set_current_entity(&flood);
        assert_eq!(panel, first);
        assert!(panel.visible);
        assert_eq!(
            panel.fields.iter().map(|f| f.key.as_str()).collect::<Vec<_>>(),
            vec!["type", "identifier", "radius", "location"]
        );
    }

    #[test]
    fn selection_id_follows_entity_type() {
        let mut panel = InspectorPanel::new();
        panel.set_current_entity(&entity(json!({
            "type": "agent", "token": "drone-1", "identifier": 99, "role": "drone"
        })));
        assert_eq!(
            panel.selection.target,
            Some(EntityRef::new(EntityType::Agent, "drone-1"))
        );

        panel.set_current_entity(&entity(json!({"type": "photo", "identifier": 99})));
        assert_eq!(
            panel.selection.target,
            Some(EntityRef::new(EntityType::Photo, "99"))
        );
    }

    #[test]
    fn selection_persists_across_steps() {
        let mut panel = InspectorPanel::new();
        let target = EntityRef::new(EntityType::Victim, "7");
        assert!(panel.select(&victim_frame(7), &target));

        let next = frame(json!({
            "environment": {"events": [
                {"type": "victim", "identifier": 7, "lifetime": 2,
                 "location": {"lat": 1.0, "lon": 2.0}}
            ]}
        }));
        assert!(panel.refresh(&next));
        assert!(panel.visible);
        let lifetime = panel.fields.iter().find(|f| f.key == "lifetime").unwrap();
        assert_eq!(lifetime.value, FieldValue::Raw(json!(2)));
    }

    #[test]
    fn selection_absent_from_step_hides_panel() {
        let mut panel = InspectorPanel::new();
        let target = EntityRef::new(EntityType::Victim, "7");
        assert!(panel.select(&victim_frame(7), &target));

        assert!(!panel.refresh(&victim_frame(8)));
        assert!(!panel.visible);
        assert!(!panel.selection.active);
        // The selection is kept and comes back with the entity.
        assert_eq!(panel.selection.target, Some(target));
        assert!(panel.refresh(&victim_frame(7)));
        assert!(panel.visible);
    }

    #[test]
    fn same_id_different_type_is_not_a_match() {
        let mut panel = InspectorPanel::new();
        let target = EntityRef::new(EntityType::Photo, "7");
        assert!(!panel.select(&victim_frame(7), &target));
        assert!(!panel.visible);
        assert_eq!(panel.selection.target, None);
    }
}
