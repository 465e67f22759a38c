//! Step rendering: from [`StepData`] to markers and overlays.
//!
//! A [`Frame`] is everything drawn on the map's variable layer for one
//! step. Rendering is best-effort: an entity that cannot be drawn is
//! reported in [`RenderOutcome::errors`] and skipped while the rest of the
//! frame is still produced.

use masire_types::{Entity, EntityError, EntityKind, EntityRef, EntityType, Location, StepData};
use serde::Serialize;
use tracing::debug;

use crate::dedup::PlacedLocations;
use crate::glyph::{Glyph, glyph_for};

/// Metres of drawn radius per unit of a flood's `radius` field.
pub const FLOOD_RADIUS_SCALE_M: f64 = 109_000.0;

/// Radius of a route point, in metres.
pub const ROUTE_POINT_RADIUS_M: f64 = 10.0;

const FLOOD_STYLE: CircleStyle = CircleStyle {
    color: "#504E0F",
    fill_color: Some("#504E0F"),
    fill_opacity: Some(0.65),
};

const ROUTE_STYLE: CircleStyle = CircleStyle {
    color: "red",
    fill_color: None,
    fill_opacity: None,
};

/// A clickable icon on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Where the icon is drawn, after de-overlapping.
    pub position: Location,
    /// The icon.
    pub glyph: Glyph,
    /// The entity a click selects, when it carries an id.
    pub target: Option<EntityRef>,
    /// The entity as received.
    pub entity: Entity,
}

/// Stroke and fill of a circle overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleStyle {
    /// Stroke color.
    pub color: &'static str,
    /// Fill color, when filled.
    pub fill_color: Option<&'static str>,
    /// Fill opacity, when filled.
    pub fill_opacity: Option<f64>,
}

/// A non-interactive shape on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Overlay {
    /// A circle with a radius in metres.
    Circle {
        /// Circle center.
        center: Location,
        /// Radius in metres.
        radius_m: f64,
        /// Drawing style.
        style: CircleStyle,
    },
}

/// Everything drawn for one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    /// Entity markers, events first, in server order.
    pub markers: Vec<Marker>,
    /// Flood areas and route points.
    pub overlays: Vec<Overlay>,
    /// Number of actors in the step.
    pub active_agents: usize,
}

impl Frame {
    /// The marker of the entity `selection` points at.
    pub fn find(&self, selection: &EntityRef) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|m| m.target.as_ref() == Some(selection))
    }
}

/// A rendered frame plus the entities that could not be drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutcome {
    /// The frame.
    pub frame: Frame,
    /// One entry per skipped entity.
    pub errors: Vec<EntityError>,
}

/// Render a step.
///
/// Events are drawn before actors and both share one de-overlapping pass.
/// Events of unknown type are skipped silently; actors that cannot be
/// classified are reported.
pub fn render_step(step: &StepData) -> RenderOutcome {
    let mut outcome = RenderOutcome::default();
    let mut placed = PlacedLocations::new();

    for event in &step.environment.events {
        match event.entity_type() {
            Ok(t) if !t.is_actor() => {}
            Ok(_) | Err(_) => {
                debug!(entity_type = ?event.type_name(), "skipping event of unknown type");
                continue;
            }
        }
        if let Err(e) = render_entity(event, &mut placed, &mut outcome.frame) {
            outcome.errors.push(e);
        }
    }

    outcome.frame.active_agents = step.actors.len();

    for actor in &step.actors {
        let result = match actor.entity_type() {
            Ok(t) if t.is_actor() => render_entity(actor, &mut placed, &mut outcome.frame),
            Ok(t) => Err(EntityError::UnknownType(t.as_str().to_owned())),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            outcome.errors.push(e);
        }
    }

    outcome
}

/// Draw one entity: its marker, plus a flood area or a route.
fn render_entity(
    entity: &Entity,
    placed: &mut PlacedLocations,
    frame: &mut Frame,
) -> Result<(), EntityError> {
    let kind = entity.classify()?;
    let location = entity.location()?;
    let glyph = glyph_for(&kind).ok_or_else(|| match kind {
        EntityKind::SocialAsset { profession } => {
            EntityError::UnknownProfession(profession.as_str().to_owned())
        }
        EntityKind::Agent { role } => EntityError::UnknownRole(role.as_str().to_owned()),
        other => EntityError::UnknownType(other.entity_type().as_str().to_owned()),
    })?;

    let position = placed.place(location);

    if let EntityKind::Flood { radius } = kind {
        frame.overlays.push(Overlay::Circle {
            center: position,
            radius_m: radius * FLOOD_RADIUS_SCALE_M,
            style: FLOOD_STYLE,
        });
    }

    frame.markers.push(Marker {
        position,
        glyph,
        target: entity.entity_ref().ok(),
        entity: entity.clone(),
    });

    if kind.entity_type() == EntityType::Agent || kind.entity_type() == EntityType::SocialAsset {
        frame
            .overlays
            .extend(entity.route().into_iter().map(|point| Overlay::Circle {
                center: point,
                radius_m: ROUTE_POINT_RADIUS_M,
                style: ROUTE_STYLE,
            }));
    }

    Ok(())
}
