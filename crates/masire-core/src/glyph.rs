//! Marker glyphs and the lookup tables choosing them.
//!
//! Which icon an entity gets is pure data: one table per sub-kind
//! (agent role, social asset profession, victim lifetime band). Adding an
//! entity kind means adding a row, not a branch.

use masire_types::{AgentRole, EntityKind, Profession};
use serde::Serialize;

/// Icon drawn for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Glyph {
    /// Flood center.
    Flood,
    /// Photo opportunity.
    Photo,
    /// Victim with plenty of time left.
    #[serde(rename = "victim_0")]
    Victim0,
    /// Victim with under ten steps left.
    #[serde(rename = "victim_1")]
    Victim1,
    /// Victim with under five steps left.
    #[serde(rename = "victim_2")]
    Victim2,
    /// Victim out of time.
    #[serde(rename = "victim_3")]
    Victim3,
    /// Water sample.
    WaterSample,
    /// Car.
    Car,
    /// Boat.
    Boat,
    /// Drone.
    Drone,
    /// Doctor.
    Doctor,
    /// Nurse.
    Nurse,
    /// Pharmacist.
    Pharmacist,
    /// Photographer.
    Photographer,
    /// Teacher.
    Teacher,
    /// Map center marker.
    Central,
}

/// Image and placement of a glyph, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IconSpec {
    /// Image URL relative to the page.
    pub url: &'static str,
    /// Width and height.
    pub size: [u16; 2],
    /// Point of the image placed on the coordinate.
    pub anchor: [u16; 2],
}

const EVENT_SIZE: [u16; 2] = [28, 35];
const EVENT_ANCHOR: [u16; 2] = [17, 18];
const VEHICLE_SIZE: [u16; 2] = [50, 55];
const VEHICLE_ANCHOR: [u16; 2] = [25, 27];
const PERSON_SIZE: [u16; 2] = [40, 45];
const PERSON_ANCHOR: [u16; 2] = [15, 13];

impl Glyph {
    /// The icon for this glyph.
    pub const fn icon(self) -> IconSpec {
        let (url, size, anchor) = match self {
            Self::Flood => ("/static/images/flood.png", EVENT_SIZE, EVENT_ANCHOR),
            Self::Photo => ("/static/images/photo.png", EVENT_SIZE, EVENT_ANCHOR),
            Self::Victim0 => ("/static/images/victim_0.png", EVENT_SIZE, EVENT_ANCHOR),
            Self::Victim1 => ("/static/images/victim_1.png", EVENT_SIZE, EVENT_ANCHOR),
            Self::Victim2 => ("/static/images/victim_2.png", EVENT_SIZE, EVENT_ANCHOR),
            Self::Victim3 => ("/static/images/victim_3.png", EVENT_SIZE, EVENT_ANCHOR),
            Self::WaterSample => ("/static/images/water_sample.png", EVENT_SIZE, EVENT_ANCHOR),
            Self::Car => ("/static/images/car.png", VEHICLE_SIZE, VEHICLE_ANCHOR),
            Self::Boat => ("/static/images/boat.png", VEHICLE_SIZE, VEHICLE_ANCHOR),
            Self::Drone => ("/static/images/drone.png", VEHICLE_SIZE, VEHICLE_ANCHOR),
            Self::Doctor => ("/static/images/doctor.png", PERSON_SIZE, PERSON_ANCHOR),
            Self::Nurse => ("/static/images/nurse.png", PERSON_SIZE, PERSON_ANCHOR),
            Self::Pharmacist => ("/static/images/pharmacist.png", PERSON_SIZE, PERSON_ANCHOR),
            Self::Photographer => ("/static/images/photographer.png", PERSON_SIZE, PERSON_ANCHOR),
            Self::Teacher => ("/static/images/teacher.png", PERSON_SIZE, PERSON_ANCHOR),
            Self::Central => ("/static/images/central.png", [40, 50], [20, 25]),
        };
        IconSpec { url, size, anchor }
    }
}

/// A range of victim lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifetimeBand {
    /// Exactly this many steps.
    Exactly(i64),
    /// Fewer than this many steps.
    Below(i64),
    /// Any lifetime.
    Any,
}

impl LifetimeBand {
    /// Whether `lifetime` falls in this band.
    pub const fn contains(self, lifetime: i64) -> bool {
        match self {
            Self::Exactly(n) => lifetime == n,
            Self::Below(n) => lifetime < n,
            Self::Any => true,
        }
    }
}

/// Victim glyphs by lifetime; the first matching band wins.
pub const VICTIM_GLYPHS: [(LifetimeBand, Glyph); 4] = [
    (LifetimeBand::Exactly(0), Glyph::Victim3),
    (LifetimeBand::Below(5), Glyph::Victim2),
    (LifetimeBand::Below(10), Glyph::Victim1),
    (LifetimeBand::Any, Glyph::Victim0),
];

/// Agent glyphs by role.
pub const ROLE_GLYPHS: [(AgentRole, Glyph); 8] = [
    (AgentRole::Drone, Glyph::Drone),
    (AgentRole::Car, Glyph::Car),
    (AgentRole::Boat, Glyph::Boat),
    (AgentRole::Analyser, Glyph::Boat),
    (AgentRole::Collector, Glyph::Boat),
    (AgentRole::Truck, Glyph::Doctor),
    (AgentRole::Ugv, Glyph::Nurse),
    (AgentRole::Helicopter, Glyph::Photographer),
];

/// Social asset glyphs by profession.
pub const PROFESSION_GLYPHS: [(Profession, Glyph); 6] = [
    (Profession::Doctor, Glyph::Doctor),
    (Profession::Nurse, Glyph::Nurse),
    (Profession::Pharmacist, Glyph::Pharmacist),
    (Profession::Teacher, Glyph::Teacher),
    (Profession::Photographer, Glyph::Photographer),
    (Profession::Volunteer, Glyph::Teacher),
];

/// Choose the glyph for a classified entity.
///
/// Returns `None` only if a table is missing a row for a known sub-kind.
pub fn glyph_for(kind: &EntityKind) -> Option<Glyph> {
    match *kind {
        EntityKind::Flood { .. } => Some(Glyph::Flood),
        EntityKind::Photo => Some(Glyph::Photo),
        EntityKind::WaterSample => Some(Glyph::WaterSample),
        EntityKind::Victim { lifetime } => VICTIM_GLYPHS
            .iter()
            .find(|(band, _)| band.contains(lifetime))
            .map(|&(_, glyph)| glyph),
        EntityKind::Agent { role } => lookup(&ROLE_GLYPHS, role),
        EntityKind::SocialAsset { profession } => lookup(&PROFESSION_GLYPHS, profession),
    }
}

fn lookup<K: PartialEq + Copy>(table: &[(K, Glyph)], key: K) -> Option<Glyph> {
    table.iter().find(|(k, _)| *k == key).map(|&(_, glyph)| glyph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn victim(lifetime: i64) -> Option<Glyph> {
        glyph_for(&EntityKind::Victim { lifetime })
    }

    #[test]
    fn victim_lifetime_bands() {
        assert_eq!(victim(0), Some(Glyph::Victim3));
        assert_eq!(victim(1), Some(Glyph::Victim2));
        assert_eq!(victim(4), Some(Glyph::Victim2));
        assert_eq!(victim(5), Some(Glyph::Victim1));
        assert_eq!(victim(9), Some(Glyph::Victim1));
        assert_eq!(victim(10), Some(Glyph::Victim0));
        assert_eq!(victim(400), Some(Glyph::Victim0));
    }

    #[test]
    fn every_role_and_profession_has_a_glyph() {
        for role in AgentRole::ALL {
            assert!(glyph_for(&EntityKind::Agent { role }).is_some(), "{role:?}");
        }
        for profession in Profession::ALL {
            assert!(
                glyph_for(&EntityKind::SocialAsset { profession }).is_some(),
                "{profession:?}"
            );
        }
    }

    #[test]
    fn shared_glyphs() {
        assert_eq!(
            glyph_for(&EntityKind::Agent {
                role: AgentRole::Collector
            }),
            Some(Glyph::Boat)
        );
        assert_eq!(
            glyph_for(&EntityKind::Agent {
                role: AgentRole::Helicopter
            }),
            Some(Glyph::Photographer)
        );
        assert_eq!(
            glyph_for(&EntityKind::SocialAsset {
                profession: Profession::Volunteer
            }),
            Some(Glyph::Teacher)
        );
    }

    #[test]
    fn icon_sizes_follow_category() {
        assert_eq!(Glyph::Photo.icon().size, [28, 35]);
        assert_eq!(Glyph::Drone.icon().anchor, [25, 27]);
        assert_eq!(Glyph::Nurse.icon().size, [40, 45]);
        assert_eq!(Glyph::Central.icon().url, "/static/images/central.png");
    }

    #[test]
    fn glyph_names_on_the_wire() {
        assert_eq!(
            serde_json::to_value(Glyph::Victim2).ok(),
            Some(serde_json::json!("victim_2"))
        );
        assert_eq!(
            serde_json::to_value(Glyph::WaterSample).ok(),
            Some(serde_json::json!("water_sample"))
        );
    }
}
