//! Events and actors.
//!
//! The inspector panel shows every field the server sends, including ones
//! the monitor has never heard of, so an [`Entity`] keeps its full JSON
//! object. Typed access goes through [`Entity::classify`], which reads the
//! handful of fields that decide how the entity is drawn and returns an
//! [`EntityKind`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EntityError;
use crate::location::Location;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// The `type` tag of an event or actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A flooded area.
    Flood,
    /// A person waiting to be rescued.
    Victim,
    /// A photo opportunity.
    Photo,
    /// A water sample to be collected.
    WaterSample,
    /// A vehicle or drone controlled by a team.
    Agent,
    /// A person with a profession recruited to help.
    SocialAsset,
}

impl EntityType {
    /// Every entity type, events first.
    pub const ALL: [Self; 6] = [
        Self::Flood,
        Self::Victim,
        Self::Photo,
        Self::WaterSample,
        Self::Agent,
        Self::SocialAsset,
    ];

    /// The wire name of this type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flood => "flood",
            Self::Victim => "victim",
            Self::Photo => "photo",
            Self::WaterSample => "water_sample",
            Self::Agent => "agent",
            Self::SocialAsset => "social_asset",
        }
    }

    /// Look a type up by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Whether this type is an actor (identified by `token`) rather than an
    /// event (identified by `identifier`).
    pub const fn is_actor(self) -> bool {
        matches!(self, Self::Agent | Self::SocialAsset)
    }

    /// The field holding this type's selection identity.
    pub const fn id_field(self) -> &'static str {
        if self.is_actor() { "token" } else { "identifier" }
    }
}

impl core::fmt::Display for EntityType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Aerial drone.
    Drone,
    /// Road vehicle.
    Car,
    /// Boat.
    Boat,
    /// Water sample analyser.
    Analyser,
    /// Water sample collector.
    Collector,
    /// Heavy truck.
    Truck,
    /// Unmanned ground vehicle.
    Ugv,
    /// Helicopter.
    Helicopter,
}

impl AgentRole {
    /// Every known role.
    pub const ALL: [Self; 8] = [
        Self::Drone,
        Self::Car,
        Self::Boat,
        Self::Analyser,
        Self::Collector,
        Self::Truck,
        Self::Ugv,
        Self::Helicopter,
    ];

    /// The wire name of this role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drone => "drone",
            Self::Car => "car",
            Self::Boat => "boat",
            Self::Analyser => "analyser",
            Self::Collector => "collector",
            Self::Truck => "truck",
            Self::Ugv => "ugv",
            Self::Helicopter => "helicopter",
        }
    }

    /// Look a role up by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

/// The profession of a social asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    /// Doctor.
    Doctor,
    /// Nurse.
    Nurse,
    /// Pharmacist.
    Pharmacist,
    /// Teacher.
    Teacher,
    /// Photographer.
    Photographer,
    /// Volunteer.
    Volunteer,
}

impl Profession {
    /// Every known profession.
    pub const ALL: [Self; 6] = [
        Self::Doctor,
        Self::Nurse,
        Self::Pharmacist,
        Self::Teacher,
        Self::Photographer,
        Self::Volunteer,
    ];

    /// The wire name of this profession.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
            Self::Pharmacist => "pharmacist",
            Self::Teacher => "teacher",
            Self::Photographer => "photographer",
            Self::Volunteer => "volunteer",
        }
    }

    /// Look a profession up by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// The drawing-relevant view of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    /// A flood with its influence radius (in degrees).
    Flood {
        /// Radius of the flooded area.
        radius: f64,
    },
    /// A victim with the number of steps it has left.
    Victim {
        /// Remaining lifetime in steps.
        lifetime: i64,
    },
    /// A photo opportunity.
    Photo,
    /// A water sample.
    WaterSample,
    /// An agent with its role.
    Agent {
        /// The agent's role.
        role: AgentRole,
    },
    /// A social asset with its profession.
    SocialAsset {
        /// The asset's profession.
        profession: Profession,
    },
}

impl EntityKind {
    /// The type tag this kind belongs to.
    pub const fn entity_type(&self) -> EntityType {
        match self {
            Self::Flood { .. } => EntityType::Flood,
            Self::Victim { .. } => EntityType::Victim,
            Self::Photo => EntityType::Photo,
            Self::WaterSample => EntityType::WaterSample,
            Self::Agent { .. } => EntityType::Agent,
            Self::SocialAsset { .. } => EntityType::SocialAsset,
        }
    }
}

/// The identity of an entity across steps: its type and its id.
///
/// Ids are compared by their textual form, so a numeric `7` and a string
/// `"7"` refer to the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// The entity's type tag.
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// The entity's `token` (actors) or `identifier` (events).
    pub id: String,
}

impl EntityRef {
    /// Create a reference from a type and any id convertible to a string.
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self {
            entity_type,
            id: id.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An event or actor as sent by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    /// Wrap a JSON object.
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build an entity from a JSON value, returning `None` unless it is an
    /// object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// All fields in server order.
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// A single field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The raw `type` member, if it is a string.
    pub fn type_name(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// The parsed `type` member.
    ///
    /// # Errors
    ///
    /// [`EntityError::MissingField`] without a string `type`,
    /// [`EntityError::UnknownType`] for an unrecognized one.
    pub fn entity_type(&self) -> Result<EntityType, EntityError> {
        let name = self.type_name().ok_or_else(|| EntityError::MissingField {
            entity: String::from("entity"),
            field: "type",
        })?;
        EntityType::parse(name).ok_or_else(|| EntityError::UnknownType(name.to_owned()))
    }

    /// The entity's position.
    ///
    /// # Errors
    ///
    /// Fails if `location` is absent or not a `{lat, lon}` object.
    pub fn location(&self) -> Result<Location, EntityError> {
        let raw = self.0.get("location").ok_or_else(|| EntityError::MissingField {
            entity: self.label(),
            field: "location",
        })?;
        Location::from_value(raw).ok_or_else(|| EntityError::InvalidField {
            entity: self.label(),
            field: "location",
            reason: format!("expected {{lat, lon}} on the globe, got {raw}"),
        })
    }

    /// The entity's route, in travel order.
    ///
    /// A missing or null route is empty; malformed points are dropped.
    pub fn route(&self) -> Vec<Location> {
        self.0
            .get("route")
            .and_then(Value::as_array)
            .map(|points| points.iter().filter_map(Location::from_value).collect())
            .unwrap_or_default()
    }

    /// The type and id pair identifying this entity across steps.
    ///
    /// # Errors
    ///
    /// Fails if the type is unknown or the id field is missing.
    pub fn entity_ref(&self) -> Result<EntityRef, EntityError> {
        let entity_type = self.entity_type()?;
        let field = entity_type.id_field();
        let id = self
            .0
            .get(field)
            .and_then(id_text)
            .ok_or_else(|| EntityError::MissingField {
                entity: entity_type.as_str().to_owned(),
                field,
            })?;
        Ok(EntityRef { entity_type, id })
    }

    /// Read the fields that decide how this entity is drawn.
    ///
    /// # Errors
    ///
    /// Returns an [`EntityError`] for an unknown type, role or profession,
    /// or when a type-specific field (`radius`, `lifetime`, `role`,
    /// `profession`) is missing.
    pub fn classify(&self) -> Result<EntityKind, EntityError> {
        let entity_type = self.entity_type()?;
        let kind = match entity_type {
            EntityType::Flood => EntityKind::Flood {
                radius: self.number("radius", entity_type)?,
            },
            EntityType::Victim => {
                let raw = self.require("lifetime", entity_type)?;
                let lifetime = raw
                    .as_i64()
                    .or_else(|| raw.as_f64().map(truncate_lifetime))
                    .ok_or_else(|| EntityError::InvalidField {
                        entity: entity_type.as_str().to_owned(),
                        field: "lifetime",
                        reason: format!("expected a number, got {raw}"),
                    })?;
                EntityKind::Victim { lifetime }
            }
            EntityType::Photo => EntityKind::Photo,
            EntityType::WaterSample => EntityKind::WaterSample,
            EntityType::Agent => {
                let name = self.text("role", entity_type)?;
                let role =
                    AgentRole::parse(name).ok_or_else(|| EntityError::UnknownRole(name.to_owned()))?;
                EntityKind::Agent { role }
            }
            EntityType::SocialAsset => {
                let name = self.text("profession", entity_type)?;
                let profession = Profession::parse(name)
                    .ok_or_else(|| EntityError::UnknownProfession(name.to_owned()))?;
                EntityKind::SocialAsset { profession }
            }
        };
        Ok(kind)
    }

    fn label(&self) -> String {
        self.type_name().unwrap_or("entity").to_owned()
    }

    fn require(&self, field: &'static str, entity_type: EntityType) -> Result<&Value, EntityError> {
        self.0.get(field).ok_or_else(|| EntityError::MissingField {
            entity: entity_type.as_str().to_owned(),
            field,
        })
    }

    fn number(&self, field: &'static str, entity_type: EntityType) -> Result<f64, EntityError> {
        let raw = self.require(field, entity_type)?;
        raw.as_f64().ok_or_else(|| EntityError::InvalidField {
            entity: entity_type.as_str().to_owned(),
            field,
            reason: format!("expected a number, got {raw}"),
        })
    }

    fn text(&self, field: &'static str, entity_type: EntityType) -> Result<&str, EntityError> {
        let raw = self.require(field, entity_type)?;
        raw.as_str().ok_or_else(|| EntityError::InvalidField {
            entity: entity_type.as_str().to_owned(),
            field,
            reason: format!("expected a string, got {raw}"),
        })
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Textual form of an id value. Strings are taken verbatim, numbers in
/// their JSON spelling; anything else has no id.
pub fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Lifetimes are step counts; fractional values round toward zero.
#[allow(clippy::cast_possible_truncation)]
fn truncate_lifetime(value: f64) -> i64 {
    value.trunc() as i64
}
