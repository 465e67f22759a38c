//! The per-step snapshot served by `GET /simulator/match/{match}/step/{step}`.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Full state of one simulation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    /// Environment phenomena of this step.
    #[serde(default)]
    pub environment: Environment,
    /// Agents and social assets of this step.
    #[serde(default)]
    pub actors: Vec<Entity>,
}

/// The environment part of a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Floods, victims, photos and water samples.
    #[serde(default)]
    pub events: Vec<Entity>,
}

impl StepData {
    /// Events followed by actors, the order in which a step is drawn.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.environment.events.iter().chain(self.actors.iter())
    }
}
