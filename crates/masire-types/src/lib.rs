//! Shared type definitions for the MASIRE monitor.
//!
//! Every payload the simulation server hands out is modelled here: the
//! static simulation configuration, per-match map configuration, match
//! counters and the per-step snapshot of events and actors. The monitor,
//! the sync client and the viewer API all speak these types.
//!
//! # Modules
//!
//! - [`location`] -- Geographic points and lenient coordinate parsing
//! - [`info`] -- [`SimulationInfo`], [`MatchInfo`] and [`MapConfig`]
//! - [`entity`] -- Events and actors, kept as raw JSON and classified on demand
//! - [`step`] -- [`StepData`], the full state of one simulation step
//! - [`error`] -- [`EntityError`] for malformed or unknown entity data

pub mod entity;
pub mod error;
pub mod info;
pub mod location;
pub mod step;

// Re-export all public types at crate root for convenience.
pub use entity::{AgentRole, Entity, EntityKind, EntityRef, EntityType, Profession};
pub use error::EntityError;
pub use info::{Bounds, MapConfig, MatchInfo, SimulationInfo};
pub use location::Location;
pub use step::{Environment, StepData};
