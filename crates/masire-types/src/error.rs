//! Error types for entity classification.
//!
//! These are the "application errors" of the monitor: the server answered,
//! but an entity in the payload is missing a field or carries a value the
//! monitor does not know how to draw. They are never fatal; the offending
//! entity is skipped and the rest of the frame renders.

/// Errors raised while reading an event or actor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    /// A required field is absent.
    #[error("{entity} is missing field '{field}'")]
    MissingField {
        /// The entity type, or `entity` if the type itself is unknown.
        entity: String,
        /// The missing field.
        field: &'static str,
    },

    /// A field is present but has the wrong shape.
    #[error("{entity} has invalid field '{field}': {reason}")]
    InvalidField {
        /// The entity type.
        entity: String,
        /// The offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The `type` member names no known event or actor.
    #[error("Type not found: {0}")]
    UnknownType(String),

    /// An agent carries a role with no glyph.
    #[error("Role not found: {0}")]
    UnknownRole(String),

    /// A social asset carries a profession with no glyph.
    #[error("Profession not found: {0}")]
    UnknownProfession(String),
}
