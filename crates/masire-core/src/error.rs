//! Error types for playback control.
//!
//! A [`PlaybackError`] is a rejected operator command: the session state
//! did not change and one entry was written to the log panel. Fetch
//! failures are not errors of the command that caused them; they arrive
//! later, roll back the cursor and are logged where they are applied.

use masire_types::EntityType;

/// Reasons a playback command is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// No match has been loaded yet.
    #[error("No match loaded yet.")]
    NotStarted,

    /// A match switch is still waiting for its map.
    #[error("Match {0} is still loading.")]
    MatchLoading(u64),

    /// The cursor is already on the first step.
    #[error("Already in the first step.")]
    FirstStep,

    /// The cursor is already on the first match.
    #[error("Already in the first match.")]
    FirstMatch,

    /// The requested step interval is below the supported minimum.
    #[error("Step interval must be at least {min} ms, got {requested} ms.")]
    SpeedTooFast {
        /// The requested interval in milliseconds.
        requested: u64,
        /// The smallest accepted interval in milliseconds.
        min: u64,
    },

    /// The displayed step holds no entity with this type and id.
    #[error("Entity not found: {entity_type} {id}")]
    EntityNotFound {
        /// The requested entity type.
        entity_type: EntityType,
        /// The requested id.
        id: String,
    },

    /// The playback controller is no longer running.
    #[error("playback controller has stopped")]
    Stopped,
}
