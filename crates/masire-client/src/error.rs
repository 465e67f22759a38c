//! Error types for the sync client.
//!
//! Everything that can go wrong between sending a request and holding a
//! decoded payload is a [`SyncError`]. The monitor treats all of them the
//! same way: log, roll back the speculative counter change, and wait for
//! the next timer tick.

/// Errors that can occur while fetching from the simulation server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The server answered with a non-success status.
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        /// The endpoint that was requested.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// The error body's `message`, or the whole body.
        message: String,
    },

    /// The request never produced a response (connection, timeout).
    #[error("request to {endpoint} failed: {message}")]
    Transport {
        /// The endpoint that was requested.
        endpoint: String,
        /// Description of the failure.
        message: String,
    },

    /// The response body could not be decoded into the expected payload.
    #[error("invalid response from {endpoint}: {message}")]
    Decode {
        /// The endpoint that was requested.
        endpoint: String,
        /// Description of the decode failure.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("client setup failed: {0}")]
    Setup(String),
}

impl SyncError {
    /// The text shown in the monitor log for this error.
    ///
    /// For server-reported failures this is the message from the error body
    /// alone, matching what the server meant to tell the operator.
    pub fn log_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// The HTTP status, for server-reported failures.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
