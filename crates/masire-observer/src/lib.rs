//! Viewer API server for the MASIRE monitor.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/frames`) streaming each newly drawn
//!   frame via [`tokio::sync::broadcast`]
//! - **Read endpoints** for the playback state, map view, frame,
//!   inspector and log
//! - **Control endpoints** for pause/resume, speed, step and match
//!   navigation, entity selection and the log toggle
//! - **Minimal HTML page** (`GET /`) with the counters and API links
//!
//! # Architecture
//!
//! The playback controller publishes a [`ViewerSnapshot`] after every
//! event it handles; all reads are served from that copy so the viewer
//! never blocks playback. Control endpoints go through the controller's
//! [`PlaybackHandle`] and wait for its verdict.
//!
//! [`ViewerSnapshot`]: masire_core::session::ViewerSnapshot
//! [`PlaybackHandle`]: masire_core::controller::PlaybackHandle

pub mod control;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve};
pub use state::{AppState, FrameBroadcast};
