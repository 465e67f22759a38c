//! Playback, rendering and inspection for the MASIRE monitor.
//!
//! This crate owns everything between the sync client and the viewer: the
//! playback state machine and its async driver, the step renderer with its
//! marker de-overlapping, the per-match map view, the inspector and log
//! panels, and configuration loading.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `masire-monitor.yaml` into
//!   strongly-typed structs.
//! - [`controller`] -- [`PlaybackController`], the timer/command/fetch loop,
//!   and the [`PlaybackHandle`] that commands it.
//! - [`dedup`] -- Nudging coincident markers apart.
//! - [`error`] -- [`PlaybackError`] for rejected operator commands.
//! - [`glyph`] -- Marker icons and the tables choosing them.
//! - [`inspector`] -- The selected entity's detail panel.
//! - [`log`] -- The severity-tagged log panel.
//! - [`map_view`] -- Viewport and layers of the active match.
//! - [`render`] -- Turning a step into markers and overlays.
//! - [`session`] -- [`PlaybackSession`], the I/O-free state machine.
//!
//! [`PlaybackController`]: controller::PlaybackController
//! [`PlaybackHandle`]: controller::PlaybackHandle
//! [`PlaybackError`]: error::PlaybackError
//! [`PlaybackSession`]: session::PlaybackSession

pub mod config;
pub mod controller;
pub mod dedup;
pub mod error;
pub mod glyph;
pub mod inspector;
pub mod log;
pub mod map_view;
pub mod render;
pub mod session;
