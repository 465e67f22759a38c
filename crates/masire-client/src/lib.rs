//! Sync client for the MASIRE simulation server.
//!
//! The monitor never talks HTTP directly: every fetch goes through the
//! [`SimulatorApi`] trait, whose production implementation is
//! [`SyncClient`] (a thin `reqwest` wrapper). Tests substitute in-memory
//! fakes.
//!
//! # Modules
//!
//! - [`client`] -- [`SimulatorApi`], [`SyncClient`] and [`Endpoint`]
//! - [`error`] -- [`SyncError`], the network error taxonomy

pub mod client;
pub mod error;

pub use client::{ClientConfig, Endpoint, SimulatorApi, SyncClient};
pub use error::SyncError;
