//! Shared application state for the viewer API.
//!
//! [`AppState`] holds the broadcast channel for frame updates, the latest
//! [`ViewerSnapshot`] published by the playback controller, and the
//! [`PlaybackHandle`] the control endpoints send commands through. Reads
//! never touch the playback session itself.

use std::sync::Arc;

use masire_core::controller::PlaybackHandle;
use masire_core::map_view::MapViewId;
use masire_core::render::Frame;
use masire_core::session::{PlaybackSession, ViewerSnapshot};
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast channel for frame updates.
///
/// A subscriber that falls behind by more than this many messages
/// receives [`broadcast::error::RecvError::Lagged`] and skips ahead.
const BROADCAST_CAPACITY: usize = 64;

/// JSON-serializable frame update pushed over the `WebSocket`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FrameBroadcast {
    /// Match the frame belongs to.
    pub match_index: u64,
    /// Step the frame shows, if one has been drawn.
    pub step: Option<u64>,
    /// The map view the frame is drawn on. Changes on a match switch.
    pub map_view_id: MapViewId,
    /// Markers and overlays.
    pub frame: Frame,
}

impl FrameBroadcast {
    /// The displayed frame of `session`, if a map view exists.
    pub fn of(session: &PlaybackSession) -> Option<Self> {
        let view = session.map_view()?;
        Some(Self {
            match_index: view.match_index,
            step: session.cursor().step,
            map_view_id: view.id,
            frame: view.frame.clone(),
        })
    }

    /// The displayed frame of a published snapshot, if a match is loaded.
    pub fn from_snapshot(snapshot: &ViewerSnapshot) -> Option<Self> {
        let view = snapshot.map.as_ref()?;
        Some(Self {
            match_index: view.match_index,
            step: snapshot.cursor.step,
            map_view_id: view.id,
            frame: view.frame.clone(),
        })
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for frame updates.
    pub tx: broadcast::Sender<FrameBroadcast>,
    /// The latest published viewer snapshot.
    pub snapshot: Arc<RwLock<ViewerSnapshot>>,
    /// Command channel into the playback controller, when one runs.
    pub playback: Option<PlaybackHandle>,
}

impl AppState {
    /// Create a state with an empty snapshot and no controller.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(ViewerSnapshot::default())),
            playback: None,
        }
    }

    /// Create a state whose control endpoints drive `handle`.
    pub fn with_playback(handle: PlaybackHandle) -> Self {
        Self {
            playback: Some(handle),
            ..Self::new()
        }
    }

    /// Subscribe to frame updates.
    pub fn subscribe(&self) -> broadcast::Receiver<FrameBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a frame update to all connected clients.
    ///
    /// Returns the number of receivers, 0 when nobody is connected.
    pub fn broadcast(&self, update: &FrameBroadcast) -> usize {
        self.tx.send(update.clone()).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
