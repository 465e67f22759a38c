//! Playback callback that feeds the viewer API.
//!
//! After every controller event this callback replaces the published
//! [`ViewerSnapshot`], waiting out any reader holding it, and whenever a
//! new frame is drawn it broadcasts a [`FrameBroadcast`] to connected
//! `WebSocket` clients.
//!
//! [`ViewerSnapshot`]: masire_core::session::ViewerSnapshot

use std::sync::Arc;

use masire_core::controller::PlaybackCallback;
use masire_core::session::PlaybackSession;
use masire_observer::state::{AppState, FrameBroadcast};
use tracing::debug;

/// Callback that bridges the playback controller to the viewer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl PlaybackCallback for ObserverCallback {
    async fn on_update(&mut self, session: &PlaybackSession) {
        let snapshot = session.snapshot();
        *self.state.snapshot.write().await = snapshot;
    }

    fn on_frame(&mut self, session: &PlaybackSession) {
        let Some(frame) = FrameBroadcast::of(session) else {
            return;
        };
        let receivers = self.state.broadcast(&frame);
        debug!(
            match_index = frame.match_index,
            step = ?frame.step,
            receivers,
            "Frame broadcast sent"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use masire_core::config::MonitorConfig;
    use masire_core::session::{Phase, Reply, Request};
    use masire_types::{MatchInfo, SimulationInfo};
    use serde_json::json;

    use super::*;

    fn started_session() -> PlaybackSession {
        let mut session = PlaybackSession::new(&MonitorConfig::default());
        session.init();
        session.apply(Reply::SimulationInfo(Ok(SimulationInfo::default())));
        session.start_match();
        session.apply(Reply::BootstrapMatchInfo {
            attempt: 1,
            result: Ok(MatchInfo {
                total_steps: 4,
                total_matches: 1,
            }),
        });
        session.apply(Reply::BootstrapMap {
            attempt: 1,
            result: Ok(serde_json::from_value(json!({
                "centerLat": 1.0, "centerLon": 2.0,
                "minLat": 0.0, "minLon": 1.0, "maxLat": 2.0, "maxLon": 3.0
            }))
            .unwrap()),
        });
        session
    }

    #[tokio::test]
    async fn publishes_snapshot_and_frames() {
        let state = Arc::new(AppState::new());
        let mut rx = state.subscribe();
        let mut callback = ObserverCallback::new(Arc::clone(&state));
        let mut session = started_session();

        let requests = session.next_step().unwrap();
        for request in requests {
            if let Request::Step(target) = request {
                session.apply(Reply::Step {
                    target,
                    result: Ok(serde_json::from_value(json!({
                        "environment": {"events": [
                            {"type": "photo", "identifier": 3,
                             "location": {"lat": 1.0, "lon": 2.0}}
                        ]},
                        "actors": []
                    }))
                    .unwrap()),
                });
            }
        }

        callback.on_frame(&session);
        callback.on_update(&session).await;

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.match_index, 0);
        assert_eq!(frame.step, Some(1));
        assert_eq!(frame.frame.markers.len(), 1);

        let snapshot = state.snapshot.read().await;
        assert_eq!(snapshot.step_counter, "2 of 4");
    }

    #[tokio::test]
    async fn update_waits_for_a_held_read_lock() {
        let state = Arc::new(AppState::new());
        let mut callback = ObserverCallback::new(Arc::clone(&state));
        let mut session = started_session();
        callback.on_update(&session).await;
        session.pause();

        let guard = state.snapshot.read().await;
        assert_eq!(guard.phase, Phase::Playing);
        let release = async move {
            tokio::task::yield_now().await;
            drop(guard);
        };
        tokio::join!(callback.on_update(&session), release);

        let snapshot = state.snapshot.read().await;
        assert_eq!(snapshot.phase, Phase::Paused);
        assert!(!snapshot.playing);
    }
}
