//! End-to-end tests for the playback controller against an in-memory
//! simulator.
//!
//! The fake serves a fixed number of matches and steps and answers
//! immediately. Tokio's paused clock drives the bootstrap and step timers, so
//! the tests advance time explicitly instead of sleeping.

#![allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use masire_client::{SimulatorApi, SyncError};
use masire_core::config::MonitorConfig;
use masire_core::controller::{Command, PlaybackCallback, PlaybackController, PlaybackHandle};
use masire_core::error::PlaybackError;
use masire_core::session::{Cursor, Phase, PlaybackSession, ViewerSnapshot};
use masire_types::{EntityRef, EntityType, Location, MapConfig, MatchInfo, SimulationInfo, StepData};
use serde_json::json;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const TOTAL_STEPS: u64 = 10;
const TOTAL_MATCHES: u64 = 3;

struct FakeSimulator;

fn status_error(endpoint: &str, message: &str) -> SyncError {
    SyncError::Status {
        endpoint: endpoint.to_owned(),
        status: 400,
        message: message.to_owned(),
    }
}

impl SimulatorApi for FakeSimulator {
    async fn simulation_info(&self) -> Result<SimulationInfo, SyncError> {
        Ok(SimulationInfo {
            simulation_url: String::from("http://127.0.0.1:8910"),
            max_agents: 20,
            ..SimulationInfo::default()
        })
    }

    async fn match_info(&self) -> Result<MatchInfo, SyncError> {
        Ok(MatchInfo {
            total_steps: TOTAL_STEPS,
            total_matches: TOTAL_MATCHES,
        })
    }

    async fn map_config(&self, match_index: u64) -> Result<MapConfig, SyncError> {
        if match_index >= TOTAL_MATCHES {
            return Err(status_error("map", "Match not found."));
        }
        let offset = f64::from(u32::try_from(match_index).unwrap());
        Ok(serde_json::from_value(json!({
            "centerLat": 1.0 + offset, "centerLon": 2.0,
            "minLat": 0.0, "minLon": 1.0, "maxLat": 5.0, "maxLon": 3.0,
            "osm": format!("match-{match_index}.osm")
        }))
        .unwrap())
    }

    async fn step(&self, _match_index: u64, step: u64) -> Result<StepData, SyncError> {
        if step >= TOTAL_STEPS {
            return Err(status_error("step", "Step not found."));
        }
        Ok(serde_json::from_value(json!({
            "environment": {"events": [
                {"type": "victim", "identifier": 7, "lifetime": step,
                 "location": {"lat": 1.0, "lon": 2.0}}
            ]},
            "actors": [
                {"type": "agent", "token": "boat-1", "role": "boat",
                 "location": {"lat": 1.0, "lon": 2.0},
                 "route": [{"lat": 1.1, "lon": 2.1}]}
            ]
        }))
        .unwrap())
    }
}

/// Keeps the latest snapshot where the test can read it.
#[derive(Clone, Default)]
struct Recorder {
    latest: Arc<Mutex<ViewerSnapshot>>,
    frames: Arc<Mutex<u64>>,
}

impl PlaybackCallback for Recorder {
    fn on_update(&mut self, session: &PlaybackSession) -> impl Future<Output = ()> + Send {
        *self.latest.lock().unwrap() = session.snapshot();
        std::future::ready(())
    }

    fn on_frame(&mut self, _session: &PlaybackSession) {
        let mut frames = self.frames.lock().unwrap();
        *frames = frames.saturating_add(1);
    }
}

impl Recorder {
    fn snapshot(&self) -> ViewerSnapshot {
        self.latest.lock().unwrap().clone()
    }
}

struct Running {
    handle: PlaybackHandle,
    recorder: Recorder,
    stop: oneshot::Sender<()>,
    task: JoinHandle<PlaybackSession>,
}

fn spawn(config: &MonitorConfig) -> Running {
    let session = PlaybackSession::new(config);
    let (controller, handle) = PlaybackController::new(FakeSimulator, session);
    let recorder = Recorder::default();
    let mut callback = recorder.clone();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        controller
            .run(&mut callback, async {
                let _ = stopped.await;
            })
            .await
    });
    Running {
        handle,
        recorder,
        stop,
        task,
    }
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn bootstrap_starts_match_zero_and_plays() {
    let running = spawn(&MonitorConfig::default());

    // First bootstrap tick after one interval, then the first step tick.
    advance(1_050).await;
    let snapshot = running.recorder.snapshot();
    assert_eq!(snapshot.phase, Phase::Playing);
    assert_eq!(snapshot.cursor.match_index, 0);
    assert_eq!(snapshot.match_counter, "1 of 3");
    let map = snapshot.map.unwrap();
    assert_eq!(map.center, Location::new(1.0, 2.0));
    assert_eq!(map.osm, "match-0.osm");
    assert_eq!(
        snapshot.simulation_info.unwrap().simulation_url,
        "http://127.0.0.1:8910"
    );

    advance(1_000).await;
    let snapshot = running.recorder.snapshot();
    assert_eq!(snapshot.cursor, Cursor::new(0, Some(1)));
    let frame = &snapshot.map.unwrap().frame;
    assert_eq!(frame.markers.len(), 2);
    assert_eq!(frame.active_agents, 1);
    assert_eq!(frame.overlays.len(), 1);
    assert!(*running.recorder.frames.lock().unwrap() >= 2);

    running.stop.send(()).unwrap();
    let session = running.task.await.unwrap();
    assert_eq!(session.phase(), Phase::Playing);
}

#[tokio::test(start_paused = true)]
async fn commands_drive_the_session() {
    let running = spawn(&MonitorConfig::default());
    advance(1_050).await;

    let ack = running.handle.send(Command::Pause).await.unwrap();
    assert!(!ack.playing);
    let before = running.recorder.snapshot().cursor;

    // Paused: time passes, nothing moves.
    advance(5_000).await;
    assert_eq!(running.recorder.snapshot().cursor, before);

    let err = running.handle.send(Command::PrevMatch).await.unwrap_err();
    assert_eq!(err, PlaybackError::FirstMatch);

    let ack = running.handle.send(Command::NextStep).await.unwrap();
    assert_eq!(ack.cursor, Cursor::new(0, Some(1)));
    advance(10).await;

    let victim = EntityRef::new(EntityType::Victim, "7");
    running
        .handle
        .send(Command::Select(victim.clone()))
        .await
        .unwrap();
    let snapshot = running.recorder.snapshot();
    assert!(snapshot.inspector.visible);
    assert_eq!(snapshot.inspector.selection.target, Some(victim));

    let err = running
        .handle
        .send(Command::SetSpeed {
            tick_interval_ms: 10,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PlaybackError::SpeedTooFast { .. }));

    let ack = running
        .handle
        .send(Command::ToggleLog)
        .await
        .unwrap();
    assert!(!ack.log_visible);

    running.stop.send(()).unwrap();
    running.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn next_match_switches_view_and_lands_on_step_zero() {
    let mut config = MonitorConfig::default();
    config.playback.start_paused = true;
    let running = spawn(&config);
    advance(1_050).await;
    assert_eq!(running.recorder.snapshot().phase, Phase::Paused);

    let ack = running.handle.send(Command::NextMatch).await.unwrap();
    assert_eq!(ack.pending_match, Some(1));
    advance(10).await;

    let snapshot = running.recorder.snapshot();
    assert_eq!(snapshot.cursor, Cursor::new(1, Some(0)));
    let map = snapshot.map.unwrap();
    assert_eq!(map.match_index, 1);
    assert_eq!(map.center, Location::new(2.0, 2.0));
    assert_eq!(map.frame.markers.len(), 2);
    assert_eq!(snapshot.match_counter, "2 of 3");

    running.stop.send(()).unwrap();
    running.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn past_the_last_match_rolls_back() {
    let mut config = MonitorConfig::default();
    config.playback.start_paused = true;
    let running = spawn(&config);
    advance(1_050).await;

    for _ in 0..2 {
        running.handle.send(Command::NextMatch).await.unwrap();
        advance(10).await;
    }
    let before = running.recorder.snapshot().cursor;
    assert_eq!(before.match_index, 2);

    running.handle.send(Command::NextMatch).await.unwrap();
    advance(10).await;
    let snapshot = running.recorder.snapshot();
    assert_eq!(snapshot.cursor, before);
    assert_eq!(snapshot.map.unwrap().match_index, 2);
    assert_eq!(
        snapshot.log.last().map(|e| e.message.as_str()),
        Some("Match not found.")
    );

    running.stop.send(()).unwrap();
    running.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn end_of_match_keeps_the_last_step() {
    let mut config = MonitorConfig::default();
    config.playback.tick_interval_ms = 100;
    let running = spawn(&config);

    // Bootstrap plus more ticks than the match has steps.
    advance(100 * (TOTAL_STEPS + 5) + 150).await;
    let snapshot = running.recorder.snapshot();
    assert_eq!(snapshot.cursor, Cursor::new(0, Some(TOTAL_STEPS - 1)));
    assert_eq!(snapshot.phase, Phase::Playing);

    running.stop.send(()).unwrap();
    running.task.await.unwrap();
}

#[tokio::test]
async fn commands_after_shutdown_report_stopped() {
    let running = spawn(&MonitorConfig::default());
    running.stop.send(()).unwrap();
    running.task.await.unwrap();

    let err = running.handle.send(Command::Pause).await.unwrap_err();
    assert_eq!(err, PlaybackError::Stopped);
}
