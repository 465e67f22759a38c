//! The playback state machine.
//!
//! [`PlaybackSession`] owns every piece of mutable monitor state: the
//! step/match cursor, the map view, the inspector and the log. It performs
//! no I/O. Operations return the [`Request`]s they need fetched, and the
//! answers come back as [`Reply`]s through [`PlaybackSession::apply`]. Each
//! request carries the cursor position it was made for, so an answer that
//! arrives after the cursor has moved on is dropped instead of drawing a
//! stale step or undoing newer navigation. A failed fetch returns the
//! cursor to the last position actually drawn, so the counters always
//! describe the frame on the map.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --init ok--> Bootstrapping --map of match 0--> Playing <--> Paused
//! ```
//!
//! While uninitialized or bootstrapping, the bootstrap timer runs and each
//! tick retries whatever is missing (simulation info, then match 0). Once
//! the first map arrives the step timer takes over, unless playback was
//! paused in the meantime.

use std::time::Duration;

use masire_client::SyncError;
use masire_types::{EntityRef, MapConfig, MatchInfo, SimulationInfo, StepData};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{MIN_TICK_INTERVAL_MS, MapSection, MonitorConfig};
use crate::error::PlaybackError;
use crate::inspector::InspectorPanel;
use crate::log::{LogEntry, LogPanel};
use crate::map_view::MapView;
use crate::render::render_step;

/// Externally visible playback state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Simulation info not fetched yet.
    #[default]
    Uninitialized,
    /// Waiting for the first match to become available.
    Bootstrapping,
    /// Advancing one step per tick.
    Playing,
    /// Match loaded, step timer stopped.
    Paused,
}

/// Which repeating timer should be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Retry initialization and match discovery.
    Bootstrap,
    /// Advance one step per tick.
    Step,
    /// No timer.
    Off,
}

/// The displayed match and step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cursor {
    /// Zero-based match index.
    pub match_index: u64,
    /// Zero-based step index; `None` right after a match switch, before
    /// the first step of the new match.
    pub step: Option<u64>,
}

impl Cursor {
    /// A cursor at the given position.
    pub const fn new(match_index: u64, step: Option<u64>) -> Self {
        Self { match_index, step }
    }

    /// Whether the cursor sits on exactly this step.
    pub const fn is_at(&self, match_index: u64, step: u64) -> bool {
        self.match_index == match_index && matches!(self.step, Some(s) if s == step)
    }
}

/// A step fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTarget {
    /// The match of the requested step.
    pub match_index: u64,
    /// The requested step.
    pub step: u64,
}

/// A map fetch for a match switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapTarget {
    /// The match being switched to.
    pub match_index: u64,
}

/// A fetch the session needs performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Simulation info, during initialization.
    SimulationInfo,
    /// Match counters, as the first half of a bootstrap attempt.
    BootstrapMatchInfo {
        /// The bootstrap attempt.
        attempt: u64,
    },
    /// Map of match 0, as the second half of a bootstrap attempt.
    BootstrapMap {
        /// The bootstrap attempt.
        attempt: u64,
    },
    /// Match counters refresh after a step navigation.
    MatchInfo,
    /// Map of a match being switched to.
    Map(MapTarget),
    /// One step.
    Step(StepTarget),
}

/// The answer to a [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Answer to [`Request::SimulationInfo`].
    SimulationInfo(Result<SimulationInfo, SyncError>),
    /// Answer to [`Request::BootstrapMatchInfo`].
    BootstrapMatchInfo {
        /// The bootstrap attempt.
        attempt: u64,
        /// Fetch outcome.
        result: Result<MatchInfo, SyncError>,
    },
    /// Answer to [`Request::BootstrapMap`].
    BootstrapMap {
        /// The bootstrap attempt.
        attempt: u64,
        /// Fetch outcome.
        result: Result<MapConfig, SyncError>,
    },
    /// Answer to [`Request::MatchInfo`].
    MatchInfo(Result<MatchInfo, SyncError>),
    /// Answer to [`Request::Map`].
    Map {
        /// What was requested.
        target: MapTarget,
        /// Fetch outcome.
        result: Result<MapConfig, SyncError>,
    },
    /// Answer to [`Request::Step`].
    Step {
        /// What was requested.
        target: StepTarget,
        /// Fetch outcome.
        result: Result<StepData, SyncError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Uninitialized,
    Bootstrapping,
    Started,
}

/// All mutable monitor state.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    stage: Stage,
    playing: bool,
    tick_interval_ms: u64,
    cursor: Cursor,
    drawn: Cursor,
    simulation_info: Option<SimulationInfo>,
    match_info: Option<MatchInfo>,
    map_view: Option<MapView>,
    map_section: MapSection,
    inspector: InspectorPanel,
    log: LogPanel,
    init_in_flight: bool,
    bootstrap_attempt: u64,
    bootstrap_in_flight: bool,
    pending_match: Option<u64>,
    frame_serial: u64,
}

impl PlaybackSession {
    /// A fresh, uninitialized session.
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            stage: Stage::Uninitialized,
            playing: !config.playback.start_paused,
            tick_interval_ms: config.playback.tick_interval_ms,
            cursor: Cursor::new(0, Some(0)),
            drawn: Cursor::new(0, Some(0)),
            simulation_info: None,
            match_info: None,
            map_view: None,
            map_section: config.map.clone(),
            inspector: InspectorPanel::new(),
            log: LogPanel::new(config.log.capacity, config.log.visible),
            init_in_flight: false,
            bootstrap_attempt: 0,
            bootstrap_in_flight: false,
            pending_match: None,
            frame_serial: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Ask for the simulation info. Does nothing once it has arrived or
    /// while a request for it is in flight.
    pub fn init(&mut self) -> Vec<Request> {
        if self.stage != Stage::Uninitialized || self.init_in_flight {
            return Vec::new();
        }
        self.log.normal("Initializing variables.");
        self.init_in_flight = true;
        vec![Request::SimulationInfo]
    }

    /// Try to load match 0: reset the cursor, then fetch the match
    /// counters followed by the map. Only acts while bootstrapping and
    /// when no earlier attempt is still in flight.
    pub fn start_match(&mut self) -> Vec<Request> {
        if self.stage != Stage::Bootstrapping || self.bootstrap_in_flight {
            return Vec::new();
        }
        self.cursor = Cursor::new(0, Some(0));
        self.bootstrap_attempt = self.bootstrap_attempt.saturating_add(1);
        self.bootstrap_in_flight = true;
        debug!(attempt = self.bootstrap_attempt, "trying to start match 0");
        vec![Request::BootstrapMatchInfo {
            attempt: self.bootstrap_attempt,
        }]
    }

    /// A bootstrap timer tick: retry whatever is missing.
    pub fn on_bootstrap_tick(&mut self) -> Vec<Request> {
        match self.stage {
            Stage::Uninitialized => self.init(),
            Stage::Bootstrapping => self.start_match(),
            Stage::Started => Vec::new(),
        }
    }

    /// A step timer tick: advance one step while playing.
    pub fn on_step_tick(&mut self) -> Vec<Request> {
        if self.stage != Stage::Started || !self.playing || self.pending_match.is_some() {
            return Vec::new();
        }
        self.advance()
    }

    /// The timer that should currently be running.
    pub const fn timer(&self) -> TimerMode {
        match self.stage {
            Stage::Uninitialized | Stage::Bootstrapping => TimerMode::Bootstrap,
            Stage::Started if self.playing => TimerMode::Step,
            Stage::Started => TimerMode::Off,
        }
    }

    /// Interval of both timers.
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Interval of both timers, in milliseconds.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Move to the next step of the current match.
    ///
    /// The cursor moves immediately and is restored if the fetch fails.
    /// The match counters are refreshed alongside.
    pub fn next_step(&mut self) -> Result<Vec<Request>, PlaybackError> {
        self.ensure_navigable()?;
        Ok(self.advance())
    }

    /// Move to the previous step of the current match.
    pub fn prev_step(&mut self) -> Result<Vec<Request>, PlaybackError> {
        self.ensure_navigable()?;
        let Some(step) = self.cursor.step.and_then(|s| s.checked_sub(1)) else {
            return self.reject(PlaybackError::FirstStep);
        };
        Ok(self.move_to_step(step))
    }

    /// Switch to the next match. Its map is fetched first; once it arrives
    /// the view is replaced and playback lands on step 0.
    pub fn next_match(&mut self) -> Result<Vec<Request>, PlaybackError> {
        self.ensure_navigable()?;
        let target = self.cursor.match_index.saturating_add(1);
        Ok(self.switch_match(target))
    }

    /// Switch to the previous match. Rejected on match 0.
    pub fn prev_match(&mut self) -> Result<Vec<Request>, PlaybackError> {
        self.ensure_navigable()?;
        let Some(target) = self.cursor.match_index.checked_sub(1) else {
            return self.reject(PlaybackError::FirstMatch);
        };
        Ok(self.switch_match(target))
    }

    fn ensure_navigable(&mut self) -> Result<(), PlaybackError> {
        if self.stage != Stage::Started {
            return self.reject(PlaybackError::NotStarted);
        }
        if let Some(match_index) = self.pending_match {
            return self.reject(PlaybackError::MatchLoading(match_index));
        }
        Ok(())
    }

    fn advance(&mut self) -> Vec<Request> {
        let step = self.cursor.step.map_or(0, |s| s.saturating_add(1));
        self.move_to_step(step)
    }

    fn move_to_step(&mut self, step: u64) -> Vec<Request> {
        self.cursor.step = Some(step);
        vec![
            Request::Step(StepTarget {
                match_index: self.cursor.match_index,
                step,
            }),
            Request::MatchInfo,
        ]
    }

    fn switch_match(&mut self, match_index: u64) -> Vec<Request> {
        self.cursor = Cursor::new(match_index, None);
        self.pending_match = Some(match_index);
        vec![Request::Map(MapTarget { match_index })]
    }

    // -----------------------------------------------------------------------
    // Operator controls
    // -----------------------------------------------------------------------

    /// Stop the step timer.
    pub fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.log.normal("Paused.");
        }
    }

    /// Restart the step timer at the current interval.
    pub fn resume(&mut self) {
        if !self.playing {
            self.playing = true;
            self.log.normal("Playing.");
        }
    }

    /// Pause when playing, resume when paused. Returns whether playback
    /// is now running.
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause();
        } else {
            self.resume();
        }
        self.playing
    }

    /// Change the interval of the step timer. A running timer restarts
    /// with it; a paused one picks it up on resume.
    pub fn set_speed(&mut self, tick_interval_ms: u64) -> Result<(), PlaybackError> {
        if tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return self.reject(PlaybackError::SpeedTooFast {
                requested: tick_interval_ms,
                min: MIN_TICK_INTERVAL_MS,
            });
        }
        self.tick_interval_ms = tick_interval_ms;
        self.log
            .normal(format!("Step speed change to {tick_interval_ms} ms"));
        Ok(())
    }

    /// Select the entity `target` points at in the displayed step, as a
    /// marker click would.
    pub fn select(&mut self, target: &EntityRef) -> Result<(), PlaybackError> {
        let Some(view) = &self.map_view else {
            return self.reject(PlaybackError::NotStarted);
        };
        if self.inspector.select(&view.frame, target) {
            return Ok(());
        }
        self.reject(PlaybackError::EntityNotFound {
            entity_type: target.entity_type,
            id: target.id.clone(),
        })
    }

    /// Show or hide the log panel. Returns whether it is now visible.
    pub fn toggle_log(&mut self) -> bool {
        self.log.toggle()
    }

    fn reject<T>(&mut self, error: PlaybackError) -> Result<T, PlaybackError> {
        self.log.error(error.to_string());
        Err(error)
    }

    // -----------------------------------------------------------------------
    // Replies
    // -----------------------------------------------------------------------

    /// Apply a fetch result, returning any follow-up requests.
    ///
    /// Replies for a position the cursor has since left are dropped.
    pub fn apply(&mut self, reply: Reply) -> Vec<Request> {
        match reply {
            Reply::SimulationInfo(result) => {
                self.on_simulation_info(result);
                Vec::new()
            }
            Reply::BootstrapMatchInfo { attempt, result } => {
                self.on_bootstrap_match_info(attempt, result)
            }
            Reply::BootstrapMap { attempt, result } => {
                self.on_bootstrap_map(attempt, result);
                Vec::new()
            }
            Reply::MatchInfo(result) => {
                match result {
                    Ok(info) => self.match_info = Some(info),
                    Err(e) => self.log.error(e.log_message()),
                }
                Vec::new()
            }
            Reply::Map { target, result } => self.on_map(target, result),
            Reply::Step { target, result } => {
                self.on_step(target, result);
                Vec::new()
            }
        }
    }

    fn on_simulation_info(&mut self, result: Result<SimulationInfo, SyncError>) {
        self.init_in_flight = false;
        if self.stage != Stage::Uninitialized {
            debug!("dropping simulation info received after initialization");
            return;
        }
        match result {
            Ok(info) => {
                info!(
                    simulation_url = %info.simulation_url,
                    max_agents = info.max_agents,
                    "simulation info received"
                );
                self.simulation_info = Some(info);
                self.stage = Stage::Bootstrapping;
            }
            Err(e) => self.log.error(e.log_message()),
        }
    }

    fn is_current_attempt(&self, attempt: u64) -> bool {
        self.stage == Stage::Bootstrapping && attempt == self.bootstrap_attempt
    }

    fn on_bootstrap_match_info(
        &mut self,
        attempt: u64,
        result: Result<MatchInfo, SyncError>,
    ) -> Vec<Request> {
        if !self.is_current_attempt(attempt) {
            debug!(attempt, "dropping match info of a stale bootstrap attempt");
            return Vec::new();
        }
        match result {
            Ok(info) => self.match_info = Some(info),
            Err(e) => self.log.error(e.log_message()),
        }
        vec![Request::BootstrapMap { attempt }]
    }

    fn on_bootstrap_map(&mut self, attempt: u64, result: Result<MapConfig, SyncError>) {
        if !self.is_current_attempt(attempt) {
            debug!(attempt, "dropping map of a stale bootstrap attempt");
            return;
        }
        self.bootstrap_in_flight = false;
        match result {
            Ok(config) => {
                self.map_view = Some(MapView::new(0, &config, &self.map_section));
                self.drawn = self.cursor;
                self.frame_serial = self.frame_serial.wrapping_add(1);
                self.stage = Stage::Started;
                info!(osm = %config.osm, playing = self.playing, "match 0 started");
            }
            Err(e) => self.log.error(e.log_message()),
        }
    }

    fn on_map(&mut self, target: MapTarget, result: Result<MapConfig, SyncError>) -> Vec<Request> {
        if self.pending_match != Some(target.match_index)
            || self.cursor.match_index != target.match_index
        {
            debug!(match_index = target.match_index, "dropping stale map");
            return Vec::new();
        }
        self.pending_match = None;
        match result {
            Ok(config) => {
                self.map_view = Some(MapView::new(
                    target.match_index,
                    &config,
                    &self.map_section,
                ));
                self.drawn = Cursor::new(target.match_index, None);
                self.frame_serial = self.frame_serial.wrapping_add(1);
                info!(match_index = target.match_index, osm = %config.osm, "switched match");
                self.advance()
            }
            Err(e) => {
                self.log.error(e.log_message());
                self.cursor = self.drawn;
                Vec::new()
            }
        }
    }

    fn on_step(&mut self, target: StepTarget, result: Result<StepData, SyncError>) {
        if self.pending_match.is_some() || !self.cursor.is_at(target.match_index, target.step) {
            debug!(
                match_index = target.match_index,
                step = target.step,
                "dropping stale step"
            );
            return;
        }
        match result {
            Ok(step) => self.show_step(target, &step),
            Err(e) => {
                self.log.error(e.log_message());
                self.cursor = self.drawn;
            }
        }
    }

    fn show_step(&mut self, target: StepTarget, step: &StepData) {
        let match_index = target.match_index;
        self.log.normal("Processing simulation data");
        let outcome = render_step(step);
        for error in &outcome.errors {
            self.log.error(error.to_string());
        }
        let Some(view) = self.map_view.as_mut().filter(|v| v.match_index == match_index) else {
            debug!(match_index, "no map view for step");
            return;
        };
        self.inspector.refresh(&outcome.frame);
        view.show(outcome.frame);
        self.drawn = Cursor::new(match_index, Some(target.step));
        self.frame_serial = self.frame_serial.wrapping_add(1);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        match self.stage {
            Stage::Uninitialized => Phase::Uninitialized,
            Stage::Bootstrapping => Phase::Bootstrapping,
            Stage::Started if self.playing => Phase::Playing,
            Stage::Started => Phase::Paused,
        }
    }

    /// Whether the step timer runs once a match is loaded.
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// The position the counters show. Runs ahead of [`Self::drawn`]
    /// while a fetch is in flight.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// The position of the frame on the map.
    pub const fn drawn(&self) -> Cursor {
        self.drawn
    }

    /// Changes whenever the map view or its displayed frame is replaced.
    pub const fn frame_serial(&self) -> u64 {
        self.frame_serial
    }

    /// The match a switch is waiting on, if any.
    pub const fn pending_match(&self) -> Option<u64> {
        self.pending_match
    }

    /// Static simulation configuration, once fetched.
    pub const fn simulation_info(&self) -> Option<&SimulationInfo> {
        self.simulation_info.as_ref()
    }

    /// Latest match counters.
    pub const fn match_info(&self) -> Option<MatchInfo> {
        self.match_info
    }

    /// The map view of the current match.
    pub const fn map_view(&self) -> Option<&MapView> {
        self.map_view.as_ref()
    }

    /// The inspector panel.
    pub const fn inspector(&self) -> &InspectorPanel {
        &self.inspector
    }

    /// The log panel.
    pub const fn log(&self) -> &LogPanel {
        &self.log
    }

    /// The step counter as shown to the operator: `"{step + 1} of {total}"`.
    pub fn step_counter(&self) -> String {
        let shown = self.cursor.step.map_or(0, |s| s.saturating_add(1));
        counter(shown, self.match_info.map(|i| i.total_steps))
    }

    /// The match counter as shown to the operator: `"{match + 1} of {total}"`.
    pub fn match_counter(&self) -> String {
        let shown = self.cursor.match_index.saturating_add(1);
        counter(shown, self.match_info.map(|i| i.total_matches))
    }

    /// A read-only copy of everything the viewer displays.
    pub fn snapshot(&self) -> ViewerSnapshot {
        ViewerSnapshot {
            phase: self.phase(),
            playing: self.playing,
            tick_interval_ms: self.tick_interval_ms,
            cursor: self.cursor,
            step_counter: self.step_counter(),
            match_counter: self.match_counter(),
            active_agents: self.map_view.as_ref().map_or(0, |v| v.frame.active_agents),
            simulation_info: self.simulation_info.clone(),
            match_info: self.match_info,
            map: self.map_view.clone(),
            inspector: self.inspector.clone(),
            log: self.log.entries().iter().cloned().collect(),
            log_visible: self.log.is_visible(),
        }
    }
}

fn counter(shown: u64, total: Option<u64>) -> String {
    total.map_or_else(
        || format!("{shown} of -"),
        |total| format!("{shown} of {total}"),
    )
}

/// Everything the viewer displays, detached from the session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewerSnapshot {
    /// Playback phase.
    pub phase: Phase,
    /// Whether the step timer runs once a match is loaded.
    pub playing: bool,
    /// Step timer interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Displayed position.
    pub cursor: Cursor,
    /// Step counter text.
    pub step_counter: String,
    /// Match counter text.
    pub match_counter: String,
    /// Actors in the displayed step.
    pub active_agents: usize,
    /// Static simulation configuration.
    pub simulation_info: Option<SimulationInfo>,
    /// Latest match counters.
    pub match_info: Option<MatchInfo>,
    /// Map view of the current match.
    pub map: Option<MapView>,
    /// Inspector panel.
    pub inspector: InspectorPanel,
    /// Log entries, oldest first.
    pub log: Vec<LogEntry>,
    /// Whether the log panel is shown.
    pub log_visible: bool,
}
