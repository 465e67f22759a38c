//! The async driver around [`PlaybackSession`].
//!
//! [`PlaybackController::run`] is the only owner of the session. A single
//! task multiplexes four event sources:
//!
//! - the bootstrap or step timer, whichever [`PlaybackSession::timer`]
//!   asks for, rebuilt whenever the mode or interval changes
//! - operator commands arriving through a [`PlaybackHandle`]
//! - completed fetches, kept in a [`FuturesUnordered`] so requests run
//!   concurrently without blocking commands
//! - the shutdown signal
//!
//! After every event the [`PlaybackCallback`] sees the session, which is
//! how the viewer API gets its snapshots. The loop awaits the callback
//! before replying to a command, so a reply always trails the published
//! state.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use masire_client::SimulatorApi;
use masire_types::EntityRef;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::PlaybackError;
use crate::session::{Cursor, PlaybackSession, Reply, Request, TimerMode};

/// Capacity of the operator command queue.
const COMMAND_CAPACITY: usize = 64;

/// An operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stop the step timer.
    Pause,
    /// Restart the step timer.
    Resume,
    /// Pause or resume.
    Toggle,
    /// Change the step interval.
    SetSpeed {
        /// New interval in milliseconds.
        tick_interval_ms: u64,
    },
    /// Go to the next step.
    NextStep,
    /// Go to the previous step.
    PrevStep,
    /// Go to the next match.
    NextMatch,
    /// Go to the previous match.
    PrevMatch,
    /// Select an entity of the displayed step.
    Select(EntityRef),
    /// Show or hide the log panel.
    ToggleLog,
}

/// Session state right after an accepted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandAck {
    /// Whether the step timer runs once a match is loaded.
    pub playing: bool,
    /// Step interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Displayed position.
    pub cursor: Cursor,
    /// Match a switch is waiting on.
    pub pending_match: Option<u64>,
    /// Whether the log panel is shown.
    pub log_visible: bool,
}

impl CommandAck {
    fn of(session: &PlaybackSession) -> Self {
        Self {
            playing: session.is_playing(),
            tick_interval_ms: session.tick_interval_ms(),
            cursor: session.cursor(),
            pending_match: session.pending_match(),
            log_visible: session.log().is_visible(),
        }
    }
}

/// Outcome of an operator command.
pub type CommandResult = Result<CommandAck, PlaybackError>;

#[derive(Debug)]
struct Envelope {
    command: Command,
    reply: oneshot::Sender<CommandResult>,
}

/// Sends commands to a running controller.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    tx: mpsc::Sender<Envelope>,
}

impl PlaybackHandle {
    /// Send a command and wait for the controller's verdict.
    ///
    /// # Errors
    ///
    /// Returns the session's [`PlaybackError`] if the command was
    /// rejected, or [`PlaybackError::Stopped`] if the controller is gone.
    pub async fn send(&self, command: Command) -> CommandResult {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Envelope { command, reply }).await.is_err() {
            return Err(PlaybackError::Stopped);
        }
        rx.await.unwrap_or(Err(PlaybackError::Stopped))
    }
}

/// Observer of session changes.
///
/// Implementations publish snapshots, broadcast frames, and so on. They
/// run on the controller task; nothing else is handled until the future
/// returned by [`on_update`](Self::on_update) completes.
pub trait PlaybackCallback: Send {
    /// Called after every event the controller handled.
    fn on_update(&mut self, session: &PlaybackSession) -> impl Future<Output = ()> + Send;

    /// Called when the map view or its displayed frame was replaced.
    fn on_frame(&mut self, _session: &PlaybackSession) {}
}

/// Owns a [`PlaybackSession`] and drives it against a [`SimulatorApi`].
pub struct PlaybackController<A> {
    api: Arc<A>,
    session: PlaybackSession,
    commands: mpsc::Receiver<Envelope>,
}

impl<A: SimulatorApi> PlaybackController<A> {
    /// Create a controller and the handle that commands it.
    pub fn new(api: A, session: PlaybackSession) -> (Self, PlaybackHandle) {
        let (tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        (
            Self {
                api: Arc::new(api),
                session,
                commands,
            },
            PlaybackHandle { tx },
        )
    }

    /// Run until `shutdown` resolves, then hand the session back.
    pub async fn run<C, F>(self, callback: &mut C, shutdown: F) -> PlaybackSession
    where
        C: PlaybackCallback,
        F: Future<Output = ()> + Send,
    {
        let Self {
            api,
            mut session,
            mut commands,
        } = self;
        let mut in_flight = FuturesUnordered::new();
        let mut ticker = Ticker::new(session.timer(), session.tick_interval());

        info!(
            tick_interval_ms = session.tick_interval_ms(),
            "Playback controller starting"
        );

        for request in session.init() {
            in_flight.push(perform(Arc::clone(&api), request));
        }
        callback.on_update(&session).await;

        tokio::pin!(shutdown);

        loop {
            let frame_before = session.frame_serial();
            let mut answer = None;
            let requests = tokio::select! {
                () = &mut shutdown => break,
                mode = ticker.tick() => match mode {
                    TimerMode::Bootstrap => session.on_bootstrap_tick(),
                    TimerMode::Step => session.on_step_tick(),
                    TimerMode::Off => Vec::new(),
                },
                Some(envelope) = commands.recv() => {
                    let (result, requests) = handle(&mut session, envelope.command);
                    answer = Some((envelope.reply, result));
                    requests
                },
                Some(reply) = in_flight.next(), if !in_flight.is_empty() => session.apply(reply),
            };

            for request in requests {
                debug!(?request, "dispatching fetch");
                in_flight.push(perform(Arc::clone(&api), request));
            }

            ticker.sync(session.timer(), session.tick_interval());

            if session.frame_serial() != frame_before {
                callback.on_frame(&session);
            }
            callback.on_update(&session).await;

            // Answer only after the callback has published the new state.
            if let Some((reply, result)) = answer {
                // The caller may have stopped waiting.
                let _ = reply.send(result);
            }
        }

        info!(
            in_flight = in_flight.len(),
            "Playback controller stopped"
        );
        session
    }
}

/// Apply an operator command to the session.
fn handle(session: &mut PlaybackSession, command: Command) -> (CommandResult, Vec<Request>) {
    let outcome = match command {
        Command::Pause => {
            session.pause();
            Ok(Vec::new())
        }
        Command::Resume => {
            session.resume();
            Ok(Vec::new())
        }
        Command::Toggle => {
            session.toggle();
            Ok(Vec::new())
        }
        Command::SetSpeed { tick_interval_ms } => {
            session.set_speed(tick_interval_ms).map(|()| Vec::new())
        }
        Command::NextStep => session.next_step(),
        Command::PrevStep => session.prev_step(),
        Command::NextMatch => session.next_match(),
        Command::PrevMatch => session.prev_match(),
        Command::Select(target) => session.select(&target).map(|()| Vec::new()),
        Command::ToggleLog => {
            session.toggle_log();
            Ok(Vec::new())
        }
    };
    match outcome {
        Ok(requests) => (Ok(CommandAck::of(session)), requests),
        Err(e) => (Err(e), Vec::new()),
    }
}

/// Run one fetch against the API.
async fn perform<A: SimulatorApi>(api: Arc<A>, request: Request) -> Reply {
    match request {
        Request::SimulationInfo => Reply::SimulationInfo(api.simulation_info().await),
        Request::BootstrapMatchInfo { attempt } => Reply::BootstrapMatchInfo {
            attempt,
            result: api.match_info().await,
        },
        Request::BootstrapMap { attempt } => Reply::BootstrapMap {
            attempt,
            result: api.map_config(0).await,
        },
        Request::MatchInfo => Reply::MatchInfo(api.match_info().await),
        Request::Map(target) => Reply::Map {
            target,
            result: api.map_config(target.match_index).await,
        },
        Request::Step(target) => Reply::Step {
            target,
            result: api.step(target.match_index, target.step).await,
        },
    }
}

/// The one repeating timer the session currently wants.
struct Ticker {
    mode: TimerMode,
    period: Duration,
    interval: Option<Interval>,
}

impl Ticker {
    fn new(mode: TimerMode, period: Duration) -> Self {
        Self {
            mode,
            period,
            interval: start_interval(mode, period),
        }
    }

    /// Restart the timer when the mode or the period changed.
    fn sync(&mut self, mode: TimerMode, period: Duration) {
        if mode == self.mode && period == self.period {
            return;
        }
        debug!(?mode, ?period, "restarting timer");
        *self = Self::new(mode, period);
    }

    /// Wait for the next tick. Never resolves while the timer is off.
    async fn tick(&mut self) -> TimerMode {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
                self.mode
            }
            None => std::future::pending().await,
        }
    }
}

/// An interval whose first tick is one full period away.
fn start_interval(mode: TimerMode, period: Duration) -> Option<Interval> {
    if mode == TimerMode::Off {
        return None;
    }
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or(now);
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}
