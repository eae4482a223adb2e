//! Background timer service.
//!
//! A tokio actor that owns the [`TimerEngine`] and the one-second tick loop,
//! the counterpart of the always-on service a phone timer would run. The
//! actor serializes control commands and ticks on a single `select!` loop,
//! so there is exactly one logical timeline: a command that pauses or stops
//! the timer drops the armed interval in the same loop iteration, and a
//! cancelled tick can never fire afterwards.
//!
//! State flows one way: the service is the sole writer, publishing typed
//! [`Event`]s on a broadcast channel. Renderers and notifiers are read-only
//! subscribers that may attach or detach at any time without affecting the
//! countdown.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::storage::Config;
use crate::timer::{TimerEngine, TimerState};

/// Nominal tick interval: one decrement per second.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

const EVENT_CAPACITY: usize = 64;
const COMMAND_CAPACITY: usize = 16;

/// Control messages understood by the timer service.
#[derive(Debug)]
pub enum Command {
    /// Start counting down, optionally re-basing the total time.
    Start { total_secs: Option<u32> },
    /// Toggle play/pause.
    Toggle,
    /// Stop and reset to idle. Always an explicit command, never inferred
    /// from an input gesture.
    Stop,
    /// Ask for a full state snapshot.
    Query { reply: oneshot::Sender<Event> },
}

/// Cloneable handle to a running timer service.
///
/// Dropping every handle closes the command channel and shuts the service
/// down.
#[derive(Clone)]
pub struct TimerHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
}

impl TimerHandle {
    /// Attach a new read-only event subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub async fn start(&self, total_secs: Option<u32>) -> Result<()> {
        self.send(Command::Start { total_secs }).await
    }

    pub async fn toggle(&self) -> Result<()> {
        self.send(Command::Toggle).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(Command::Stop).await
    }

    /// Current state as a `StateSnapshot` event.
    pub async fn snapshot(&self) -> Result<Event> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Query { reply }).await?;
        rx.await.map_err(|_| CoreError::ServiceClosed)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::ServiceClosed)
    }
}

/// The timer actor. Constructed from a [`Config`] and spawned onto the
/// current tokio runtime; no implicit global state.
pub struct TimerService {
    engine: TimerEngine,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<Event>,
    /// Armed only while the engine is `Running`. Dropping it is the
    /// synchronous cancellation of the pending tick.
    ticker: Option<Interval>,
}

impl TimerService {
    pub fn spawn(config: &Config) -> TimerHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let service = TimerService {
            engine: TimerEngine::new(config.timer.total_secs),
            commands: commands_rx,
            events: events_tx.clone(),
            ticker: None,
        };
        tokio::spawn(service.run());

        TimerHandle {
            commands: commands_tx,
            events: events_tx,
        }
    }

    async fn run(mut self) {
        info!(total_secs = self.engine.total_secs(), "timer service started");
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    // All handles dropped; tear down.
                    None => break,
                },
                _ = next_tick(self.ticker.as_mut()) => self.handle_tick(),
            }
        }
        info!("timer service stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        let event = match cmd {
            Command::Start { total_secs } => self.engine.start(total_secs),
            Command::Toggle => self.engine.toggle(),
            Command::Stop => self.engine.stop(),
            Command::Query { reply } => {
                reply.send(self.engine.snapshot()).ok();
                return;
            }
        };
        self.sync_ticker();
        if let Some(event) = event {
            debug!(?event, "command applied");
            self.events.send(event).ok();
        }
    }

    fn handle_tick(&mut self) {
        let Some(event) = self.engine.tick() else {
            return;
        };
        trace!(remaining_secs = self.engine.remaining_secs(), "tick");
        if self.engine.state() == TimerState::Expired {
            self.ticker = None;
        }
        self.events.send(event).ok();
    }

    /// Arm or disarm the interval to match the engine state. The first tick
    /// lands a full interval after starting, never immediately.
    fn sync_ticker(&mut self) {
        match self.engine.state() {
            TimerState::Running => {
                if self.ticker.is_none() {
                    let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.ticker = Some(ticker);
                }
            }
            _ => self.ticker = None,
        }
    }
}

/// Wait for the next armed tick; an unarmed ticker never completes.
async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
