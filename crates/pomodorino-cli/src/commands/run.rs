//! Foreground timer surface.
//!
//! Runs the background timer service in-process and attaches two read-only
//! subscribers: the terminal clock face and the desktop notifier. Control
//! keys come from stdin; stopping is an explicit command, never inferred
//! from a gesture.

use std::io::{BufRead, Write};

use clap::Args;
use pomodorino_core::{ClockFace, Config, Event, Notifier, TimerHandle, TimerService};
use tokio::sync::{broadcast, mpsc};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Args)]
pub struct RunArgs {
    /// Countdown length in seconds (overrides the configured value)
    #[arg(long)]
    pub total_secs: Option<u32>,
    /// Start counting immediately instead of waiting for a key
    #[arg(long)]
    pub autostart: bool,
    /// Stream events as JSON lines instead of drawing the clock face
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pomodorino=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load()?;
    if let Some(total_secs) = args.total_secs {
        config.timer.total_secs = total_secs;
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_timer(config, args))
}

async fn run_timer(config: Config, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let handle = TimerService::spawn(&config);

    let notifier = Notifier::new(&config.notifications);
    let notifications = dispatch_notifications(handle.subscribe(), notifier);

    if args.json {
        tokio::spawn(stream_json(handle.subscribe()));
    } else {
        println!("Enter: play/pause   s: stop   q: quit");
        draw(&handle.snapshot().await?);
        tokio::spawn(draw_events(handle.subscribe()));
    }

    if args.autostart {
        handle.start(None).await?;
    }

    // The notifier owns a notification-server handle that is not Send, so
    // its loop stays on this task instead of a spawned one; it winds down
    // together with the control loop.
    tokio::select! {
        result = control_loop(&handle) => result,
        _ = notifications => Ok(()),
    }
}

/// Read control keys until quit, EOF or Ctrl-C.
async fn control_loop(handle: &TimerHandle) -> Result<(), Box<dyn std::error::Error>> {
    let mut keys = spawn_stdin_channel();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = keys.recv() => {
                let Some(line) = line else { break };
                match line.trim() {
                    "" => handle.toggle().await?,
                    "s" | "stop" => handle.stop().await?,
                    "q" | "quit" => break,
                    other => warn!("unrecognized input: {other}"),
                }
            }
        }
    }
    println!();
    Ok(())
}

/// Lines typed on stdin, bridged onto the runtime from a reader thread.
fn spawn_stdin_channel() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn draw_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => draw(&event),
            Err(broadcast::error::RecvError::Closed) => break,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
        }
    }
}

async fn stream_json(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!("failed to encode event: {err}"),
            },
            Err(broadcast::error::RecvError::Closed) => break,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("event stream lagged, skipped {skipped} events");
            }
        }
    }
}

/// Feed the desktop notification surface: the persistent countdown while
/// running, the one-shot alert at expiry. Pausing keeps the notification
/// at the last rendered time; only stop and expiry clear it.
async fn dispatch_notifications(mut events: broadcast::Receiver<Event>, mut notifier: Notifier) {
    loop {
        match events.recv().await {
            Ok(event) => match event {
                Event::TimerStarted { total_secs, .. } => notifier.show_persistent(total_secs),
                Event::Tick { remaining_secs, .. } => notifier.show_persistent(remaining_secs),
                Event::TimerStopped { .. } => notifier.hide(),
                Event::TimerExpired { .. } => notifier.alert_expired(),
                _ => {}
            },
            Err(broadcast::error::RecvError::Closed) => break,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
        }
    }
}

fn draw(event: &Event) {
    match event {
        Event::StateSnapshot { remaining_secs, .. }
        | Event::TimerResumed { remaining_secs, .. }
        | Event::Tick { remaining_secs, .. } => draw_face(*remaining_secs, ""),
        Event::TimerStarted { total_secs, .. } | Event::TimerStopped { total_secs, .. } => {
            draw_face(*total_secs, "")
        }
        Event::TimerPaused { remaining_secs, .. } => draw_face(*remaining_secs, " (paused)"),
        Event::TimerExpired { at } => {
            draw_face(0, "");
            println!();
            println!(
                "Time is up! ({})",
                at.with_timezone(&chrono::Local).format("%H:%M:%S")
            );
        }
    }
}

/// Two zero-padded fields, redrawn in place.
fn draw_face(remaining_secs: u32, marker: &str) {
    let face = ClockFace::from_secs(remaining_secs as i64);
    print!("\r  {} : {}{:<10}", face.minutes, face.seconds, marker);
    std::io::stdout().flush().ok();
}
