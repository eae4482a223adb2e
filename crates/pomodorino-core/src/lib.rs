//! # Pomodorino Core Library
//!
//! Core logic for the Pomodorino countdown timer. The library follows a
//! CLI-first philosophy: everything the timer does is available here, and the
//! CLI binary is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a pure countdown state machine; callers drive it by
//!   invoking `tick()` once per second
//! - **Timer Service**: a tokio actor that owns the engine, runs the
//!   one-second tick loop and broadcasts typed [`Event`]s to any number of
//!   subscribers
//! - **Notify**: the desktop notification surface (persistent countdown
//!   notification plus the expiry alert), best-effort by design
//! - **Storage**: TOML-based configuration at `~/.config/pomodorino/`
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core countdown state machine
//! - [`TimerService`] / [`TimerHandle`]: background tick loop and its handle
//! - [`Notifier`]: persistent notification and expiry alert
//! - [`Config`]: application configuration management

pub mod display;
pub mod error;
pub mod events;
pub mod notify;
pub mod service;
pub mod storage;
pub mod timer;

pub use display::ClockFace;
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use notify::Notifier;
pub use service::{Command, TimerHandle, TimerService};
pub use storage::Config;
pub use timer::{TimerEngine, TimerState};
