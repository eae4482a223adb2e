//! Timer engine implementation.
//!
//! The timer engine is a pure countdown state machine. It does not use
//! internal threads or timers - the caller (normally the timer service) is
//! responsible for calling `tick()` once per second while the timer runs.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v (remaining hits zero)
//!        Expired -> Idle (stop only)
//! ```
//!
//! Commands in phases where they do not apply are no-ops returning `None`;
//! there are no observable error conditions.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Default countdown length: 5 minutes.
pub const DEFAULT_TOTAL_SECS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// The countdown reached zero and waits for an explicit `stop()`.
    Expired,
}

/// Core countdown engine.
///
/// Single source of truth for the countdown state. Invariant:
/// `remaining_secs <= total_secs` at all times.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    total_secs: u32,
    remaining_secs: u32,
    state: TimerState,
}

impl TimerEngine {
    /// Create a new engine in the `Idle` state with the full time remaining.
    pub fn new(total_secs: u32) -> Self {
        Self {
            total_secs,
            remaining_secs: total_secs,
            state: TimerState::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down.
    ///
    /// From `Idle` the countdown is re-based: `total` (if given) replaces the
    /// configured total and the remaining time resets to it. From `Paused`
    /// the countdown resumes with the remaining time preserved exactly; a
    /// `total` argument is ignored there. `Running` and `Expired` are no-ops.
    pub fn start(&mut self, total: Option<u32>) -> Option<Event> {
        match self.state {
            TimerState::Idle => {
                if let Some(total) = total {
                    self.total_secs = total;
                }
                self.remaining_secs = self.total_secs;
                self.state = TimerState::Running;
                Some(Event::TimerStarted {
                    total_secs: self.total_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Paused => {
                self.state = TimerState::Running;
                Some(Event::TimerResumed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Running | TimerState::Expired => None,
        }
    }

    /// Toggle play/pause.
    ///
    /// `Idle` and `Paused` start or resume the countdown; `Running` pauses
    /// it. `Expired` is ignored until an explicit `stop()`.
    pub fn toggle(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Paused => self.start(None),
            TimerState::Running => {
                self.state = TimerState::Paused;
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Expired => None,
        }
    }

    /// Stop from any phase: back to `Idle` with the full time remaining.
    ///
    /// Stopping an idle timer is safe and still reports `TimerStopped`.
    pub fn stop(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining_secs = self.total_secs;
        Some(Event::TimerStopped {
            total_secs: self.total_secs,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// Only meaningful while `Running`: decrements the remaining time, and at
    /// zero transitions to `Expired`, emitting `TimerExpired` exactly once.
    /// In any other phase this is a no-op returning `None`, so a tick that
    /// was cancelled by `stop()` or `toggle()` can never touch state.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = TimerState::Expired;
            Some(Event::TimerExpired { at: Utc::now() })
        } else {
            Some(Event::Tick {
                remaining_secs: self.remaining_secs,
                total_secs: self.total_secs,
                at: Utc::now(),
            })
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::default();
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(engine.start(None).is_some());
        assert_eq!(engine.state(), TimerState::Running);

        assert!(engine.toggle().is_some());
        assert_eq!(engine.state(), TimerState::Paused);

        assert!(engine.toggle().is_some());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn start_rebases_total_only_from_idle() {
        let mut engine = TimerEngine::default();
        engine.start(Some(10));
        assert_eq!(engine.total_secs(), 10);
        assert_eq!(engine.remaining_secs(), 10);

        engine.tick();
        engine.toggle();
        assert_eq!(engine.state(), TimerState::Paused);

        // Resuming must not re-base; remaining is preserved exactly.
        engine.start(Some(99));
        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(engine.total_secs(), 10);
        assert_eq!(engine.remaining_secs(), 9);
    }

    #[test]
    fn toggle_twice_from_idle_loses_no_time() {
        let mut engine = TimerEngine::default();
        assert!(matches!(
            engine.toggle(),
            Some(Event::TimerStarted { total_secs: 300, .. })
        ));
        assert_eq!(engine.state(), TimerState::Running);

        assert!(matches!(
            engine.toggle(),
            Some(Event::TimerPaused { remaining_secs: 300, .. })
        ));
        assert_eq!(engine.state(), TimerState::Paused);
        assert_eq!(engine.remaining_secs(), 300);
    }

    #[test]
    fn pause_preserves_remaining_exactly() {
        let mut engine = TimerEngine::new(60);
        engine.start(None);
        for _ in 0..13 {
            engine.tick();
        }
        assert_eq!(engine.remaining_secs(), 47);

        engine.toggle();
        assert_eq!(engine.remaining_secs(), 47);
        // Ticks while paused are cancelled callbacks; they must not fire.
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 47);

        engine.toggle();
        assert_eq!(engine.remaining_secs(), 47);
    }

    #[test]
    fn five_ticks_expire_exactly_once() {
        let mut engine = TimerEngine::new(5);
        engine.start(None);

        for expected in (1..5).rev() {
            assert!(matches!(
                engine.tick(),
                Some(Event::Tick { remaining_secs, .. }) if remaining_secs == expected
            ));
        }
        assert!(matches!(engine.tick(), Some(Event::TimerExpired { .. })));
        assert_eq!(engine.state(), TimerState::Expired);
        assert_eq!(engine.remaining_secs(), 0);

        // Further ticks emit nothing.
        assert!(engine.tick().is_none());
        assert!(engine.tick().is_none());
    }

    #[test]
    fn expired_ignores_toggle_until_stop() {
        let mut engine = TimerEngine::new(1);
        engine.start(None);
        engine.tick();
        assert_eq!(engine.state(), TimerState::Expired);

        assert!(engine.toggle().is_none());
        assert!(engine.start(None).is_none());
        assert_eq!(engine.state(), TimerState::Expired);

        assert!(matches!(engine.stop(), Some(Event::TimerStopped { .. })));
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 1);
    }

    #[test]
    fn stop_resets_remaining_to_total() {
        let mut engine = TimerEngine::default();
        engine.start(None);
        engine.tick();
        engine.tick();
        assert_eq!(engine.remaining_secs(), 298);

        engine.stop();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), engine.total_secs());

        // Stopping an idle timer stays a safe no-op.
        assert!(engine.stop().is_some());
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn tick_on_idle_is_noop() {
        let mut engine = TimerEngine::default();
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 300);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::default();
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                remaining_secs,
                total_secs,
                ..
            } => {
                assert_eq!(state, TimerState::Idle);
                assert_eq!(remaining_secs, 300);
                assert_eq!(total_secs, 300);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn remaining_never_exceeds_total() {
        let mut engine = TimerEngine::new(3);
        engine.start(None);
        for _ in 0..10 {
            engine.tick();
            assert!(engine.remaining_secs() <= engine.total_secs());
        }
        engine.stop();
        assert!(engine.remaining_secs() <= engine.total_secs());
    }
}
