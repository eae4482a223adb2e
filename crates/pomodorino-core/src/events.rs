use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every state change in the timer produces an Event.
///
/// Events are the one-way channel between the background timer service and
/// its subscribers (terminal renderer, notifier). Subscribers are read-only
/// and may attach or detach at any time without affecting the countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        total_secs: u32,
        at: DateTime<Utc>,
    },
    /// One second elapsed while running.
    Tick {
        remaining_secs: u32,
        total_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// Timer returned to idle; remaining time is back at the total.
    TimerStopped {
        total_secs: u32,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. Emitted exactly once per run.
    TimerExpired {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        remaining_secs: u32,
        total_secs: u32,
        at: DateTime<Utc>,
    },
}
