mod engine;

pub use engine::{TimerEngine, TimerState, DEFAULT_TOTAL_SECS};
