//! MM:SS projection of the countdown.
//!
//! The clock face is a derived, ephemeral view: two zero-padded two-digit
//! fields recomputed on every tick. Negative inputs clamp to zero rather
//! than raising; minutes above 99 keep growing digits instead of wrapping.

/// The two rendered fields of the countdown display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    pub minutes: String,
    pub seconds: String,
}

impl ClockFace {
    pub fn from_secs(secs: i64) -> Self {
        let secs = secs.max(0);
        Self {
            minutes: format!("{:02}", secs / 60),
            seconds: format!("{:02}", secs % 60),
        }
    }
}

/// Format remaining seconds as zero-padded `MM:SS`.
pub fn format_mmss(secs: i64) -> String {
    let face = ClockFace::from_secs(secs);
    format!("{}:{}", face.minutes, face.seconds)
}

/// Body text of the persistent countdown notification.
pub fn notification_body(remaining_secs: u32) -> String {
    format!("{} remaining", format_mmss(remaining_secs as i64))
}
