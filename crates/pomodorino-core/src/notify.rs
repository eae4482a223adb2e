//! Desktop notification surface and expiry alert.
//!
//! The notifier mirrors what the countdown would look like on a phone: one
//! resident notification showing "MM:SS remaining" that is updated in place
//! every tick, and a buzz-pattern alert when the countdown expires.
//!
//! Everything here is best-effort. A missing notification server, a denied
//! capability or a disabled config flag must never affect the countdown
//! itself; failures are logged at debug level and otherwise swallowed.

use std::io::Write;

use tracing::debug;

use crate::display;
use crate::storage::NotificationsConfig;

#[cfg(all(unix, not(target_os = "macos")))]
use notify_rust::{Hint, Notification, NotificationHandle, Timeout, Urgency};
#[cfg(not(all(unix, not(target_os = "macos"))))]
use notify_rust::Notification;

/// Application name shown as the notification title.
pub const APP_NAME: &str = "Pomodorino";

/// Expiry buzz pattern in milliseconds, alternating pause and buzz segments
/// starting with a pause: wait 0, buzz 1500, wait 500, buzz 1500, wait 500,
/// buzz 1500. Played exactly once per expiry.
pub const ALERT_PATTERN_MS: [u64; 6] = [0, 1500, 500, 1500, 500, 1500];

/// Handle to the OS notification surface.
///
/// Holds on to the one resident countdown notification so repeated
/// `show_persistent` calls update it in place instead of stacking.
pub struct Notifier {
    enabled: bool,
    vibration: bool,
    #[cfg(all(unix, not(target_os = "macos")))]
    handle: Option<NotificationHandle>,
}

impl Notifier {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            enabled: config.enabled,
            vibration: config.vibration,
            #[cfg(all(unix, not(target_os = "macos")))]
            handle: None,
        }
    }

    /// Show or update the resident countdown notification.
    ///
    /// Idempotent: the first call creates the notification, later calls
    /// rewrite its body. The notification does not expire on its own and is
    /// marked resident so it stays up while the timer runs.
    pub fn show_persistent(&mut self, remaining_secs: u32) {
        if !self.enabled {
            return;
        }
        let body = display::notification_body(remaining_secs);

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            if let Some(handle) = self.handle.as_mut() {
                handle.body(&body);
                handle.update();
                return;
            }
            match Notification::new()
                .summary(APP_NAME)
                .appname(APP_NAME)
                .body(&body)
                .timeout(Timeout::Never)
                .hint(Hint::Resident(true))
                .show()
            {
                Ok(handle) => self.handle = Some(handle),
                Err(err) => debug!("countdown notification unavailable: {err}"),
            }
        }

        #[cfg(not(all(unix, not(target_os = "macos"))))]
        {
            // No resident-notification support without an XDG server; the
            // terminal face remains the only countdown surface.
            let _ = body;
        }
    }

    /// Remove the resident notification. No-op when none is showing.
    pub fn hide(&mut self) {
        #[cfg(all(unix, not(target_os = "macos")))]
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
    }

    /// One-shot expiry alert: clear the countdown notification, surface a
    /// short "Time is up!" message and play the buzz pattern.
    pub fn alert_expired(&mut self) {
        self.hide();

        if self.enabled {
            #[cfg(all(unix, not(target_os = "macos")))]
            let shown = Notification::new()
                .summary(APP_NAME)
                .appname(APP_NAME)
                .body("Time is up!")
                .urgency(Urgency::Critical)
                .timeout(Timeout::Milliseconds(5000))
                .show()
                .is_ok();
            #[cfg(not(all(unix, not(target_os = "macos"))))]
            let shown = Notification::new()
                .summary(APP_NAME)
                .appname(APP_NAME)
                .body("Time is up!")
                .show()
                .is_ok();
            if !shown {
                debug!("expiry notification unavailable, falling back to bell");
                bell();
            }
        }

        if self.vibration {
            // Detached so the caller's event loop is not held up for the
            // ~5.5s the pattern lasts.
            std::thread::spawn(|| buzz(&ALERT_PATTERN_MS));
        }
    }
}

/// Terminal bell, the poor man's vibration motor.
fn bell() {
    print!("\x07");
    std::io::stdout().flush().ok();
}

/// Play an Android-style vibration pattern on the terminal bell: even
/// entries are pauses, odd entries are buzz segments.
fn buzz(pattern: &[u64]) {
    for (i, &ms) in pattern.iter().enumerate() {
        if i % 2 == 1 {
            bell();
        }
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_starts_with_pause_and_buzzes_three_times() {
        assert_eq!(ALERT_PATTERN_MS.len(), 6);
        assert_eq!(ALERT_PATTERN_MS[0], 0);
        let buzzes: Vec<u64> = ALERT_PATTERN_MS
            .iter()
            .skip(1)
            .step_by(2)
            .copied()
            .collect();
        assert_eq!(buzzes, vec![1500, 1500, 1500]);
    }

    #[test]
    fn disabled_notifier_is_inert() {
        let mut notifier = Notifier::new(&NotificationsConfig {
            enabled: false,
            vibration: false,
        });
        notifier.show_persistent(120);
        notifier.hide();
        notifier.alert_expired();
    }
}
