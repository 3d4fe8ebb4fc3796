//! Seams to the outside world: notification delivery and the clock.

use crate::reminders::Notification;
use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};

/// Trait for surfacing reminder messages to the user.
///
/// The production front end prints them; tests record them.
pub trait Notifier: Send {
    /// Show one notification.
    fn notify(&self, notification: &Notification);
}

/// Trait for reading the local wall-clock time.
pub trait Clock: Send + Sync {
    /// The current local date-time, whole seconds.
    fn now(&self) -> NaiveDateTime;
}

/// The system clock in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// The system clock moved by a fixed offset.
///
/// Starts at a chosen instant and then runs at wall-clock speed.
#[derive(Debug, Clone, Copy)]
pub struct ShiftedClock {
    offset: TimeDelta,
}

impl ShiftedClock {
    /// A clock that reads `start` now.
    #[must_use]
    pub fn starting_at(start: NaiveDateTime) -> Self {
        Self { offset: start - SystemClock.now() }
    }
}

impl Clock for ShiftedClock {
    fn now(&self) -> NaiveDateTime {
        SystemClock.now() + self.offset
    }
}

/// A notifier that only writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            todo_id = notification.todo_id,
            kind = ?notification.kind,
            "{}",
            notification.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_system_clock_has_whole_seconds() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }

    #[test]
    fn test_shifted_clock_starts_at_given_time() {
        let start = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let clock = ShiftedClock::starting_at(start);
        let read = clock.now();
        assert!(read >= start);
        assert!(read - start < TimeDelta::seconds(5));
    }
}
