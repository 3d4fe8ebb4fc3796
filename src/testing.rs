//! Testing utilities and mock implementations.
//!
//! These types are provided for use in tests. They may appear unused in
//! the library itself but are consumed by unit and integration tests.

#![allow(dead_code)]

use crate::reminders::Notification;
use crate::traits::{Clock, Notifier};
use chrono::{NaiveDateTime, TimeDelta};
use std::sync::{Arc, Mutex, PoisonError};

/// A notifier that records every notification.
///
/// Clones share the same record, so a test can keep one handle and give the
/// other to the code under test.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    delivered: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Create a new recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Messages delivered so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.delivered().into_iter().map(|n| n.message).collect()
    }

    /// Drop everything recorded.
    pub fn clear(&self) {
        self.delivered.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.delivered.lock().unwrap_or_else(PoisonError::into_inner).push(notification.clone());
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    /// A clock stopped at `now`.
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Arc::new(Mutex::new(now)) }
    }

    /// Move to `now`.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::ReminderKind;
    use chrono::NaiveDate;

    #[test]
    fn test_recording_notifier_shares_record() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();
        notifier.notify(&Notification {
            todo_id: 1,
            kind: ReminderKind::Nearby,
            message: "Todo nearby: a!!".to_string(),
        });
        assert_eq!(handle.messages(), vec!["Todo nearby: a!!"]);
        handle.clear();
        assert!(notifier.delivered().is_empty());
    }

    #[test]
    fn test_fixed_clock() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(TimeDelta::minutes(2));
        assert_eq!(clock.now(), start + TimeDelta::minutes(2));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
