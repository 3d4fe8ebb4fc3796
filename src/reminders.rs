//! Date and proximity reminders.
//!
//! [`ReminderEngine::poll`] is called once per [`POLL_INTERVAL`]. A due
//! reminder fires when the reminder time is within [`TOLERANCE_MS`] of now
//! and then stays silent until the todo is edited. The one-day and two-day
//! heads-up messages are not remembered and repeat on every poll that lands
//! inside their window. A proximity reminder fires once when the current
//! location is within the todo's notification distance.

use crate::location::Coordinates;
use crate::todos::{Timestamp, Todo};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

/// Time between polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Width of every reminder window, in milliseconds.
pub const TOLERANCE_MS: i64 = 60_000;

const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;
const TWO_DAYS_MS: i64 = 2 * ONE_DAY_MS;

/// Which condition produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// The reminder time is now.
    Due,
    /// The reminder time is a day away.
    OneDayAhead,
    /// The reminder time is two days away.
    TwoDaysAhead,
    /// The current location is near the todo's location.
    Nearby,
}

/// A message to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// The todo it is about.
    pub todo_id: i64,
    /// What triggered it.
    pub kind: ReminderKind,
    /// Text to display.
    pub message: String,
}

/// Tracks which todos have already been notified this session.
#[derive(Debug, Clone, Default)]
pub struct ReminderEngine {
    notified_due: HashSet<i64>,
    notified_nearby: HashSet<i64>,
}

impl ReminderEngine {
    /// An engine with nothing notified yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one poll: date reminders, then proximity reminders.
    pub fn poll(
        &mut self,
        todos: &[Todo],
        now: NaiveDateTime,
        here: Option<Coordinates>,
    ) -> Vec<Notification> {
        let mut fired = self.check_due(todos, now);
        fired.extend(self.check_nearby(todos, here));
        tracing::debug!(todos = todos.len(), fired = fired.len(), "reminder poll");
        fired
    }

    /// Check reminder times against `now`.
    pub fn check_due(&mut self, todos: &[Todo], now: NaiveDateTime) -> Vec<Notification> {
        let mut fired = Vec::new();
        for todo in todos {
            if todo.completed || self.notified_due.contains(&todo.id) {
                continue;
            }
            let due = match &todo.due {
                Timestamp::Unset => continue,
                Timestamp::Malformed(raw) => {
                    tracing::debug!(id = todo.id, raw = %raw, "skipping unparsable reminder time");
                    continue;
                }
                Timestamp::At(due) => *due,
            };

            let diff = (due - now).num_milliseconds().abs();
            let (kind, message) = if diff <= TOLERANCE_MS {
                self.notified_due.insert(todo.id);
                (ReminderKind::Due, format!("{}: Due {}", todo.name, describe_due(due, now)))
            } else if (ONE_DAY_MS..=ONE_DAY_MS + TOLERANCE_MS).contains(&diff) {
                (ReminderKind::OneDayAhead, format!("{}: Reminder in 24 hours", todo.name))
            } else if (TWO_DAYS_MS..=TWO_DAYS_MS + TOLERANCE_MS).contains(&diff) {
                (ReminderKind::TwoDaysAhead, format!("{}: Reminder in 2 days", todo.name))
            } else {
                continue;
            };
            fired.push(Notification { todo_id: todo.id, kind, message });
        }
        fired
    }

    /// Check todo locations against the current fix. Does nothing without one.
    pub fn check_nearby(&mut self, todos: &[Todo], here: Option<Coordinates>) -> Vec<Notification> {
        let Some(here) = here else {
            return Vec::new();
        };
        let mut fired = Vec::new();
        for todo in todos {
            if todo.completed || self.notified_nearby.contains(&todo.id) {
                continue;
            }
            let Some(target) = todo.location else {
                continue;
            };
            let distance = here.distance_to(&target);
            tracing::trace!(
                id = todo.id,
                distance,
                radius = todo.notification_distance,
                "proximity check"
            );
            if distance <= f64::from(todo.notification_distance) {
                self.notified_nearby.insert(todo.id);
                fired.push(Notification {
                    todo_id: todo.id,
                    kind: ReminderKind::Nearby,
                    message: format!("Todo nearby: {}!!", todo.name),
                });
            }
        }
        fired
    }

    /// Allow every reminder for `id` to fire again (after an edit or delete).
    pub fn rearm(&mut self, id: i64) {
        self.notified_due.remove(&id);
        self.notified_nearby.remove(&id);
    }

    /// Whether the due reminder for `id` has fired.
    #[must_use]
    pub fn due_notified(&self, id: i64) -> bool {
        self.notified_due.contains(&id)
    }

    /// Whether the proximity reminder for `id` has fired.
    #[must_use]
    pub fn nearby_notified(&self, id: i64) -> bool {
        self.notified_nearby.contains(&id)
    }
}

/// Human phrase for when `due` is relative to `now`.
///
/// At least a day ahead gives the date (`"5 Mar at 09:30"`); otherwise whole
/// hours, then whole minutes, then `"Now"`.
#[must_use]
pub fn describe_due(due: NaiveDateTime, now: NaiveDateTime) -> String {
    let ahead = due - now;
    if ahead.num_days() >= 1 {
        due.format("%-d %b at %H:%M").to_string()
    } else if ahead.num_hours() > 0 {
        format!("in {} hours", ahead.num_hours())
    } else if ahead.num_minutes() > 0 {
        format!("in {} minutes", ahead.num_minutes())
    } else {
        "Now".to_string()
    }
}
