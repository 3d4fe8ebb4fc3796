//! The app session: state, settings, reminders and location in one place.
//!
//! An [`App`] is constructed once per session and passed to whatever needs
//! it; there are no globals. The reminder loop shares it behind a mutex.

use crate::error::{Result, ValidationError};
use crate::location::{Coordinates, LocationTracker};
use crate::reminders::{Notification, ReminderEngine};
use crate::settings::{DescriptionLines, Settings};
use crate::sort::{self, SortOrder, TodoView};
use crate::todos::{Group, GroupIcon, SharedStore, Subtask, Todo, TodoDraft, TodoState};
use crate::traits::{Clock, Notifier};
use chrono::NaiveDateTime;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// One user session.
pub struct App {
    state: TodoState,
    settings: Settings,
    reminders: ReminderEngine,
    location: LocationTracker,
    notifier: Box<dyn Notifier>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("state", &self.state)
            .field("settings", &self.settings)
            .field("reminders", &self.reminders)
            .field("location", &self.location.current())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Load todos and settings from `store` and start a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn open(
        store: SharedStore,
        location: LocationTracker,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        let settings = Settings::load(store.as_ref())?;
        let state = TodoState::load(store)?;
        Ok(Self { state, settings, reminders: ReminderEngine::new(), location, notifier })
    }

    /// The todo collections.
    #[must_use]
    pub const fn state(&self) -> &TodoState {
        &self.state
    }

    /// Current preferences.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Reminder bookkeeping.
    #[must_use]
    pub const fn reminders(&self) -> &ReminderEngine {
        &self.reminders
    }

    /// Handle to the current-location slot.
    #[must_use]
    pub const fn location(&self) -> &LocationTracker {
        &self.location
    }

    /// Record a new location fix.
    pub fn update_location(&self, fix: Coordinates) {
        self.location.update(fix);
    }

    // Todos

    /// A draft editing the todo `id`, with its subtasks.
    #[must_use]
    pub fn edit_draft(&self, id: i64) -> Option<TodoDraft> {
        self.state.todo(id).map(|todo| TodoDraft::edit(todo, self.state.subtasks()))
    }

    /// Save a draft, recording `now` and the current fix if requested.
    /// Editing re-arms the todo's reminders.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a store error from inserting.
    pub fn save_draft(&mut self, draft: TodoDraft, now: NaiveDateTime) -> Result<i64> {
        let editing = draft.editing_id();
        let id = draft.save(&mut self.state, now, self.location.current())?;
        if editing.is_some() {
            self.reminders.rearm(id);
        }
        Ok(id)
    }

    /// Mark a todo (and, when completing, its subtasks) done or not done.
    /// Reminders already delivered stay suppressed.
    pub fn set_completed(&mut self, id: i64, completed: bool) -> bool {
        self.state.set_completed(id, completed)
    }

    /// Mark a todo as favorite or not.
    pub fn set_favorite(&mut self, id: i64, favorite: bool) -> bool {
        self.state.set_favorite(id, favorite)
    }

    /// Delete a todo and its subtasks.
    pub fn delete_todo(&mut self, id: i64) -> bool {
        let deleted = self.state.delete_todo(id);
        if deleted {
            self.reminders.rearm(id);
        }
        deleted
    }

    /// Delete every completed todo. Returns the deleted ids.
    pub fn delete_completed(&mut self) -> Vec<i64> {
        let ids = self.state.delete_completed();
        for &id in &ids {
            self.reminders.rearm(id);
        }
        ids
    }

    /// Todos listed by `view`, in the configured sort order.
    #[must_use]
    pub fn visible_todos(&self, view: &TodoView) -> Vec<&Todo> {
        let here = self.location.current();
        sort::visible_todos(self.state.todos(), view, self.settings.sort_by, here)
    }

    // Subtasks

    /// Add a subtask to an existing todo.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or a store error.
    pub fn add_subtask(&mut self, todo_id: i64, name: &str) -> Result<i64> {
        self.state.insert_subtask(Subtask {
            id: 0,
            todo_id,
            name: name.trim().to_string(),
            completed: false,
        })
    }

    /// Rename a subtask.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BlankName`] for a blank name.
    pub fn rename_subtask(&mut self, id: i64, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankName.into());
        }
        let Some(subtask) = self.state.subtask(id) else {
            tracing::info!(id, "rename of unknown subtask ignored");
            return Ok(false);
        };
        let renamed = Subtask { name: name.to_string(), ..subtask.clone() };
        Ok(self.state.update_subtask(renamed))
    }

    /// Mark a subtask done or not done; the parent follows its subtasks.
    pub fn set_subtask_completed(&mut self, id: i64, completed: bool) -> bool {
        self.state.set_subtask_completed(id, completed)
    }

    /// Delete a subtask.
    pub fn delete_subtask(&mut self, id: i64) -> bool {
        self.state.delete_subtask(id)
    }

    // Groups

    /// Create a visible group.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateGroupName`] for a blank or taken name.
    pub fn add_group(&mut self, name: &str, icon: GroupIcon) -> Result<()> {
        self.state.insert_group(Group::new(name, icon))
    }

    /// Show or hide a group on the home screen.
    pub fn set_group_visibility(&mut self, name: &str, visible: bool) -> bool {
        self.state.set_group_visibility(name, visible)
    }

    /// Groups shown on the home screen.
    pub fn visible_groups(&self) -> impl Iterator<Item = &Group> {
        self.state.groups().iter().filter(|g| g.visible)
    }

    /// Delete a group with its todos and their subtasks.
    pub fn delete_group(&mut self, name: &str) -> Option<Vec<i64>> {
        let deleted = self.state.delete_group(name)?;
        for &id in &deleted {
            self.reminders.rearm(id);
        }
        Some(deleted)
    }

    // Settings

    /// Turn reminder delivery on or off.
    pub fn set_notifications(&mut self, on: bool) {
        self.settings.set_notifications(self.state.store().as_ref(), on);
    }

    /// Change the list sort order.
    pub fn set_sort_by(&mut self, order: SortOrder) {
        self.settings.set_sort_by(self.state.store().as_ref(), order);
    }

    /// Change the description preview length.
    pub fn set_description_lines(&mut self, lines: DescriptionLines) {
        self.settings.set_description_lines(self.state.store().as_ref(), lines);
    }

    /// Turn dark mode on or off.
    pub fn set_dark_mode(&mut self, on: bool) {
        self.settings.set_dark_mode(self.state.store().as_ref(), on);
    }

    // Reminders

    /// Run one reminder poll at `now`.
    ///
    /// Fired reminders are marked either way; they are delivered to the
    /// notifier only while notifications are enabled.
    pub fn poll_reminders(&mut self, now: NaiveDateTime) -> Vec<Notification> {
        let fired = self.reminders.poll(self.state.todos(), now, self.location.current());
        if self.settings.notifications {
            for notification in &fired {
                self.notifier.notify(notification);
            }
        } else if !fired.is_empty() {
            tracing::debug!(count = fired.len(), "notifications disabled; not delivering");
        }
        fired
    }
}

/// Poll reminders every `interval` until `shutdown` is notified.
///
/// The first poll runs immediately.
///
/// # Example
///
/// ```ignore
/// let shutdown = Arc::new(Notify::new());
/// let clock = Arc::new(SystemClock);
/// let handle = spawn_reminder_loop(app, clock, POLL_INTERVAL, Arc::clone(&shutdown));
/// // ... session runs ...
/// shutdown.notify_one();
/// handle.await?;
/// ```
pub fn spawn_reminder_loop(
    app: Arc<Mutex<App>>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    shutdown: Arc<Notify>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            poll_once(&app, clock.as_ref());
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = shutdown.notified() => break,
            }
        }
        tracing::debug!("reminder loop stopped");
    })
}

fn poll_once(app: &Mutex<App>, clock: &dyn Clock) {
    let now = clock.now();
    app.lock().unwrap_or_else(PoisonError::into_inner).poll_reminders(now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::{ReminderKind, POLL_INTERVAL};
    use crate::testing::RecordingNotifier;
    use crate::todos::{MemoryTodoStore, Timestamp};
    use chrono::{NaiveDate, TimeDelta};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn open_app() -> (App, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let app = App::open(
            Arc::new(MemoryTodoStore::new()),
            LocationTracker::new(),
            Box::new(notifier.clone()),
        )
        .unwrap();
        (app, notifier)
    }

    fn draft(name: &str) -> TodoDraft {
        TodoDraft::named(name)
    }

    fn due_draft(name: &str, due: NaiveDateTime) -> TodoDraft {
        let (date, time) = Timestamp::at(due).to_parts();
        let mut draft = draft(name);
        draft.date = date;
        draft.time = time;
        draft
    }

    #[test]
    fn test_due_reminder_rearmed_by_edit() {
        let (mut app, notifier) = open_app();
        let id = app.save_draft(due_draft("Call Bob", start()), start()).unwrap();

        assert_eq!(app.poll_reminders(start()).len(), 1);
        assert!(app.poll_reminders(start()).is_empty());
        assert_eq!(notifier.messages(), vec!["Call Bob: Due Now"]);

        let mut edit = app.edit_draft(id).unwrap();
        edit.description = "about the trip".to_string();
        app.save_draft(edit, start()).unwrap();
        assert!(!app.reminders().due_notified(id));
        assert_eq!(app.poll_reminders(start()).len(), 1);
    }

    #[test]
    fn test_disabled_notifications_still_mark() {
        let (mut app, notifier) = open_app();
        let id = app.save_draft(due_draft("Call Bob", start()), start()).unwrap();
        app.set_notifications(false);

        let fired = app.poll_reminders(start());
        assert_eq!(fired.len(), 1);
        assert!(notifier.delivered().is_empty());
        assert!(app.reminders().due_notified(id));

        app.set_notifications(true);
        assert!(app.poll_reminders(start()).is_empty());
    }

    #[test]
    fn test_nearby_uses_tracker() {
        let (mut app, notifier) = open_app();
        let mut nearby = draft("Post office");
        nearby.location = "0,0.001".to_string();
        nearby.notification_distance = 500.0;
        let id = app.save_draft(nearby, start()).unwrap();

        assert!(app.poll_reminders(start()).is_empty());
        app.update_location(Coordinates::new(0.0, 0.0));
        let fired = app.poll_reminders(start());
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, ReminderKind::Nearby);
        assert!(app.poll_reminders(start()).is_empty());
        assert_eq!(notifier.messages(), vec!["Todo nearby: Post office!!"]);

        assert!(app.set_favorite(id, true));
        assert!(app.reminders().nearby_notified(id));
        assert!(app.poll_reminders(start()).is_empty());
    }

    #[test]
    fn test_flag_toggles_keep_due_reminder_suppressed() {
        let (mut app, notifier) = open_app();
        let id = app.save_draft(due_draft("Call", start()), start()).unwrap();
        let sub = app.add_subtask(id, "Dial").unwrap();
        assert_eq!(app.poll_reminders(start()).len(), 1);

        assert!(app.set_favorite(id, true));
        assert!(app.poll_reminders(start()).is_empty());
        assert!(app.set_completed(id, true));
        assert!(app.set_completed(id, false));
        assert!(app.poll_reminders(start()).is_empty());
        assert!(app.set_subtask_completed(sub, true));
        assert!(app.set_subtask_completed(sub, false));
        assert!(app.poll_reminders(start()).is_empty());

        assert!(app.reminders().due_notified(id));
        assert_eq!(notifier.messages(), vec!["Call: Due Now"]);
    }

    #[test]
    fn test_completed_todo_is_silent() {
        let (mut app, _notifier) = open_app();
        let id = app.save_draft(due_draft("Call Bob", start()), start()).unwrap();
        assert!(app.set_completed(id, true));
        assert!(app.poll_reminders(start()).is_empty());
    }

    #[test]
    fn test_visible_todos_use_sort_setting() {
        let (mut app, _notifier) = open_app();
        let mut high = draft("b high");
        high.priority = crate::todos::Priority::High;
        let a = app.save_draft(draft("a none"), start()).unwrap();
        let b = app.save_draft(high, start()).unwrap();

        let ids = |app: &App| -> Vec<i64> {
            app.visible_todos(&TodoView::All).iter().map(|t| t.id).collect()
        };
        assert_eq!(ids(&app), vec![a, b]);
        app.set_sort_by(SortOrder::Priority);
        assert_eq!(ids(&app), vec![b, a]);
        app.set_sort_by(SortOrder::Distance);
        assert_eq!(ids(&app), vec![a, b]);
    }

    #[test]
    fn test_subtask_operations() {
        let (mut app, _notifier) = open_app();
        let id = app.save_draft(draft("Trip"), start()).unwrap();
        let sub = app.add_subtask(id, "Tickets").unwrap();

        assert!(app.rename_subtask(sub, "Plane tickets").unwrap());
        assert!(app.rename_subtask(sub, " ").is_err());
        assert!(!app.rename_subtask(999, "x").unwrap());
        assert_eq!(app.state().subtask(sub).unwrap().name, "Plane tickets");

        assert!(app.set_subtask_completed(sub, true));
        assert!(app.state().todo(id).unwrap().completed);
        assert!(app.delete_subtask(sub));
        assert!(!app.delete_subtask(sub));
    }

    #[test]
    fn test_groups() {
        let (mut app, _notifier) = open_app();
        app.add_group("Work", GroupIcon::List).unwrap();
        app.add_group("Travel", GroupIcon::Travel).unwrap();
        assert!(app.add_group("Work", GroupIcon::Money).is_err());

        app.set_group_visibility("Travel", false);
        let shown: Vec<_> = app.visible_groups().map(|g| g.name.as_str()).collect();
        assert_eq!(shown, vec!["Work"]);

        let mut report = draft("Report");
        report.group = Some("Work".to_string());
        let member = app.save_draft(report, start()).unwrap();
        assert_eq!(app.delete_group("Work"), Some(vec![member]));
        assert!(app.state().todo(member).is_none());
    }

    #[test]
    fn test_settings_survive_reopen() {
        let store = Arc::new(MemoryTodoStore::new());
        let mut app =
            App::open(store.clone(), LocationTracker::new(), Box::new(RecordingNotifier::new()))
                .unwrap();
        app.set_dark_mode(true);
        app.set_description_lines(DescriptionLines::Two);

        let reopened =
            App::open(store, LocationTracker::new(), Box::new(RecordingNotifier::new())).unwrap();
        assert!(reopened.settings().dark_mode);
        assert_eq!(reopened.settings().description_lines, DescriptionLines::Two);
    }

    /// A wall clock that follows tokio's (possibly paused) clock.
    struct TokioClock {
        wall: NaiveDateTime,
        origin: tokio::time::Instant,
    }

    impl Clock for TokioClock {
        fn now(&self) -> NaiveDateTime {
            let elapsed = TimeDelta::from_std(self.origin.elapsed()).unwrap();
            self.wall + elapsed
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reminder_loop_polls_until_shutdown() {
        let (mut app, notifier) = open_app();
        app.save_draft(due_draft("Call Bob", start() + TimeDelta::seconds(130)), start()).unwrap();
        let app = Arc::new(Mutex::new(app));
        let clock = Arc::new(TokioClock { wall: start(), origin: tokio::time::Instant::now() });
        let shutdown = Arc::new(Notify::new());

        let handle =
            spawn_reminder_loop(Arc::clone(&app), clock, POLL_INTERVAL, Arc::clone(&shutdown));

        // Polls at 0s and 60s are too early; the one at 120s is inside the window.
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert!(notifier.delivered().is_empty());
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(notifier.messages(), vec!["Call Bob: Due Now"]);

        shutdown.notify_one();
        handle.await.unwrap();
    }
}
