//! The add/edit form for a todo.
//!
//! A [`TodoDraft`] holds the user's input as text until it is saved. Saving
//! validates everything first, then inserts or updates the todo, then writes
//! the pending subtasks against the resolved todo id.

use crate::error::{Result, ValidationError};
use crate::location::Coordinates;
use crate::todos::models::{Priority, Subtask, Timestamp, Todo};
use crate::todos::state::TodoState;
use crate::todos::templates::Template;
use chrono::NaiveDateTime;

/// Largest accepted notification distance, in meters.
pub const MAX_NOTIFICATION_DISTANCE: f32 = 1000.0;

/// A subtask edited inside a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubtask {
    /// Id of the stored subtask, or `None` for one added in this draft.
    pub id: Option<i64>,
    /// Subtask text.
    pub name: String,
    /// Whether the subtask is done.
    pub completed: bool,
}

/// In-progress input for creating or editing a todo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoDraft {
    /// Todo name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Priority.
    pub priority: Priority,
    /// Reminder date, `YYYY-MM-DD`, or empty.
    pub date: String,
    /// Reminder time, `HH:MM[:SS]`, or empty.
    pub time: String,
    /// Location as `"lat, lon"`, or empty.
    pub location: String,
    /// Proximity radius in meters.
    pub notification_distance: f32,
    /// Attached image URIs.
    pub images: Vec<String>,
    /// Group name, if any.
    pub group: Option<String>,
    /// Record the creation time on save.
    pub record_created_at: bool,
    /// Record the current location on save.
    pub record_created_location: bool,
    /// Subtasks as edited so far.
    pub subtasks: Vec<PendingSubtask>,
    removed_subtasks: Vec<i64>,
    editing: Option<Todo>,
}

impl TodoDraft {
    /// An empty draft for a new todo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty draft for a new todo called `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self { name: name.to_string(), ..Self::default() }
    }

    /// A draft prefilled from a built-in template.
    #[must_use]
    pub fn from_template(template: &Template) -> Self {
        let mut draft = Self {
            name: template.name.to_string(),
            description: template.description.to_string(),
            priority: template.priority,
            ..Self::default()
        };
        for name in template.subtasks {
            draft.subtasks.push(PendingSubtask {
                id: None,
                name: (*name).to_string(),
                completed: false,
            });
        }
        draft
    }

    /// A draft that edits `todo` and its existing subtasks.
    #[must_use]
    pub fn edit(todo: &Todo, subtasks: &[Subtask]) -> Self {
        let (date, time) = todo.due.to_parts();
        Self {
            name: todo.name.clone(),
            description: todo.description.clone(),
            priority: todo.priority,
            date,
            time,
            location: todo.location.map(|c| c.to_string()).unwrap_or_default(),
            notification_distance: todo.notification_distance,
            images: todo.images.clone(),
            group: todo.group.clone(),
            record_created_at: todo.created_at.is_set(),
            record_created_location: todo.created_location.is_some(),
            subtasks: subtasks
                .iter()
                .filter(|s| s.todo_id == todo.id)
                .map(|s| PendingSubtask {
                    id: Some(s.id),
                    name: s.name.clone(),
                    completed: s.completed,
                })
                .collect(),
            removed_subtasks: Vec::new(),
            editing: Some(todo.clone()),
        }
    }

    /// Id of the todo being edited, if any.
    #[must_use]
    pub fn editing_id(&self) -> Option<i64> {
        self.editing.as_ref().map(|t| t.id)
    }

    /// Append a new pending subtask. A blank name becomes `"Subtask N"`.
    pub fn add_subtask(&mut self, name: &str) -> usize {
        let name = name.trim();
        let name = if name.is_empty() {
            format!("Subtask {}", self.subtasks.len() + 1)
        } else {
            name.to_string()
        };
        self.subtasks.push(PendingSubtask { id: None, name, completed: false });
        self.subtasks.len() - 1
    }

    /// Rename the pending subtask at `index`. Returns `false` if out of range.
    pub fn rename_subtask(&mut self, index: usize, name: &str) -> bool {
        let Some(subtask) = self.subtasks.get_mut(index) else {
            tracing::info!(index, "rename of unknown pending subtask ignored");
            return false;
        };
        name.trim().clone_into(&mut subtask.name);
        true
    }

    /// Drop the pending subtask at `index`; a stored one is deleted on save.
    pub fn remove_subtask(&mut self, index: usize) -> Option<PendingSubtask> {
        if index >= self.subtasks.len() {
            return None;
        }
        let removed = self.subtasks.remove(index);
        if let Some(id) = removed.id {
            self.removed_subtasks.push(id);
        }
        Some(removed)
    }

    /// Check the draft and build the todo it describes.
    ///
    /// `now` and `here` are recorded as creation time and location when the
    /// matching flags are set and nothing was recorded before.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found: blank name, malformed
    /// location, half-set or invalid reminder, distance out of range, or a
    /// blank subtask name.
    pub fn validate(
        &self,
        now: NaiveDateTime,
        here: Option<Coordinates>,
    ) -> std::result::Result<Todo, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankName);
        }
        let location = match self.location.trim() {
            "" => None,
            text => Some(Coordinates::parse(text)?),
        };
        let due = Timestamp::from_parts(&self.date, &self.time)?;
        if !(0.0..=MAX_NOTIFICATION_DISTANCE).contains(&self.notification_distance) {
            return Err(ValidationError::DistanceOutOfRange(self.notification_distance));
        }
        if self.subtasks.iter().any(|s| s.name.trim().is_empty()) {
            return Err(ValidationError::BlankName);
        }

        let previous = self.editing.as_ref();
        let created_at = match previous.map(|t| &t.created_at) {
            _ if !self.record_created_at => Timestamp::Unset,
            Some(recorded) if recorded.is_set() => recorded.clone(),
            _ => Timestamp::at(now),
        };
        let created_location = if self.record_created_location {
            previous.and_then(|t| t.created_location).or(here)
        } else {
            None
        };

        Ok(Todo {
            id: previous.map_or(0, |t| t.id),
            name: name.to_string(),
            description: self.description.clone(),
            priority: self.priority,
            created_at,
            due,
            created_location,
            location,
            notification_distance: self.notification_distance,
            images: self.images.clone(),
            completed: previous.is_some_and(|t| t.completed),
            favorite: previous.is_some_and(|t| t.favorite),
            group: self
                .group
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
        })
    }

    /// Validate and save into `state`, returning the todo id.
    ///
    /// # Errors
    ///
    /// Returns a validation error (nothing is changed), or a store error if
    /// a new todo or subtask could not be inserted.
    pub fn save(
        self,
        state: &mut TodoState,
        now: NaiveDateTime,
        here: Option<Coordinates>,
    ) -> Result<i64> {
        let todo = self.validate(now, here)?;
        let todo_id = if self.editing.is_some() {
            let id = todo.id;
            state.update_todo(todo)?;
            id
        } else {
            state.insert_todo(todo)?
        };

        for id in self.removed_subtasks {
            state.delete_subtask(id);
        }
        for pending in self.subtasks {
            let subtask = Subtask {
                id: pending.id.unwrap_or(0),
                todo_id,
                name: pending.name.trim().to_string(),
                completed: pending.completed,
            };
            if pending.id.is_some() {
                state.update_subtask(subtask);
            } else {
                state.insert_subtask(subtask)?;
            }
        }
        Ok(todo_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::todos::memory::MemoryTodoStore;
    use crate::todos::templates::find_template;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

    fn empty_state() -> TodoState {
        TodoState::new(Arc::new(MemoryTodoStore::new()))
    }

    fn named(name: &str) -> TodoDraft {
        TodoDraft::named(name)
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert_eq!(named("  ").validate(now(), None).unwrap_err(), ValidationError::BlankName);
    }

    #[test]
    fn test_validate_rejects_bad_location() {
        let draft = TodoDraft { location: "somewhere".to_string(), ..named("a") };
        assert!(matches!(
            draft.validate(now(), None),
            Err(ValidationError::InvalidCoordinates(_))
        ));
    }

    #[test]
    fn test_validate_rejects_half_reminder() {
        let draft = TodoDraft { date: "2024-03-02".to_string(), ..named("a") };
        assert_eq!(draft.validate(now(), None).unwrap_err(), ValidationError::IncompleteReminder);
    }

    #[test]
    fn test_validate_rejects_distance_out_of_range() {
        for distance in [-1.0, 1000.5] {
            let draft = TodoDraft { notification_distance: distance, ..named("a") };
            assert!(matches!(
                draft.validate(now(), None),
                Err(ValidationError::DistanceOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_validate_builds_todo() {
        let draft = TodoDraft {
            date: "2024-03-02".to_string(),
            time: "10:30:00".to_string(),
            location: "0, 0.001".to_string(),
            notification_distance: 200.0,
            group: Some("Work".to_string()),
            record_created_at: true,
            record_created_location: true,
            ..named("  Call Bob ")
        };
        let here = Coordinates::new(1.0, 2.0);
        let todo = draft.validate(now(), Some(here)).unwrap();
        assert_eq!(todo.name, "Call Bob");
        assert_eq!(todo.due.to_wire(), "2024-03-02T10:30:00");
        assert_eq!(todo.created_at, Timestamp::At(now()));
        assert_eq!(todo.created_location, Some(here));
        assert_eq!(todo.location, Some(Coordinates::new(0.0, 0.001)));
        assert_eq!(todo.group.as_deref(), Some("Work"));
        assert!(!todo.completed);
    }

    #[test]
    fn test_save_new_with_subtasks() {
        let mut state = empty_state();
        let mut draft = named("Trip");
        draft.add_subtask("Tickets");
        draft.add_subtask("");
        let id = draft.save(&mut state, now(), None).unwrap();

        let names: Vec<_> = state.subtasks_of(id).map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["Tickets", "Subtask 2"]);
    }

    #[test]
    fn test_failed_validation_changes_nothing() {
        let mut state = empty_state();
        let mut draft = named("");
        draft.add_subtask("orphan");
        let err = draft.save(&mut state, now(), None).unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::BlankName)));
        assert!(state.todos().is_empty());
        assert!(state.subtasks().is_empty());
    }

    #[test]
    fn test_edit_round_trip_preserves_flags_and_creation() {
        let mut state = empty_state();
        let draft = TodoDraft { record_created_at: true, ..named("Trip") };
        let id = draft.save(&mut state, now(), None).unwrap();
        state.set_favorite(id, true);
        state.set_completed(id, true);

        let later = now() + chrono::TimeDelta::hours(3);
        let mut edit = TodoDraft::edit(state.todo(id).unwrap(), state.subtasks());
        assert_eq!(edit.editing_id(), Some(id));
        edit.description = "updated".to_string();
        assert_eq!(edit.save(&mut state, later, None).unwrap(), id);

        let todo = state.todo(id).unwrap();
        assert_eq!(todo.description, "updated");
        assert!(todo.favorite);
        assert!(todo.completed);
        assert_eq!(todo.created_at, Timestamp::At(now()));
        assert_eq!(state.todos().len(), 1);
    }

    #[test]
    fn test_edit_renames_and_removes_subtasks() {
        let mut state = empty_state();
        let mut draft = named("Trip");
        draft.add_subtask("Tickets");
        draft.add_subtask("Hotel");
        let id = draft.save(&mut state, now(), None).unwrap();

        let mut edit = TodoDraft::edit(state.todo(id).unwrap(), state.subtasks());
        assert!(edit.rename_subtask(0, "Plane tickets"));
        assert!(!edit.rename_subtask(9, "nope"));
        assert_eq!(edit.remove_subtask(1).unwrap().name, "Hotel");
        edit.add_subtask("Car");
        edit.save(&mut state, now(), None).unwrap();

        let names: Vec<_> = state.subtasks_of(id).map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["Plane tickets", "Car"]);
    }

    #[test]
    fn test_edit_loads_reminder_parts() {
        let mut todo = Todo::new("a");
        todo.id = 3;
        todo.due = Timestamp::parse("2024-03-02T10:30:00");
        todo.location = Some(Coordinates::new(1.5, 2.5));
        let draft = TodoDraft::edit(&todo, &[]);
        assert_eq!(draft.date, "2024-03-02");
        assert_eq!(draft.time, "10:30:00");
        assert_eq!(draft.location, "1.5, 2.5");
        assert_eq!(draft.validate(now(), None).unwrap(), todo);
    }

    #[test]
    fn test_turning_off_record_flags_clears_values() {
        let mut todo = Todo::new("a");
        todo.id = 1;
        todo.created_at = Timestamp::At(now());
        todo.created_location = Some(Coordinates::new(1.0, 1.0));
        let mut draft = TodoDraft::edit(&todo, &[]);
        assert!(draft.record_created_at && draft.record_created_location);
        draft.record_created_at = false;
        draft.record_created_location = false;
        let saved = draft.validate(now(), None).unwrap();
        assert_eq!(saved.created_at, Timestamp::Unset);
        assert_eq!(saved.created_location, None);
    }

    #[test]
    fn test_from_template() {
        let draft = TodoDraft::from_template(find_template("Air Travel Bookings").unwrap());
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.description, "Important tasks for air travelling!");
        assert_eq!(draft.subtasks.len(), 3);
        assert!(draft.subtasks.iter().all(|s| s.id.is_none() && !s.completed));

        let mut state = empty_state();
        let id = draft.save(&mut state, now(), None).unwrap();
        assert_eq!(state.subtasks_of(id).count(), 3);
    }
}
