//! In-memory task store with write-through persistence.
//!
//! [`TodoState`] owns the authoritative collections of todos, subtasks and
//! groups. Mutations are applied to memory first and then written to the
//! backing [`TodoStore`]; a failed write is logged and never rolled back.
//! Inserts are the exception: they wait for the store because it assigns ids.

use crate::error::{Result, ValidationError};
use crate::todos::models::{Group, Subtask, Todo, NO_GROUP};
use crate::todos::store::TodoStore;
use std::sync::Arc;

/// Shared handle to a persistence backend.
pub type SharedStore = Arc<dyn TodoStore + Send + Sync>;

/// The single owner of all todo, subtask and group collections.
pub struct TodoState {
    store: SharedStore,
    todos: Vec<Todo>,
    subtasks: Vec<Subtask>,
    groups: Vec<Group>,
}

impl std::fmt::Debug for TodoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoState")
            .field("todos", &self.todos.len())
            .field("subtasks", &self.subtasks.len())
            .field("groups", &self.groups.len())
            .finish_non_exhaustive()
    }
}

impl TodoState {
    /// Create an empty state over `store` without reading it.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store, todos: Vec::new(), subtasks: Vec::new(), groups: Vec::new() }
    }

    /// Load every collection from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(store: SharedStore) -> Result<Self> {
        let todos = store.list_todos()?;
        let subtasks = store.list_subtasks()?;
        let groups = store.list_groups()?;
        tracing::debug!(
            todos = todos.len(),
            subtasks = subtasks.len(),
            groups = groups.len(),
            "loaded todo state"
        );
        Ok(Self { store, todos, subtasks, groups })
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// All todos in insertion order.
    #[must_use]
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// All subtasks in insertion order.
    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    /// All groups in insertion order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Look up a todo by id.
    #[must_use]
    pub fn todo(&self, id: i64) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Look up a subtask by id.
    #[must_use]
    pub fn subtask(&self, id: i64) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| s.id == id)
    }

    /// Look up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Subtasks belonging to the todo `todo_id`.
    pub fn subtasks_of(&self, todo_id: i64) -> impl Iterator<Item = &Subtask> {
        self.subtasks.iter().filter(move |s| s.todo_id == todo_id)
    }

    // Todos

    /// Insert a new todo and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BlankName`] for a blank name, or the store
    /// error if the row could not be written. Nothing changes on error.
    pub fn insert_todo(&mut self, todo: Todo) -> Result<i64> {
        if todo.name.trim().is_empty() {
            return Err(ValidationError::BlankName.into());
        }
        let id = self.store.insert_todo(&todo)?;
        tracing::info!(id, name = %todo.name, "inserted todo");
        self.todos.push(Todo { id, ..todo });
        Ok(id)
    }

    /// Replace the todo with the same id.
    ///
    /// Returns `false` (and logs) if no such todo is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BlankName`] for a blank name.
    pub fn update_todo(&mut self, todo: Todo) -> Result<bool> {
        if todo.name.trim().is_empty() {
            return Err(ValidationError::BlankName.into());
        }
        let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) else {
            tracing::info!(id = todo.id, "update of unknown todo ignored");
            return Ok(false);
        };
        let id = todo.id;
        *slot = todo;
        self.persist_todo(id);
        Ok(true)
    }

    /// Set a todo's completion flag.
    ///
    /// Completing a todo also completes every one of its subtasks.
    pub fn set_completed(&mut self, id: i64, completed: bool) -> bool {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            tracing::info!(id, "completion change for unknown todo ignored");
            return false;
        };
        todo.completed = completed;
        self.persist_todo(id);

        if completed {
            let pending: Vec<i64> = self
                .subtasks
                .iter_mut()
                .filter(|s| s.todo_id == id && !s.completed)
                .map(|s| {
                    s.completed = true;
                    s.id
                })
                .collect();
            for subtask_id in pending {
                self.persist_subtask(subtask_id);
            }
        }
        true
    }

    /// Set a todo's favorite flag.
    pub fn set_favorite(&mut self, id: i64, favorite: bool) -> bool {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            tracing::info!(id, "favorite change for unknown todo ignored");
            return false;
        };
        todo.favorite = favorite;
        self.persist_todo(id);
        true
    }

    /// Delete a todo and all of its subtasks.
    pub fn delete_todo(&mut self, id: i64) -> bool {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        if self.todos.len() == before {
            tracing::info!(id, "delete of unknown todo ignored");
            return false;
        }
        warn_on_failure("delete todo", self.store.delete_todo(id));
        self.delete_subtasks_of(id);
        tracing::info!(id, "deleted todo");
        true
    }

    /// Delete every completed todo (and its subtasks). Returns the deleted ids.
    pub fn delete_completed(&mut self) -> Vec<i64> {
        let ids: Vec<i64> = self.todos.iter().filter(|t| t.completed).map(|t| t.id).collect();
        for &id in &ids {
            self.delete_todo(id);
        }
        ids
    }

    // Subtasks

    /// Insert a subtask and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BlankName`] for a blank name, or the store
    /// error if the row could not be written.
    pub fn insert_subtask(&mut self, subtask: Subtask) -> Result<i64> {
        if subtask.name.trim().is_empty() {
            return Err(ValidationError::BlankName.into());
        }
        if self.todo(subtask.todo_id).is_none() {
            tracing::debug!(todo_id = subtask.todo_id, "subtask inserted for unloaded todo");
        }
        let id = self.store.insert_subtask(&subtask)?;
        self.subtasks.push(Subtask { id, ..subtask });
        Ok(id)
    }

    /// Replace the subtask with the same id.
    pub fn update_subtask(&mut self, subtask: Subtask) -> bool {
        let Some(slot) = self.subtasks.iter_mut().find(|s| s.id == subtask.id) else {
            tracing::info!(id = subtask.id, "update of unknown subtask ignored");
            return false;
        };
        let id = subtask.id;
        *slot = subtask;
        self.persist_subtask(id);
        true
    }

    /// Set a subtask's completion flag.
    ///
    /// The parent's completion then becomes "every subtask is completed",
    /// which may also un-complete it.
    pub fn set_subtask_completed(&mut self, id: i64, completed: bool) -> bool {
        let Some(subtask) = self.subtasks.iter_mut().find(|s| s.id == id) else {
            tracing::info!(id, "completion change for unknown subtask ignored");
            return false;
        };
        subtask.completed = completed;
        let parent_id = subtask.todo_id;
        self.persist_subtask(id);

        let all_done = self.subtasks_of(parent_id).all(|s| s.completed);
        match self.todos.iter_mut().find(|t| t.id == parent_id) {
            Some(parent) if parent.completed != all_done => {
                parent.completed = all_done;
                self.persist_todo(parent_id);
            }
            Some(_) => {}
            None => tracing::debug!(parent_id, "subtask parent not loaded"),
        }
        true
    }

    /// Delete a subtask.
    pub fn delete_subtask(&mut self, id: i64) -> bool {
        let before = self.subtasks.len();
        self.subtasks.retain(|s| s.id != id);
        if self.subtasks.len() == before {
            tracing::info!(id, "delete of unknown subtask ignored");
            return false;
        }
        warn_on_failure("delete subtask", self.store.delete_subtask(id));
        true
    }

    fn delete_subtasks_of(&mut self, todo_id: i64) {
        let ids: Vec<i64> = self.subtasks_of(todo_id).map(|s| s.id).collect();
        self.subtasks.retain(|s| s.todo_id != todo_id);
        for id in ids {
            warn_on_failure("delete subtask", self.store.delete_subtask(id));
        }
    }

    // Groups

    /// Add a group.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateGroupName`] if the trimmed name is
    /// blank, already used, or the reserved "no group" marker.
    pub fn insert_group(&mut self, group: Group) -> Result<()> {
        let name = group.name.trim().to_string();
        if name.is_empty() || name.eq_ignore_ascii_case(NO_GROUP) || self.group(&name).is_some() {
            return Err(ValidationError::DuplicateGroupName(name).into());
        }
        let group = Group { name, ..group };
        warn_on_failure("insert group", self.store.insert_group(&group));
        tracing::info!(name = %group.name, "inserted group");
        self.groups.push(group);
        Ok(())
    }

    /// Show or hide a group on the home screen.
    pub fn set_group_visibility(&mut self, name: &str, visible: bool) -> bool {
        let Some(group) = self.groups.iter_mut().find(|g| g.name == name) else {
            tracing::info!(name, "visibility change for unknown group ignored");
            return false;
        };
        group.visible = visible;
        let group = group.clone();
        warn_on_failure("update group", self.store.update_group(&group));
        true
    }

    /// Delete a group together with its todos and their subtasks.
    ///
    /// Returns the ids of the deleted todos, or `None` if the group is unknown.
    pub fn delete_group(&mut self, name: &str) -> Option<Vec<i64>> {
        if self.group(name).is_none() {
            tracing::info!(name, "delete of unknown group ignored");
            return None;
        }
        let members: Vec<i64> =
            self.todos.iter().filter(|t| t.in_group(name)).map(|t| t.id).collect();
        for &id in &members {
            self.delete_todo(id);
        }
        self.groups.retain(|g| g.name != name);
        warn_on_failure("delete group", self.store.delete_group(name));
        tracing::info!(name, todos = members.len(), "deleted group");
        Some(members)
    }

    fn persist_todo(&self, id: i64) {
        if let Some(todo) = self.todo(id) {
            warn_on_failure("update todo", self.store.update_todo(todo));
        }
    }

    fn persist_subtask(&self, id: i64) {
        if let Some(subtask) = self.subtask(id) {
            warn_on_failure("update subtask", self.store.update_subtask(subtask));
        }
    }
}

/// Log a failed write-through. Memory already holds the new value.
fn warn_on_failure<T>(operation: &str, result: Result<T>) {
    if let Err(e) = result {
        tracing::warn!(operation, error = %e, "failed to persist change");
    }
}
