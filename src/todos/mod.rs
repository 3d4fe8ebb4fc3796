//! Todos, subtasks and groups.
//!
//! This module provides:
//! - Typed models converted to string wire values only at the store boundary
//! - The [`TodoStore`] persistence trait with `SQLite` and in-memory backends
//! - [`TodoState`], the in-memory owner of all collections
//! - [`TodoDraft`], the add/edit form with pending subtasks and templates
//!
//! # Example
//!
//! ```no_run
//! use pocket_todo::todos::{SqliteTodoStore, TodoDraft, TodoState};
//! use std::sync::Arc;
//!
//! let store = SqliteTodoStore::new("/tmp/todos.sqlite3").unwrap();
//! let mut state = TodoState::load(Arc::new(store)).unwrap();
//!
//! let mut draft = TodoDraft::new();
//! draft.name = "Buy milk".to_string();
//! draft.add_subtask("Oat milk");
//! let now = chrono::Local::now().naive_local();
//! let id = draft.save(&mut state, now, None).unwrap();
//!
//! state.set_completed(id, true);
//! ```

pub mod draft;
pub mod memory;
pub mod models;
pub mod state;
pub mod store;
pub mod templates;

pub use draft::{PendingSubtask, TodoDraft, MAX_NOTIFICATION_DISTANCE};
pub use memory::MemoryTodoStore;
pub use models::{
    Group, GroupIcon, InvalidGroupIcon, InvalidPriority, Priority, Subtask, Timestamp, Todo,
    RECOMMENDED_GROUP_NAMES,
};
pub use state::{SharedStore, TodoState};
pub use store::{SqliteTodoStore, TodoStore};
pub use templates::{find_template, Template, TEMPLATES};
