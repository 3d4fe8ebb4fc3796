//! In-memory [`TodoStore`] for tests and throwaway sessions.

use crate::error::{Error, Result};
use crate::todos::models::{Group, Subtask, Todo};
use crate::todos::store::TodoStore;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Tables {
    todos: BTreeMap<i64, Todo>,
    subtasks: BTreeMap<i64, Subtask>,
    groups: Vec<Group>,
    settings: BTreeMap<String, String>,
    last_todo_id: i64,
    last_subtask_id: i64,
    writes: usize,
}

/// A [`TodoStore`] backed by ordinary collections.
///
/// Ids are assigned like `AUTOINCREMENT`: monotonically increasing and never
/// reused. Setting [`MemoryTodoStore::fail_writes`] makes every write fail,
/// which lets tests observe that in-memory state is not rolled back.
#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    tables: Mutex<Tables>,
    fail_writes: Mutex<bool>,
}

impl MemoryTodoStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap_or_else(PoisonError::into_inner) = fail;
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.tables().writes
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the tables for a write, or fail if writes are disabled.
    fn write(&self) -> Result<MutexGuard<'_, Tables>> {
        if *self.fail_writes.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(Error::Io(std::io::Error::other("memory store is read-only")));
        }
        let mut tables = self.tables();
        tables.writes += 1;
        Ok(tables)
    }
}

impl TodoStore for MemoryTodoStore {
    fn insert_todo(&self, todo: &Todo) -> Result<i64> {
        let mut tables = self.write()?;
        tables.last_todo_id += 1;
        let id = tables.last_todo_id;
        tables.todos.insert(id, Todo { id, ..todo.clone() });
        Ok(id)
    }

    fn update_todo(&self, todo: &Todo) -> Result<bool> {
        let mut tables = self.write()?;
        Ok(tables.todos.get_mut(&todo.id).map(|slot| *slot = todo.clone()).is_some())
    }

    fn delete_todo(&self, id: i64) -> Result<bool> {
        Ok(self.write()?.todos.remove(&id).is_some())
    }

    fn list_todos(&self) -> Result<Vec<Todo>> {
        Ok(self.tables().todos.values().cloned().collect())
    }

    fn insert_subtask(&self, subtask: &Subtask) -> Result<i64> {
        let mut tables = self.write()?;
        tables.last_subtask_id += 1;
        let id = tables.last_subtask_id;
        tables.subtasks.insert(id, Subtask { id, ..subtask.clone() });
        Ok(id)
    }

    fn update_subtask(&self, subtask: &Subtask) -> Result<bool> {
        let mut tables = self.write()?;
        Ok(tables.subtasks.get_mut(&subtask.id).map(|slot| *slot = subtask.clone()).is_some())
    }

    fn delete_subtask(&self, id: i64) -> Result<bool> {
        Ok(self.write()?.subtasks.remove(&id).is_some())
    }

    fn list_subtasks(&self) -> Result<Vec<Subtask>> {
        Ok(self.tables().subtasks.values().cloned().collect())
    }

    fn insert_group(&self, group: &Group) -> Result<()> {
        let mut tables = self.write()?;
        if tables.groups.iter().any(|g| g.name == group.name) {
            return Err(Error::Io(std::io::Error::other(format!(
                "group already exists: {}",
                group.name
            ))));
        }
        tables.groups.push(group.clone());
        Ok(())
    }

    fn update_group(&self, group: &Group) -> Result<bool> {
        let mut tables = self.write()?;
        Ok(tables
            .groups
            .iter_mut()
            .find(|g| g.name == group.name)
            .map(|slot| *slot = group.clone())
            .is_some())
    }

    fn delete_group(&self, name: &str) -> Result<bool> {
        let mut tables = self.write()?;
        let before = tables.groups.len();
        tables.groups.retain(|g| g.name != name);
        Ok(tables.groups.len() < before)
    }

    fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(self.tables().groups.clone())
    }

    fn upsert_setting(&self, key: &str, value: &str) -> Result<()> {
        self.write()?.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn list_settings(&self) -> Result<Vec<(String, String)>> {
        Ok(self.tables().settings.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todos::models::GroupIcon;

    #[test]
    fn test_ids_are_never_reused() {
        let store = MemoryTodoStore::new();
        let a = store.insert_todo(&Todo::new("a")).unwrap();
        store.delete_todo(a).unwrap();
        let b = store.insert_todo(&Todo::new("b")).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_insert_round_trip() {
        let store = MemoryTodoStore::new();
        let mut todo = Todo::new("a");
        todo.favorite = true;
        let id = store.insert_todo(&todo).unwrap();
        assert_eq!(store.list_todos().unwrap(), vec![Todo { id, ..todo }]);
    }

    #[test]
    fn test_fail_writes() {
        let store = MemoryTodoStore::new();
        store.fail_writes(true);
        assert!(store.insert_todo(&Todo::new("a")).is_err());
        assert!(store.upsert_setting("k", "v").is_err());
        assert_eq!(store.write_count(), 0);

        store.fail_writes(false);
        store.upsert_setting("k", "v").unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let store = MemoryTodoStore::new();
        store.insert_group(&Group::new("Work", GroupIcon::List)).unwrap();
        assert!(store.insert_group(&Group::new("Work", GroupIcon::Money)).is_err());
        assert_eq!(store.list_groups().unwrap().len(), 1);
    }

    #[test]
    fn test_update_missing_rows() {
        let store = MemoryTodoStore::new();
        let mut todo = Todo::new("ghost");
        todo.id = 9;
        assert!(!store.update_todo(&todo).unwrap());
        assert!(!store.update_group(&Group::new("none", GroupIcon::List)).unwrap());
        assert!(!store.delete_subtask(3).unwrap());
    }
}
