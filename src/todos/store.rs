//! Todo store trait and `SQLite` implementation.
//!
//! Every column is stored in its string wire form: booleans as
//! `"true"`/`"false"`, enums by name, date-times as `YYYY-MM-DDTHH:mm:ss` or
//! `"T"`, locations as `"lat, lon"` or `""`, image URIs comma-joined.

use crate::error::Result;
use crate::location::{location_to_wire, Coordinates};
use crate::todos::models::{
    flag_from_wire, flag_to_wire, images_from_wire, images_to_wire, Group, GroupIcon, Priority,
    Subtask, Timestamp, Todo, NO_GROUP,
};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// Trait for todo persistence.
///
/// Inserts return the store-assigned id. Updates and deletes report whether a
/// row was affected.
#[allow(clippy::missing_errors_doc)]
pub trait TodoStore {
    // Todos
    /// Insert a todo, ignoring its `id`, and return the assigned id.
    fn insert_todo(&self, todo: &Todo) -> Result<i64>;

    /// Overwrite every field of the todo with the same id.
    fn update_todo(&self, todo: &Todo) -> Result<bool>;

    /// Delete a todo by id.
    fn delete_todo(&self, id: i64) -> Result<bool>;

    /// Load all todos in id order.
    fn list_todos(&self) -> Result<Vec<Todo>>;

    // Subtasks
    /// Insert a subtask, ignoring its `id`, and return the assigned id.
    fn insert_subtask(&self, subtask: &Subtask) -> Result<i64>;

    /// Overwrite the subtask with the same id.
    fn update_subtask(&self, subtask: &Subtask) -> Result<bool>;

    /// Delete a subtask by id.
    fn delete_subtask(&self, id: i64) -> Result<bool>;

    /// Load all subtasks in id order.
    fn list_subtasks(&self) -> Result<Vec<Subtask>>;

    // Groups
    /// Insert a group. Fails if the name is taken.
    fn insert_group(&self, group: &Group) -> Result<()>;

    /// Overwrite the group with the same name.
    fn update_group(&self, group: &Group) -> Result<bool>;

    /// Delete a group by name. Member todos are not touched.
    fn delete_group(&self, name: &str) -> Result<bool>;

    /// Load all groups in insertion order.
    fn list_groups(&self) -> Result<Vec<Group>>;

    // Settings
    /// Insert or replace a setting.
    fn upsert_setting(&self, key: &str, value: &str) -> Result<()>;

    /// Load all settings as `(key, value)` pairs.
    fn list_settings(&self) -> Result<Vec<(String, String)>>;
}

const TODO_COLUMNS: &str = r#"id, name, description, priority, onCreateDateTime, userDateTime,
    onCreateLocation, userLocation, notificationDistance, imageUriList, completed, favorite, "group""#;

/// SQLite-based todo store.
#[derive(Debug, Clone)]
pub struct SqliteTodoStore {
    db_path: PathBuf,
}

impl SqliteTodoStore {
    /// Create a new `SQLite` todo store at the given database path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self { db_path: db_path.as_ref().to_path_buf() };
        store.init_schema()?;
        Ok(store)
    }

    /// Get the database path.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Open a connection to the database.
    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(conn)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                priority TEXT NOT NULL DEFAULT 'NONE',
                onCreateDateTime TEXT NOT NULL DEFAULT 'T',
                userDateTime TEXT NOT NULL DEFAULT 'T',
                onCreateLocation TEXT NOT NULL DEFAULT '',
                userLocation TEXT NOT NULL DEFAULT '',
                notificationDistance REAL NOT NULL DEFAULT 0,
                imageUriList TEXT NOT NULL DEFAULT '',
                completed TEXT NOT NULL DEFAULT 'false',
                favorite TEXT NOT NULL DEFAULT 'false',
                "group" TEXT NOT NULL DEFAULT 'none'
            );

            CREATE TABLE IF NOT EXISTS subtasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                todoId INTEGER NOT NULL,
                name TEXT NOT NULL,
                completed TEXT NOT NULL DEFAULT 'false'
            );

            CREATE TABLE IF NOT EXISTS todo_groups (
                name TEXT PRIMARY KEY,
                iconName TEXT NOT NULL DEFAULT 'List',
                visible TEXT NOT NULL DEFAULT 'true'
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                stringVal TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_subtasks_todo_id ON subtasks(todoId);
            CREATE INDEX IF NOT EXISTS idx_todos_group ON todos("group");
            "#,
        )?;

        Ok(())
    }

    /// Parse a todo from a row selected with [`TODO_COLUMNS`].
    #[allow(clippy::cast_possible_truncation)]
    fn parse_todo(row: &rusqlite::Row) -> rusqlite::Result<Todo> {
        let priority_str: String = row.get(3)?;
        let created_at: String = row.get(4)?;
        let due: String = row.get(5)?;
        let created_location: String = row.get(6)?;
        let location: String = row.get(7)?;
        let distance: f64 = row.get(8)?;
        let images: String = row.get(9)?;
        let completed: String = row.get(10)?;
        let favorite: String = row.get(11)?;
        let group: String = row.get(12)?;

        let priority = Priority::from_str(&priority_str).unwrap_or_else(|e| {
            tracing::warn!("{e}; treating as NONE");
            Priority::None
        });

        Ok(Todo {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            priority,
            created_at: Timestamp::parse(&created_at),
            due: Timestamp::parse(&due),
            created_location: Coordinates::parse_stored(&created_location),
            location: Coordinates::parse_stored(&location),
            notification_distance: distance as f32,
            images: images_from_wire(&images),
            completed: flag_from_wire(&completed),
            favorite: flag_from_wire(&favorite),
            group: if group.is_empty() || group == NO_GROUP { None } else { Some(group) },
        })
    }

    /// Parse a subtask from a row.
    fn parse_subtask(row: &rusqlite::Row) -> rusqlite::Result<Subtask> {
        let completed: String = row.get(3)?;
        Ok(Subtask {
            id: row.get(0)?,
            todo_id: row.get(1)?,
            name: row.get(2)?,
            completed: flag_from_wire(&completed),
        })
    }

    /// Parse a group from a row.
    fn parse_group(row: &rusqlite::Row) -> rusqlite::Result<Group> {
        let icon_str: String = row.get(1)?;
        let visible: String = row.get(2)?;
        let icon = GroupIcon::from_str(&icon_str).unwrap_or_else(|e| {
            tracing::warn!("{e}; using List");
            GroupIcon::List
        });
        Ok(Group { name: row.get(0)?, icon, visible: flag_from_wire(&visible) })
    }
}

/// Column values of a todo in wire form, in [`TODO_COLUMNS`] order after `id`.
struct TodoRow {
    priority: &'static str,
    created_at: String,
    due: String,
    created_location: String,
    location: String,
    distance: f64,
    images: String,
    completed: &'static str,
    favorite: &'static str,
    group: String,
}

impl TodoRow {
    fn from_todo(todo: &Todo) -> Self {
        Self {
            priority: todo.priority.as_str(),
            created_at: todo.created_at.to_wire(),
            due: todo.due.to_wire(),
            created_location: location_to_wire(todo.created_location.as_ref()),
            location: location_to_wire(todo.location.as_ref()),
            distance: f64::from(todo.notification_distance),
            images: images_to_wire(&todo.images),
            completed: flag_to_wire(todo.completed),
            favorite: flag_to_wire(todo.favorite),
            group: todo.group.clone().unwrap_or_else(|| NO_GROUP.to_string()),
        }
    }
}

impl TodoStore for SqliteTodoStore {
    fn insert_todo(&self, todo: &Todo) -> Result<i64> {
        let conn = self.open()?;
        let row = TodoRow::from_todo(todo);

        conn.execute(
            r#"INSERT INTO todos (name, description, priority, onCreateDateTime, userDateTime,
                onCreateLocation, userLocation, notificationDistance, imageUriList, completed,
                favorite, "group")
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
            params![
                &todo.name,
                &todo.description,
                row.priority,
                row.created_at,
                row.due,
                row.created_location,
                row.location,
                row.distance,
                row.images,
                row.completed,
                row.favorite,
                row.group,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn update_todo(&self, todo: &Todo) -> Result<bool> {
        let conn = self.open()?;
        let row = TodoRow::from_todo(todo);

        let rows = conn.execute(
            r#"UPDATE todos SET name = ?1, description = ?2, priority = ?3,
                onCreateDateTime = ?4, userDateTime = ?5, onCreateLocation = ?6,
                userLocation = ?7, notificationDistance = ?8, imageUriList = ?9,
                completed = ?10, favorite = ?11, "group" = ?12
             WHERE id = ?13"#,
            params![
                &todo.name,
                &todo.description,
                row.priority,
                row.created_at,
                row.due,
                row.created_location,
                row.location,
                row.distance,
                row.images,
                row.completed,
                row.favorite,
                row.group,
                todo.id,
            ],
        )?;

        Ok(rows > 0)
    }

    fn delete_todo(&self, id: i64) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_todos(&self) -> Result<Vec<Todo>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(&format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY id"))?;
        let todos: Vec<Todo> =
            stmt.query_map([], Self::parse_todo)?.collect::<rusqlite::Result<_>>()?;
        Ok(todos)
    }

    fn insert_subtask(&self, subtask: &Subtask) -> Result<i64> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO subtasks (todoId, name, completed) VALUES (?1, ?2, ?3)",
            params![subtask.todo_id, &subtask.name, flag_to_wire(subtask.completed)],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_subtask(&self, subtask: &Subtask) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute(
            "UPDATE subtasks SET todoId = ?1, name = ?2, completed = ?3 WHERE id = ?4",
            params![subtask.todo_id, &subtask.name, flag_to_wire(subtask.completed), subtask.id],
        )?;
        Ok(rows > 0)
    }

    fn delete_subtask(&self, id: i64) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM subtasks WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn list_subtasks(&self) -> Result<Vec<Subtask>> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare("SELECT id, todoId, name, completed FROM subtasks ORDER BY id")?;
        let subtasks: Vec<Subtask> =
            stmt.query_map([], Self::parse_subtask)?.collect::<rusqlite::Result<_>>()?;
        Ok(subtasks)
    }

    fn insert_group(&self, group: &Group) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO todo_groups (name, iconName, visible) VALUES (?1, ?2, ?3)",
            params![&group.name, group.icon.as_str(), flag_to_wire(group.visible)],
        )?;
        Ok(())
    }

    fn update_group(&self, group: &Group) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute(
            "UPDATE todo_groups SET iconName = ?1, visible = ?2 WHERE name = ?3",
            params![group.icon.as_str(), flag_to_wire(group.visible), &group.name],
        )?;
        Ok(rows > 0)
    }

    fn delete_group(&self, name: &str) -> Result<bool> {
        let conn = self.open()?;
        let rows = conn.execute("DELETE FROM todo_groups WHERE name = ?1", params![name])?;
        Ok(rows > 0)
    }

    fn list_groups(&self) -> Result<Vec<Group>> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare("SELECT name, iconName, visible FROM todo_groups ORDER BY rowid")?;
        let groups: Vec<Group> =
            stmt.query_map([], Self::parse_group)?.collect::<rusqlite::Result<_>>()?;
        Ok(groups)
    }

    fn upsert_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO settings (key, stringVal) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET stringVal = excluded.stringVal",
            params![key, value],
        )?;
        Ok(())
    }

    fn list_settings(&self) -> Result<Vec<(String, String)>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare("SELECT key, stringVal FROM settings ORDER BY key")?;
        let settings: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;
        Ok(settings)
    }
}
