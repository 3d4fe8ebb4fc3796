//! Command execution for the CLI.
//!
//! This module handles running CLI commands and producing output.

use crate::app::App;
use crate::cli::{watch, Command, GroupCommand, SettingsCommand, SubtaskCommand, TodoFields};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::location::{Coordinates, LocationTracker};
use crate::paths;
use crate::sort::{self, SortOrder, TodoView};
use crate::todos::{
    find_template, Group, GroupIcon, Priority, SqliteTodoStore, Subtask, Timestamp, Todo,
    TodoDraft, RECOMMENDED_GROUP_NAMES, TEMPLATES,
};
use crate::traits::{Clock, LogNotifier, Notifier, SystemClock};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Output from running the CLI, with separate stdout and stderr messages.
#[derive(Debug)]
pub struct CliOutput {
    /// Exit code for the process.
    pub exit_code: ExitCode,
    /// Messages to print to stdout.
    pub stdout: Vec<String>,
    /// Messages to print to stderr.
    pub stderr: Vec<String>,
}

/// Where the CLI keeps its data and what it knows about the session.
pub struct CliContext {
    /// Directory holding the database and config file.
    pub data_dir: PathBuf,
    /// Loaded configuration.
    pub config: AppConfig,
    /// Current location, if given.
    pub here: Option<Coordinates>,
    /// Source of "now".
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CliContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliContext")
            .field("data_dir", &self.data_dir)
            .field("config", &self.config)
            .field("here", &self.here)
            .finish_non_exhaustive()
    }
}

impl CliContext {
    /// Resolve the data directory, load its config and parse `here`.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined, the config
    /// file is invalid, or `here` is not a `lat, lon` pair.
    pub fn resolve(data_dir: Option<PathBuf>, here: Option<&str>) -> Result<Self> {
        let data_dir = data_dir.or_else(paths::data_dir).ok_or_else(|| {
            Error::Config(format!(
                "cannot determine a data directory; set {} or pass --data-dir",
                paths::HOME_ENV_VAR
            ))
        })?;
        let config = AppConfig::load_from(&data_dir)?;
        let here = here.map(|text| Coordinates::parse(text.trim())).transpose()?;
        Ok(Self { data_dir, config, here, clock: Arc::new(SystemClock) })
    }

    /// Open the session against the configured database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or read.
    pub fn open_app(&self, notifier: Box<dyn Notifier>) -> Result<App> {
        let db_path = self.config.database_path(&self.data_dir);
        tracing::debug!(path = %db_path.display(), "opening database");
        let store = SqliteTodoStore::new(&db_path)?;
        let location = LocationTracker::new();
        if let Some(fix) = self.here {
            location.update(fix);
        }
        App::open(Arc::new(store), location, notifier)
    }
}

/// Run a CLI command.
///
/// `watch` without `--once` runs until stdin closes; everything else is
/// handled by [`execute`].
pub async fn run(command: Command, ctx: &CliContext) -> CliOutput {
    match command {
        Command::Watch { once: false, at } => watch::run_watch(ctx, at.as_deref()).await,
        other => execute(other, ctx),
    }
}

/// Run a CLI command synchronously. `watch` runs a single poll.
pub fn execute(command: Command, ctx: &CliContext) -> CliOutput {
    if matches!(command, Command::Templates) {
        return run_templates();
    }

    let mut app = match ctx.open_app(Box::new(LogNotifier)) {
        Ok(app) => app,
        Err(e) => return error_output(e.to_string()),
    };

    match command {
        Command::Add { name, template, fields } => {
            todo_add(&mut app, ctx, name, template.as_deref(), fields)
        }
        Command::Edit {
            id,
            name,
            clear_reminder,
            clear_location,
            clear_images,
            no_group,
            fields,
        } => {
            let clear = Clears {
                reminder: clear_reminder,
                location: clear_location,
                images: clear_images,
                group: no_group,
            };
            todo_edit(&mut app, ctx, id, name, clear, fields)
        }
        Command::Show { id } => show_todo(&app, id),
        Command::List { favorites, completed, group, sort } => {
            let view = if favorites {
                TodoView::Favorites
            } else if completed {
                TodoView::Completed
            } else {
                group.map_or(TodoView::All, TodoView::Group)
            };
            todo_list(&app, &view, sort)
        }
        Command::Complete { id, undo } => {
            if app.set_completed(id, !undo) {
                show_todo(&app, id)
            } else {
                todo_not_found(id)
            }
        }
        Command::Favorite { id, undo } => {
            if app.set_favorite(id, !undo) {
                show_todo(&app, id)
            } else {
                todo_not_found(id)
            }
        }
        Command::Delete { id } => {
            if app.delete_todo(id) {
                json_output(&DeletedOutput { group: None, deleted: vec![id] })
            } else {
                todo_not_found(id)
            }
        }
        Command::ClearCompleted => {
            json_output(&DeletedOutput { group: None, deleted: app.delete_completed() })
        }
        Command::Subtask(cmd) => run_subtask_cmd(&mut app, cmd),
        Command::Group(cmd) => run_group_cmd(&mut app, cmd),
        Command::Settings(cmd) => run_settings_cmd(&mut app, cmd),
        Command::Templates => run_templates(),
        Command::Map { id } => match app.state().todo(id) {
            Some(todo) => match todo.location {
                Some(location) => success_output(location.map_uri()),
                None => error_output(format!("Todo {id} has no location")),
            },
            None => todo_not_found(id),
        },
        Command::Watch { at, .. } => watch::poll_once(&mut app, ctx, at.as_deref()),
    }
}

// === Todos ===

/// Fields an edit can remove.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
struct Clears {
    reminder: bool,
    location: bool,
    images: bool,
    group: bool,
}

fn todo_add(
    app: &mut App,
    ctx: &CliContext,
    name: Option<String>,
    template: Option<&str>,
    fields: TodoFields,
) -> CliOutput {
    let mut draft = match template {
        Some(wanted) => match find_template(wanted) {
            Some(template) => TodoDraft::from_template(template),
            None => return error_output(format!("Unknown template: {wanted}")),
        },
        None => TodoDraft::new(),
    };
    if let Some(name) = name {
        draft.name = name;
    }
    fields.apply(&mut draft);
    save_draft(app, ctx, draft)
}

fn todo_edit(
    app: &mut App,
    ctx: &CliContext,
    id: i64,
    name: Option<String>,
    clear: Clears,
    fields: TodoFields,
) -> CliOutput {
    let Some(mut draft) = app.edit_draft(id) else {
        return todo_not_found(id);
    };
    if let Some(name) = name {
        draft.name = name;
    }
    if clear.reminder {
        draft.date.clear();
        draft.time.clear();
    }
    if clear.location {
        draft.location.clear();
    }
    if clear.images {
        draft.images.clear();
    }
    if clear.group {
        draft.group = None;
    }
    fields.apply(&mut draft);
    save_draft(app, ctx, draft)
}

fn save_draft(app: &mut App, ctx: &CliContext, draft: TodoDraft) -> CliOutput {
    if let Some(group) = draft.group.as_deref() {
        if app.state().group(group).is_none() {
            return error_output(format!("Group not found: {group}"));
        }
    }
    match app.save_draft(draft, ctx.clock.now()) {
        Ok(id) => show_todo(app, id),
        Err(e) => error_output(e.to_string()),
    }
}

fn show_todo(app: &App, id: i64) -> CliOutput {
    match app.state().todo(id) {
        Some(todo) => json_output(&TodoOutput::new(app, todo)),
        None => todo_not_found(id),
    }
}

fn todo_list(app: &App, view: &TodoView, sort_override: Option<SortOrder>) -> CliOutput {
    let here = app.location().current();
    let todos = match sort_override {
        Some(order) => sort::visible_todos(app.state().todos(), view, order, here),
        None => app.visible_todos(view),
    };
    let lines = app.settings().description_lines.count();
    let rows: Vec<TodoRow<'_>> = todos.into_iter().map(|t| TodoRow::new(app, t, lines)).collect();
    json_output(&rows)
}

fn todo_not_found(id: i64) -> CliOutput {
    error_output(format!("Todo not found: {id}"))
}

// === Subtasks ===

fn run_subtask_cmd(app: &mut App, cmd: SubtaskCommand) -> CliOutput {
    match cmd {
        SubtaskCommand::Add { todo_id, name } => {
            if app.state().todo(todo_id).is_none() {
                return todo_not_found(todo_id);
            }
            match app.add_subtask(todo_id, &name) {
                Ok(_) => show_todo(app, todo_id),
                Err(e) => error_output(e.to_string()),
            }
        }
        SubtaskCommand::Rename { id, name } => match app.rename_subtask(id, &name) {
            Ok(true) => show_parent(app, id),
            Ok(false) => subtask_not_found(id),
            Err(e) => error_output(e.to_string()),
        },
        SubtaskCommand::Complete { id, undo } => {
            if app.set_subtask_completed(id, !undo) {
                show_parent(app, id)
            } else {
                subtask_not_found(id)
            }
        }
        SubtaskCommand::Delete { id } => {
            let Some(todo_id) = app.state().subtask(id).map(|s| s.todo_id) else {
                return subtask_not_found(id);
            };
            app.delete_subtask(id);
            show_todo(app, todo_id)
        }
    }
}

fn show_parent(app: &App, subtask_id: i64) -> CliOutput {
    match app.state().subtask(subtask_id) {
        Some(subtask) => show_todo(app, subtask.todo_id),
        None => subtask_not_found(subtask_id),
    }
}

fn subtask_not_found(id: i64) -> CliOutput {
    error_output(format!("Subtask not found: {id}"))
}

// === Groups ===

fn run_group_cmd(app: &mut App, cmd: GroupCommand) -> CliOutput {
    match cmd {
        GroupCommand::Add { name, icon } => match app.add_group(&name, icon) {
            Ok(()) => show_group(app, name.trim()),
            Err(e) => error_output(e.to_string()),
        },
        GroupCommand::List { all } => group_list(app, all),
        GroupCommand::Show { name } => group_visibility(app, &name, true),
        GroupCommand::Hide { name } => group_visibility(app, &name, false),
        GroupCommand::Delete { name } => match app.delete_group(&name) {
            Some(deleted) => json_output(&DeletedOutput { group: Some(name), deleted }),
            None => group_not_found(&name),
        },
    }
}

fn group_list(app: &App, all: bool) -> CliOutput {
    let groups: Vec<&Group> = if all {
        app.state().groups().iter().collect()
    } else {
        app.visible_groups().collect()
    };
    let suggested: Vec<&str> = RECOMMENDED_GROUP_NAMES
        .into_iter()
        .filter(|name| app.state().group(name).is_none())
        .collect();
    let output = GroupListOutput {
        groups: groups.into_iter().map(|g| GroupOutput::new(app, g)).collect(),
        suggested,
    };
    json_output(&output)
}

fn group_visibility(app: &mut App, name: &str, visible: bool) -> CliOutput {
    if app.set_group_visibility(name, visible) {
        show_group(app, name)
    } else {
        group_not_found(name)
    }
}

fn show_group(app: &App, name: &str) -> CliOutput {
    match app.state().group(name) {
        Some(group) => json_output(&GroupOutput::new(app, group)),
        None => group_not_found(name),
    }
}

fn group_not_found(name: &str) -> CliOutput {
    error_output(format!("Group not found: {name}"))
}

// === Settings and templates ===

fn run_settings_cmd(app: &mut App, cmd: SettingsCommand) -> CliOutput {
    match cmd {
        SettingsCommand::Show => {}
        SettingsCommand::Notifications { enabled } => app.set_notifications(enabled),
        SettingsCommand::Sort { order } => app.set_sort_by(order),
        SettingsCommand::Description { lines } => app.set_description_lines(lines),
        SettingsCommand::DarkMode { enabled } => app.set_dark_mode(enabled),
    }
    json_output(app.settings())
}

fn run_templates() -> CliOutput {
    let templates: Vec<TemplateOutput> = TEMPLATES
        .iter()
        .map(|t| TemplateOutput {
            name: t.name,
            description: t.description,
            priority: t.priority,
            subtasks: t.subtasks,
        })
        .collect();
    json_output(&templates)
}

/// Parse a `--at` value as a local date-time.
pub(super) fn parse_at(raw: &str) -> std::result::Result<chrono::NaiveDateTime, String> {
    match Timestamp::parse(raw) {
        Timestamp::At(at) => Ok(at),
        _ => Err(format!("Invalid date-time for --at: '{raw}' (expected YYYY-MM-DDTHH:MM)")),
    }
}

// === Output types ===

/// A todo with its subtasks.
#[derive(Debug, Serialize)]
struct TodoOutput<'a> {
    #[serde(flatten)]
    todo: &'a Todo,
    subtasks: Vec<&'a Subtask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    map_uri: Option<String>,
}

impl<'a> TodoOutput<'a> {
    fn new(app: &'a App, todo: &'a Todo) -> Self {
        Self {
            todo,
            subtasks: app.state().subtasks_of(todo.id).collect(),
            map_uri: todo.location.map(|l| l.map_uri()),
        }
    }
}

/// One row of a todo listing.
#[derive(Debug, Serialize)]
struct TodoRow<'a> {
    id: i64,
    name: &'a str,
    description: String,
    priority: Priority,
    due: &'a Timestamp,
    completed: bool,
    favorite: bool,
    group: Option<&'a str>,
    subtasks_done: usize,
    subtasks_total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance_meters: Option<f64>,
}

impl<'a> TodoRow<'a> {
    fn new(app: &App, todo: &'a Todo, description_lines: usize) -> Self {
        let (done, total) = app
            .state()
            .subtasks_of(todo.id)
            .fold((0, 0), |(done, total), s| (done + usize::from(s.completed), total + 1));
        let here = app.location().current();
        Self {
            id: todo.id,
            name: &todo.name,
            description: preview(&todo.description, description_lines),
            priority: todo.priority,
            due: &todo.due,
            completed: todo.completed,
            favorite: todo.favorite,
            group: todo.group.as_deref(),
            subtasks_done: done,
            subtasks_total: total,
            distance_meters: here.zip(todo.location).map(|(a, b)| a.distance_to(&b).round()),
        }
    }
}

/// The first `lines` lines of `text`.
fn preview(text: &str, lines: usize) -> String {
    text.lines().take(lines).collect::<Vec<_>>().join("\n")
}

#[derive(Debug, Serialize)]
struct GroupOutput<'a> {
    name: &'a str,
    icon: GroupIcon,
    visible: bool,
    todos: usize,
}

impl<'a> GroupOutput<'a> {
    fn new(app: &App, group: &'a Group) -> Self {
        let todos = app.state().todos().iter().filter(|t| t.in_group(&group.name)).count();
        Self { name: &group.name, icon: group.icon, visible: group.visible, todos }
    }
}

#[derive(Debug, Serialize)]
struct GroupListOutput<'a> {
    groups: Vec<GroupOutput<'a>>,
    suggested: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct DeletedOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    deleted: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct TemplateOutput {
    name: &'static str,
    description: &'static str,
    priority: Priority,
    subtasks: &'static [&'static str],
}

pub(super) fn json_output<T: Serialize + ?Sized>(value: &T) -> CliOutput {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![json], stderr: vec![] },
        Err(e) => error_output(e.to_string()),
    }
}

pub(super) fn success_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::SUCCESS, stdout: vec![message], stderr: vec![] }
}

pub(super) fn error_output(message: String) -> CliOutput {
    CliOutput { exit_code: ExitCode::from(1), stdout: vec![], stderr: vec![message] }
}
