//! Command-line front end for pocket-todo.
//!
//! Data commands print pretty JSON on stdout. Messages go to stderr, and
//! failures exit with code 1.

mod group;
mod run;
mod settings;
mod subtask;
mod watch;


pub use group::GroupCommand;
pub use run::{execute, run, CliContext, CliOutput};
pub use settings::SettingsCommand;
pub use subtask::SubtaskCommand;
pub use watch::{follow_locations, StdoutNotifier};

use crate::sort::SortOrder;
use crate::todos::{Priority, TodoDraft};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// pocket-todo - an offline todo list with date and location reminders.
///
/// Data is kept in `$POCKET_TODO_HOME`, or in `pocket-todo/` under the
/// platform data directory.
#[derive(Parser, Debug)]
#[command(name = "pocket-todo")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding the database and config.yaml
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Current location as "lat, lon", used for distance sorting,
    /// proximity reminders and recording where a todo was created
    #[arg(long, global = true, value_name = "LAT,LON", allow_hyphen_values = true)]
    pub here: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a todo.
    ///
    /// With --template, the name, description, priority and subtasks of a
    /// built-in template are filled in first; other options override them.
    Add {
        /// Todo name (optional with --template)
        name: Option<String>,

        /// Start from a built-in template (see `templates`)
        #[arg(long)]
        template: Option<String>,

        #[command(flatten)]
        fields: TodoFields,
    },

    /// Edit a todo. Only given options change.
    Edit {
        /// Todo ID
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// Remove the reminder date and time
        #[arg(long, conflicts_with_all = ["date", "time"])]
        clear_reminder: bool,

        /// Remove the location
        #[arg(long, conflicts_with = "location")]
        clear_location: bool,

        /// Remove all images
        #[arg(long)]
        clear_images: bool,

        /// Take the todo out of its group
        #[arg(long, conflicts_with = "group")]
        no_group: bool,

        #[command(flatten)]
        fields: TodoFields,
    },

    /// Show a todo with its subtasks.
    Show {
        /// Todo ID
        id: i64,
    },

    /// List todos in the configured sort order.
    ///
    /// Without options, lists every incomplete todo.
    List {
        /// Only favorites
        #[arg(long, conflicts_with_all = ["completed", "group"])]
        favorites: bool,

        /// Only completed todos
        #[arg(long, conflicts_with = "group")]
        completed: bool,

        /// Only todos in this group
        #[arg(long)]
        group: Option<String>,

        /// Sort order for this listing only
        #[arg(long, value_parser = SortOrder::from_str)]
        sort: Option<SortOrder>,
    },

    /// Mark a todo and its subtasks as done.
    Complete {
        /// Todo ID
        id: i64,

        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },

    /// Mark a todo as a favorite.
    Favorite {
        /// Todo ID
        id: i64,

        /// Remove from favorites instead
        #[arg(long)]
        undo: bool,
    },

    /// Delete a todo and its subtasks.
    Delete {
        /// Todo ID
        id: i64,
    },

    /// Delete every completed todo.
    #[command(name = "clear-completed")]
    ClearCompleted,

    /// Subtask management.
    #[command(subcommand)]
    Subtask(SubtaskCommand),

    /// Group management.
    #[command(subcommand)]
    Group(GroupCommand),

    /// Show or change preferences.
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// List the built-in templates.
    Templates,

    /// Print a geo: link for a todo's location.
    Map {
        /// Todo ID
        id: i64,
    },

    /// Deliver reminders until stdin closes.
    ///
    /// Each stdin line of the form "lat, lon" updates the current location.
    /// Reminders are printed to stdout as they fire.
    Watch {
        /// Poll once, print what fired as JSON and exit
        #[arg(long)]
        once: bool,

        /// Pretend the clock reads this local time (YYYY-MM-DDTHH:MM[:SS]) at start
        #[arg(long, value_name = "DATETIME")]
        at: Option<String>,
    },
}

/// Todo fields shared by `add` and `edit`.
#[derive(Args, Debug, Clone, Default)]
pub struct TodoFields {
    /// Description text
    #[arg(short, long)]
    pub description: Option<String>,

    /// Priority: high, medium, low or none
    #[arg(short, long, value_parser = Priority::from_str)]
    pub priority: Option<Priority>,

    /// Reminder date, YYYY-MM-DD (needs --time)
    #[arg(long)]
    pub date: Option<String>,

    /// Reminder time, HH:MM (needs --date)
    #[arg(long)]
    pub time: Option<String>,

    /// Location as "lat, lon"
    #[arg(long, allow_hyphen_values = true)]
    pub location: Option<String>,

    /// Proximity reminder radius in meters (0 to 1000)
    #[arg(long)]
    pub distance: Option<f32>,

    /// Attach an image URI (repeatable)
    #[arg(long = "image", value_name = "URI")]
    pub images: Vec<String>,

    /// Put the todo in this group
    #[arg(short, long)]
    pub group: Option<String>,

    /// Record when the todo was created (on or off)
    #[arg(long, value_name = "SWITCH", value_parser = parse_switch)]
    pub record_time: Option<bool>,

    /// Record where the todo was created from --here (on or off)
    #[arg(long, value_name = "SWITCH", value_parser = parse_switch)]
    pub record_location: Option<bool>,

    /// Add a subtask (repeatable)
    #[arg(long = "subtask", value_name = "NAME")]
    pub subtasks: Vec<String>,
}

impl TodoFields {
    /// Copy every given field into `draft`.
    pub fn apply(self, draft: &mut TodoDraft) {
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(priority) = self.priority {
            draft.priority = priority;
        }
        if let Some(date) = self.date {
            draft.date = date;
        }
        if let Some(time) = self.time {
            draft.time = time;
        }
        if let Some(location) = self.location {
            draft.location = location;
        }
        if let Some(distance) = self.distance {
            draft.notification_distance = distance;
        }
        draft.images.extend(self.images);
        if let Some(group) = self.group {
            draft.group = Some(group);
        }
        if let Some(on) = self.record_time {
            draft.record_created_at = on;
        }
        if let Some(on) = self.record_location {
            draft.record_created_location = on;
        }
        for name in self.subtasks {
            draft.add_subtask(&name);
        }
    }
}

/// Parse an on/off switch (`on`, `off`, `true`, `false`, `yes`, `no`).
///
/// # Errors
///
/// Returns an error message for anything else.
pub fn parse_switch(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(format!("expected on or off, got '{s}'")),
    }
}
