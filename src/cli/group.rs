//! Group CLI subcommands.

use crate::todos::GroupIcon;
use clap::Subcommand;

/// Group management commands.
///
/// ## Quick Start
///
/// ```bash
/// # Create a group
/// pocket-todo group add Vacation --icon travel
///
/// # File a todo under it
/// pocket-todo add "Pack bags" --group Vacation
///
/// # List its todos
/// pocket-todo list --group Vacation
/// ```
///
/// Deleting a group deletes its todos and their subtasks.
#[derive(Subcommand, Debug, Clone)]
pub enum GroupCommand {
    /// Create a group.
    Add {
        /// Unique group name
        name: String,

        /// Icon: list, shopping, travel or money
        #[arg(short, long, default_value = "List", value_parser = GroupIcon::from_str)]
        icon: GroupIcon,
    },

    /// List groups.
    ///
    /// Hidden groups are left out unless --all is given. Suggested names are
    /// included for convenience.
    List {
        /// Include hidden groups
        #[arg(short, long)]
        all: bool,
    },

    /// Show a hidden group on the home screen again.
    Show {
        /// Group name
        name: String,
    },

    /// Hide a group from the home screen. Its todos are kept.
    Hide {
        /// Group name
        name: String,
    },

    /// Delete a group with all of its todos.
    Delete {
        /// Group name
        name: String,
    },
}
