//! Subtask CLI subcommands.

use clap::Subcommand;

/// Subtask management commands.
///
/// Completing or reopening a subtask also updates its todo: the todo is
/// done exactly when all of its subtasks are.
#[derive(Subcommand, Debug, Clone)]
pub enum SubtaskCommand {
    /// Add a subtask to a todo.
    Add {
        /// Todo ID
        todo_id: i64,

        /// Subtask text
        name: String,
    },

    /// Rename a subtask.
    Rename {
        /// Subtask ID
        id: i64,

        /// New text
        name: String,
    },

    /// Mark a subtask as done.
    Complete {
        /// Subtask ID
        id: i64,

        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },

    /// Delete a subtask.
    Delete {
        /// Subtask ID
        id: i64,
    },
}
