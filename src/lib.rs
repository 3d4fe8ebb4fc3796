//! # `pocket_todo`
//!
//! An offline-first personal todo manager with date and location reminders.
//!
//! Todos, subtasks, groups and settings live in a local `SQLite` file. An
//! [`app::App`] session loads them, applies changes optimistically and runs
//! the reminder engine against a clock and the latest location fix.

pub mod app;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod paths;
pub mod reminders;
pub mod settings;
pub mod sort;
pub mod testing;
pub mod todos;
pub mod traits;

pub use error::{Error, Result, ValidationError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
