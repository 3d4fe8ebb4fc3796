//! Error types for `pocket_todo`.

/// Errors that can occur while managing todos.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// User input was rejected before any state changed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The configuration is unusable.
    #[error("Config error: {0}")]
    Config(String),
}

/// User-facing validation failures.
///
/// The triggering save or insert is aborted and no state is mutated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The todo name is empty after trimming.
    #[error("Please enter a task name!")]
    BlankName,

    /// The location is not a `lat, lon` pair in decimal degrees.
    #[error("Invalid coordinates format for Location.")]
    InvalidCoordinates(String),

    /// Only one of reminder date and reminder time was given.
    #[error("Please set both Reminder date and time.")]
    IncompleteReminder,

    /// Reminder date and time were both given but do not form a date-time.
    #[error("Invalid reminder date/time: {0}")]
    InvalidReminder(String),

    /// The notification radius is outside 0..=1000 meters.
    #[error("Notification distance must be between 0 and 1000 meters (got {0})")]
    DistanceOutOfRange(f32),

    /// The group name is blank or already taken.
    #[error("Please enter a unique group name!")]
    DuplicateGroupName(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::BlankName.to_string(), "Please enter a task name!");
        assert_eq!(
            ValidationError::InvalidCoordinates("abc".to_string()).to_string(),
            "Invalid coordinates format for Location."
        );
        assert_eq!(
            ValidationError::IncompleteReminder.to_string(),
            "Please set both Reminder date and time."
        );
        assert_eq!(
            ValidationError::DuplicateGroupName("Work".to_string()).to_string(),
            "Please enter a unique group name!"
        );
    }

    #[test]
    fn test_validation_converts_into_error() {
        let err: Error = ValidationError::BlankName.into();
        assert!(matches!(err, Error::Validation(ValidationError::BlankName)));
        assert_eq!(err.to_string(), "Please enter a task name!");
    }
}
