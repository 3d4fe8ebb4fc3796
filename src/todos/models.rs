//! Todo model types.
//!
//! The persisted form of every field is a string (see [`crate::todos::store`]);
//! these types are the typed view used everywhere else.

use crate::error::ValidationError;
use crate::location::Coordinates;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Stored value of a date-time field that was never set.
pub const DATE_TIME_SENTINEL: &str = "T";

/// Stored format of a set date-time field.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Stored value of the group field for todos outside any group.
pub const NO_GROUP: &str = "none";

/// Todo priority, ordered `None < Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Priority {
    /// No priority (default).
    #[default]
    None = 0,
    /// Low priority.
    Low = 1,
    /// Medium priority.
    Medium = 2,
    /// High priority.
    High = 3,
}

impl Priority {
    /// All priorities from highest to lowest.
    pub const ALL: [Self; 4] = [Self::High, Self::Medium, Self::Low, Self::None];

    /// Numeric rank used for ordering (`NONE` = 0 .. `HIGH` = 3).
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Parse a priority from its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not one of `HIGH`, `MEDIUM`, `LOW`, `NONE`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidPriority> {
        match s.trim().to_uppercase().as_str() {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            "NONE" => Ok(Self::None),
            _ => Err(InvalidPriority(s.to_string())),
        }
    }

    /// Get the stored name of the priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::None => "NONE",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an unknown priority name is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPriority(pub String);

impl std::fmt::Display for InvalidPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid priority: '{}' (must be one of: HIGH, MEDIUM, LOW, NONE)", self.0)
    }
}

impl std::error::Error for InvalidPriority {}

/// An optional local date-time as stored in a todo.
///
/// Values that cannot be parsed are kept verbatim so they survive a round trip
/// through the store, but every consumer treats them as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Timestamp {
    /// Not recorded (stored as `"T"`).
    #[default]
    Unset,
    /// A parsed local date-time, second precision.
    At(NaiveDateTime),
    /// Stored text that is not a date-time.
    Malformed(String),
}

impl Timestamp {
    /// A timestamp at `at`, truncated to whole seconds.
    #[must_use]
    pub fn at(at: NaiveDateTime) -> Self {
        Self::At(at.with_nanosecond(0).unwrap_or(at))
    }

    /// Parse a stored value. Never fails: bad input becomes [`Timestamp::Malformed`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == DATE_TIME_SENTINEL {
            return Self::Unset;
        }
        parse_local(trimmed).map_or_else(|| Self::Malformed(raw.to_string()), Self::At)
    }

    /// Combine a reminder date (`YYYY-MM-DD`) and time (`HH:MM[:SS]`).
    ///
    /// Both empty means no reminder.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteReminder`] if exactly one part is
    /// given, or [`ValidationError::InvalidReminder`] if the parts do not form
    /// a date-time.
    pub fn from_parts(date: &str, time: &str) -> Result<Self, ValidationError> {
        let (date, time) = (date.trim(), time.trim());
        match (date.is_empty(), time.is_empty()) {
            (true, true) => Ok(Self::Unset),
            (true, false) | (false, true) => Err(ValidationError::IncompleteReminder),
            (false, false) => {
                let joined = format!("{date}T{time}");
                parse_local(&joined)
                    .map(Self::At)
                    .ok_or(ValidationError::InvalidReminder(joined))
            }
        }
    }

    /// The date-time, if set and well-formed.
    #[must_use]
    pub const fn datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::At(at) => Some(*at),
            Self::Unset | Self::Malformed(_) => None,
        }
    }

    /// Whether anything other than the sentinel is stored.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// The stored representation.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Unset => DATE_TIME_SENTINEL.to_string(),
            Self::At(at) => at.format(DATE_TIME_FORMAT).to_string(),
            Self::Malformed(raw) => raw.clone(),
        }
    }

    /// Split into the `(date, time)` strings shown in the editor.
    #[must_use]
    pub fn to_parts(&self) -> (String, String) {
        match self {
            Self::At(at) => (at.format("%Y-%m-%d").to_string(), at.format("%H:%M:%S").to_string()),
            Self::Unset | Self::Malformed(_) => (String::new(), String::new()),
        }
    }
}

impl From<String> for Timestamp {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_wire()
    }
}

/// Parse an ISO local date-time, with or without seconds.
fn parse_local(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .ok()
        .map(|at| at.with_nanosecond(0).unwrap_or(at))
}

/// A todo item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-assigned identifier (0 until inserted).
    pub id: i64,
    /// Short name; never blank once stored.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Priority.
    pub priority: Priority,
    /// When the todo was created, if the user asked for it to be recorded.
    pub created_at: Timestamp,
    /// Reminder date-time chosen by the user.
    pub due: Timestamp,
    /// Where the todo was created, if recorded.
    pub created_location: Option<Coordinates>,
    /// Location chosen by the user for proximity reminders.
    pub location: Option<Coordinates>,
    /// Radius in meters within which a proximity reminder fires.
    pub notification_distance: f32,
    /// Attached image URIs.
    pub images: Vec<String>,
    /// Whether the todo is done.
    pub completed: bool,
    /// Whether the todo is marked as a favorite.
    pub favorite: bool,
    /// Owning group, if any.
    pub group: Option<String>,
}

impl Todo {
    /// A new, unsaved todo with the given name and defaults elsewhere.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: String::new(),
            priority: Priority::None,
            created_at: Timestamp::Unset,
            due: Timestamp::Unset,
            created_location: None,
            location: None,
            notification_distance: 0.0,
            images: Vec::new(),
            completed: false,
            favorite: false,
            group: None,
        }
    }

    /// Whether this todo belongs to the named group.
    #[must_use]
    pub fn in_group(&self, name: &str) -> bool {
        self.group.as_deref() == Some(name)
    }
}

/// A checklist entry belonging to a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Store-assigned identifier (0 until inserted).
    pub id: i64,
    /// ID of the parent todo.
    pub todo_id: i64,
    /// Subtask text.
    pub name: String,
    /// Whether the subtask is done.
    pub completed: bool,
}

/// Icons a group can be shown with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GroupIcon {
    /// Plain list (default).
    #[default]
    List,
    /// Shopping cart.
    Shopping,
    /// Airplane ticket.
    Travel,
    /// Money.
    Money,
}

impl GroupIcon {
    /// All icon choices in display order.
    pub const ALL: [Self; 4] = [Self::List, Self::Shopping, Self::Travel, Self::Money];

    /// Parse an icon from its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a known icon.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidGroupIcon> {
        Self::ALL
            .into_iter()
            .find(|icon| icon.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidGroupIcon(s.to_string()))
    }

    /// Get the stored name of the icon.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::List => "List",
            Self::Shopping => "Shopping",
            Self::Travel => "Travel",
            Self::Money => "Money",
        }
    }
}

/// Error when an unknown icon name is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidGroupIcon(pub String);

impl std::fmt::Display for InvalidGroupIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid group icon: '{}' (must be one of: List, Shopping, Travel, Money)", self.0)
    }
}

impl std::error::Error for InvalidGroupIcon {}

/// Group names suggested when creating a group.
pub const RECOMMENDED_GROUP_NAMES: [&str; 3] = ["Sights", "Vacation", "Work"];

/// A user-defined group of todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique name.
    pub name: String,
    /// Icon.
    pub icon: GroupIcon,
    /// Whether the group is shown on the home screen.
    pub visible: bool,
}

impl Group {
    /// A visible group with the given name and icon.
    #[must_use]
    pub fn new(name: impl Into<String>, icon: GroupIcon) -> Self {
        Self { name: name.into(), icon, visible: true }
    }
}

/// Join image URIs into their stored form.
#[must_use]
pub fn images_to_wire(images: &[String]) -> String {
    images.join(",")
}

/// Split a stored image list, dropping empty entries.
#[must_use]
pub fn images_from_wire(raw: &str) -> Vec<String> {
    raw.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Parse a stored boolean flag; anything but `"true"` is false.
#[must_use]
pub fn flag_from_wire(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

/// Stored form of a boolean flag.
#[must_use]
pub const fn flag_to_wire(flag: bool) -> &'static str {
    if flag {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
        assert!(Priority::Low > Priority::None);
        assert_eq!(Priority::High.rank(), 3);
        assert_eq!(Priority::None.rank(), 0);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!(Priority::from_str("HIGH").unwrap(), Priority::High);
        assert_eq!(Priority::from_str("medium").unwrap(), Priority::Medium);
        assert_eq!(Priority::from_str(" Low ").unwrap(), Priority::Low);
        assert_eq!(Priority::from_str("NONE").unwrap(), Priority::None);
        assert!(Priority::from_str("urgent").is_err());
        for p in Priority::ALL {
            assert_eq!(Priority::from_str(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn test_invalid_priority_display() {
        let err = InvalidPriority("urgent".to_string());
        assert!(err.to_string().contains("urgent"));
        assert!(err.to_string().contains("HIGH"));
    }

    #[test]
    fn test_timestamp_parse() {
        assert_eq!(Timestamp::parse("T"), Timestamp::Unset);
        assert_eq!(Timestamp::parse(""), Timestamp::Unset);
        assert_eq!(Timestamp::parse("2024-03-01T09:30:00"), Timestamp::At(at(2024, 3, 1, 9, 30, 0)));
        assert_eq!(Timestamp::parse("2024-03-01T09:30"), Timestamp::At(at(2024, 3, 1, 9, 30, 0)));
        assert_eq!(
            Timestamp::parse("2024-03-01T09:30:15.250"),
            Timestamp::At(at(2024, 3, 1, 9, 30, 15))
        );
        assert_eq!(
            Timestamp::parse("2024-13-01T09:30:00"),
            Timestamp::Malformed("2024-13-01T09:30:00".to_string())
        );
        assert_eq!(Timestamp::parse("soon"), Timestamp::Malformed("soon".to_string()));
    }

    #[test]
    fn test_timestamp_wire() {
        assert_eq!(Timestamp::Unset.to_wire(), "T");
        assert_eq!(Timestamp::At(at(2024, 3, 1, 9, 5, 7)).to_wire(), "2024-03-01T09:05:07");
        assert_eq!(Timestamp::Malformed("x".to_string()).to_wire(), "x");
    }

    #[test]
    fn test_timestamp_malformed_is_absent_but_set() {
        let ts = Timestamp::parse("garbage");
        assert!(ts.is_set());
        assert_eq!(ts.datetime(), None);
        assert!(!Timestamp::Unset.is_set());
    }

    #[test]
    fn test_timestamp_from_parts() {
        assert_eq!(Timestamp::from_parts("", "").unwrap(), Timestamp::Unset);
        assert_eq!(
            Timestamp::from_parts("2024-03-01", "09:30:00").unwrap(),
            Timestamp::At(at(2024, 3, 1, 9, 30, 0))
        );
        assert_eq!(
            Timestamp::from_parts("2024-03-01", "").unwrap_err(),
            ValidationError::IncompleteReminder
        );
        assert_eq!(
            Timestamp::from_parts("", "09:30:00").unwrap_err(),
            ValidationError::IncompleteReminder
        );
        assert!(matches!(
            Timestamp::from_parts("2024-02-30", "09:30"),
            Err(ValidationError::InvalidReminder(_))
        ));
    }

    #[test]
    fn test_timestamp_to_parts() {
        let ts = Timestamp::At(at(2024, 3, 1, 9, 30, 0));
        assert_eq!(ts.to_parts(), ("2024-03-01".to_string(), "09:30:00".to_string()));
        assert_eq!(Timestamp::Unset.to_parts(), (String::new(), String::new()));
    }

    #[test]
    fn test_timestamp_at_truncates_subseconds() {
        let precise = at(2024, 3, 1, 9, 30, 0).with_nanosecond(123_000_000).unwrap();
        assert_eq!(Timestamp::at(precise), Timestamp::At(at(2024, 3, 1, 9, 30, 0)));
    }

    #[test]
    fn test_timestamp_serializes_as_wire_string() {
        let json = serde_json::to_string(&Timestamp::Unset).unwrap();
        assert_eq!(json, "\"T\"");
        let parsed: Timestamp = serde_json::from_str("\"2024-03-01T09:30:00\"").unwrap();
        assert_eq!(parsed, Timestamp::At(at(2024, 3, 1, 9, 30, 0)));
    }

    #[test]
    fn test_group_icon_from_str() {
        assert_eq!(GroupIcon::from_str("Travel").unwrap(), GroupIcon::Travel);
        assert_eq!(GroupIcon::from_str("money").unwrap(), GroupIcon::Money);
        assert!(GroupIcon::from_str("Rocket").is_err());
        assert_eq!(GroupIcon::default(), GroupIcon::List);
    }

    #[test]
    fn test_images_wire() {
        let images = vec!["content://a".to_string(), "file:///b.jpg".to_string()];
        assert_eq!(images_to_wire(&images), "content://a,file:///b.jpg");
        assert_eq!(images_from_wire("content://a,,file:///b.jpg,"), images);
        assert!(images_from_wire("").is_empty());

        let padded = vec![" content://a ".to_string(), "file:///b c.jpg".to_string()];
        assert_eq!(images_from_wire(&images_to_wire(&padded)), padded);
    }

    #[test]
    fn test_flags_wire() {
        assert!(flag_from_wire("true"));
        assert!(!flag_from_wire("false"));
        assert!(!flag_from_wire("yes"));
        assert_eq!(flag_to_wire(true), "true");
        assert_eq!(flag_to_wire(false), "false");
    }

    #[test]
    fn test_todo_in_group() {
        let mut todo = Todo::new("Pack");
        assert!(!todo.in_group("Travel"));
        todo.group = Some("Travel".to_string());
        assert!(todo.in_group("Travel"));
    }

    #[test]
    fn test_todo_serialization() {
        let mut todo = Todo::new("Buy milk");
        todo.id = 7;
        todo.priority = Priority::High;
        todo.due = Timestamp::At(at(2024, 3, 1, 9, 30, 0));
        todo.location = Some(Coordinates::new(1.0, 2.0));
        let json = serde_json::to_string(&todo).unwrap();
        let parsed: Todo = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, todo);
    }
}
