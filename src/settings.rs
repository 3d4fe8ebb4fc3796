//! User preferences stored in the `settings` table.

use crate::error::Result;
use crate::sort::SortOrder;
use crate::todos::models::flag_to_wire;
use crate::todos::TodoStore;
use serde::Serialize;

/// Key of the notification on/off switch.
pub const KEY_NOTIFICATION: &str = "notification";
/// Key of the list sort order.
pub const KEY_SORT_BY: &str = "sortBy";
/// Key of the description preview length.
pub const KEY_DESCRIPTION: &str = "description";
/// Key of the dark mode switch.
pub const KEY_DARK_MODE: &str = "darkMode";

/// How many description lines list rows show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DescriptionLines {
    /// One line (default).
    #[default]
    #[serde(rename = "1 Line")]
    One,
    /// Two lines.
    #[serde(rename = "2 Lines")]
    Two,
    /// Three lines.
    #[serde(rename = "3 Lines")]
    Three,
}

impl DescriptionLines {
    /// All choices in menu order.
    pub const ALL: [Self; 3] = [Self::One, Self::Two, Self::Three];

    /// Parse from the stored name, or a bare count such as `"2"`.
    ///
    /// # Errors
    ///
    /// Returns an error for anything else.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> std::result::Result<Self, InvalidDescriptionLines> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|lines| lines.as_str().eq_ignore_ascii_case(s) || lines.count().to_string() == s)
            .ok_or_else(|| InvalidDescriptionLines(s.to_string()))
    }

    /// Get the stored name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::One => "1 Line",
            Self::Two => "2 Lines",
            Self::Three => "3 Lines",
        }
    }

    /// Number of lines.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Error when an unknown description length is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDescriptionLines(pub String);

impl std::fmt::Display for InvalidDescriptionLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid description lines: '{}' (must be one of: 1 Line, 2 Lines, 3 Lines)",
            self.0
        )
    }
}

impl std::error::Error for InvalidDescriptionLines {}

/// Typed view of every preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Whether reminders are delivered.
    pub notifications: bool,
    /// List sort order.
    pub sort_by: SortOrder,
    /// Description preview length.
    pub description_lines: DescriptionLines,
    /// Dark theme.
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: true,
            sort_by: SortOrder::Name,
            description_lines: DescriptionLines::One,
            dark_mode: false,
        }
    }
}

/// Only the exact strings `"true"` and `"false"` are flags.
fn strict_flag(key: &str, value: &str, current: bool) -> bool {
    match value {
        "true" => true,
        "false" => false,
        _ => {
            tracing::warn!(key, value, "unparsable switch; keeping {current}");
            current
        }
    }
}

impl Settings {
    /// Build settings from stored pairs. Unknown keys and bad values are
    /// logged; bad values keep their default.
    #[must_use]
    pub fn from_entries<K: AsRef<str>, V: AsRef<str>>(entries: &[(K, V)]) -> Self {
        let mut settings = Self::default();
        for (key, value) in entries {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                KEY_NOTIFICATION => {
                    settings.notifications = strict_flag(key, value, settings.notifications);
                }
                KEY_DARK_MODE => settings.dark_mode = strict_flag(key, value, settings.dark_mode),
                KEY_SORT_BY => match SortOrder::from_str(value) {
                    Ok(order) => settings.sort_by = order,
                    Err(e) => tracing::warn!("{e}; keeping {}", settings.sort_by),
                },
                KEY_DESCRIPTION => match DescriptionLines::from_str(value) {
                    Ok(lines) => settings.description_lines = lines,
                    Err(e) => {
                        tracing::warn!("{e}; keeping {}", settings.description_lines.as_str());
                    }
                },
                _ => tracing::warn!(key, value, "ignoring unknown setting"),
            }
        }
        settings
    }

    /// Load settings from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings table cannot be read.
    pub fn load(store: &dyn TodoStore) -> Result<Self> {
        Ok(Self::from_entries(&store.list_settings()?))
    }

    /// Every setting in stored form, in key order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, String); 4] {
        [
            (KEY_DARK_MODE, flag_to_wire(self.dark_mode).to_string()),
            (KEY_DESCRIPTION, self.description_lines.as_str().to_string()),
            (KEY_NOTIFICATION, flag_to_wire(self.notifications).to_string()),
            (KEY_SORT_BY, self.sort_by.as_str().to_string()),
        ]
    }

    /// Turn reminder delivery on or off.
    pub fn set_notifications(&mut self, store: &dyn TodoStore, on: bool) {
        self.notifications = on;
        persist(store, KEY_NOTIFICATION, flag_to_wire(on));
    }

    /// Change the list sort order.
    pub fn set_sort_by(&mut self, store: &dyn TodoStore, order: SortOrder) {
        self.sort_by = order;
        persist(store, KEY_SORT_BY, order.as_str());
    }

    /// Change the description preview length.
    pub fn set_description_lines(&mut self, store: &dyn TodoStore, lines: DescriptionLines) {
        self.description_lines = lines;
        persist(store, KEY_DESCRIPTION, lines.as_str());
    }

    /// Turn dark mode on or off.
    pub fn set_dark_mode(&mut self, store: &dyn TodoStore, on: bool) {
        self.dark_mode = on;
        persist(store, KEY_DARK_MODE, flag_to_wire(on));
    }
}

fn persist(store: &dyn TodoStore, key: &str, value: &str) {
    if let Err(e) = store.upsert_setting(key, value) {
        tracing::warn!(key, value, error = %e, "failed to persist setting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todos::MemoryTodoStore;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.notifications);
        assert_eq!(settings.sort_by, SortOrder::Name);
        assert_eq!(settings.description_lines, DescriptionLines::One);
        assert!(!settings.dark_mode);
        assert_eq!(Settings::from_entries::<&str, &str>(&[]), settings);
    }

    #[test]
    fn test_from_entries() {
        let settings = Settings::from_entries(&[
            ("notification", "false"),
            ("sortBy", "Due Date"),
            ("description", "3 Lines"),
            ("darkMode", "true"),
        ]);
        assert!(!settings.notifications);
        assert_eq!(settings.sort_by, SortOrder::DueDate);
        assert_eq!(settings.description_lines, DescriptionLines::Three);
        assert!(settings.dark_mode);
    }

    #[test]
    fn test_unknown_keys_and_bad_values_ignored() {
        let settings = Settings::from_entries(&[
            ("fontSize", "huge"),
            ("sortBy", "Color"),
            ("description", "12 Lines"),
            ("notification", "yes"),
            ("darkMode", "TRUE"),
        ]);
        assert_eq!(settings, Settings::default());

        let settings =
            Settings::from_entries(&[("notification", "false"), ("notification", "maybe")]);
        assert!(!settings.notifications);
    }

    #[test]
    fn test_setters_persist() {
        let store = MemoryTodoStore::new();
        let mut settings = Settings::default();
        settings.set_notifications(&store, false);
        settings.set_sort_by(&store, SortOrder::Priority);
        settings.set_description_lines(&store, DescriptionLines::Two);
        settings.set_dark_mode(&store, true);

        assert_eq!(Settings::load(&store).unwrap(), settings);
        let stored = store.list_settings().unwrap();
        let expected: Vec<(String, String)> =
            settings.entries().iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect();
        assert_eq!(stored, expected);
    }

    #[test]
    fn test_setter_keeps_value_when_store_fails() {
        let store = MemoryTodoStore::new();
        store.fail_writes(true);
        let mut settings = Settings::default();
        settings.set_dark_mode(&store, true);
        assert!(settings.dark_mode);
        assert!(store.list_settings().unwrap().is_empty());
    }

    #[test]
    fn test_description_lines_parse() {
        assert_eq!(DescriptionLines::from_str("2").unwrap(), DescriptionLines::Two);
        assert_eq!(DescriptionLines::from_str("1 line").unwrap(), DescriptionLines::One);
        assert!(DescriptionLines::from_str("4").is_err());
        assert_eq!(DescriptionLines::Three.count(), 3);
    }
}
