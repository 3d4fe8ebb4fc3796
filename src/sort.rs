//! Orderings and filtered views over todos.

use crate::location::Coordinates;
use crate::todos::Todo;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort key for todo lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Case-insensitive name (default).
    #[default]
    Name,
    /// Reminder date, undated last.
    #[serde(rename = "Due Date")]
    DueDate,
    /// Priority, high first.
    Priority,
    /// Distance from the current location, location-less last.
    Distance,
}

impl SortOrder {
    /// All sort orders in menu order.
    pub const ALL: [Self; 4] = [Self::Name, Self::DueDate, Self::Priority, Self::Distance];

    /// Parse a sort order from its stored name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a known sort order.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, InvalidSortOrder> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|order| {
                order.as_str().eq_ignore_ascii_case(s)
                    || order.as_str().replace(' ', "-").eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| InvalidSortOrder(s.to_string()))
    }

    /// Get the stored name of the sort order.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::DueDate => "Due Date",
            Self::Priority => "Priority",
            Self::Distance => "Distance",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an unknown sort order is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSortOrder(pub String);

impl std::fmt::Display for InvalidSortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid sort order: '{}' (must be one of: Name, Due Date, Priority, Distance)",
            self.0
        )
    }
}

impl std::error::Error for InvalidSortOrder {}

/// Case-insensitive ascending by name.
#[must_use]
pub fn by_name(a: &Todo, b: &Todo) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Ascending by reminder date-time; todos without a parsable one go last.
#[must_use]
pub fn by_due_date(a: &Todo, b: &Todo) -> Ordering {
    present_first(a.due.datetime(), b.due.datetime(), Ord::cmp)
}

/// Ascending by priority rank (`NONE` first). Reverse it for high first.
#[must_use]
pub fn by_priority(a: &Todo, b: &Todo) -> Ordering {
    a.priority.rank().cmp(&b.priority.rank())
}

/// Ascending by distance from `origin`; todos without a location go last.
pub fn by_distance(origin: Coordinates) -> impl Fn(&Todo, &Todo) -> Ordering {
    move |a: &Todo, b: &Todo| {
        let distance = |t: &Todo| t.location.map(|at| origin.distance_to(&at));
        present_first(distance(a), distance(b), f64::total_cmp)
    }
}

fn present_first<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The order actually used: distance needs a known location, else name.
#[must_use]
pub const fn effective_order(order: SortOrder, here: Option<Coordinates>) -> SortOrder {
    match (order, here) {
        (SortOrder::Distance, None) => SortOrder::Name,
        (order, _) => order,
    }
}

/// Comparator used by list screens for `order`.
///
/// Priority sorts high first. Distance falls back to name without a fix.
#[must_use]
pub fn comparator(
    order: SortOrder,
    here: Option<Coordinates>,
) -> Box<dyn Fn(&Todo, &Todo) -> Ordering> {
    match (effective_order(order, here), here) {
        (SortOrder::DueDate, _) => Box::new(by_due_date),
        (SortOrder::Priority, _) => Box::new(|a: &Todo, b: &Todo| by_priority(a, b).reverse()),
        (SortOrder::Distance, Some(origin)) => Box::new(by_distance(origin)),
        (SortOrder::Name | SortOrder::Distance, _) => Box::new(by_name),
    }
}

/// Sort `todos` in place for `order`.
pub fn sort_todos(todos: &mut [&Todo], order: SortOrder, here: Option<Coordinates>) {
    let cmp = comparator(order, here);
    todos.sort_by(|a, b| cmp(*a, *b));
}

/// A filtered list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoView {
    /// Every incomplete todo.
    All,
    /// Incomplete favorites.
    Favorites,
    /// Completed todos.
    Completed,
    /// Incomplete todos of one group.
    Group(String),
}

impl TodoView {
    /// Whether `todo` is listed in this view.
    #[must_use]
    pub fn includes(&self, todo: &Todo) -> bool {
        match self {
            Self::All => !todo.completed,
            Self::Favorites => !todo.completed && todo.favorite,
            Self::Completed => todo.completed,
            Self::Group(name) => !todo.completed && todo.in_group(name),
        }
    }
}

/// The todos shown by `view`, sorted for `order`.
#[must_use]
pub fn visible_todos<'a>(
    todos: &'a [Todo],
    view: &TodoView,
    order: SortOrder,
    here: Option<Coordinates>,
) -> Vec<&'a Todo> {
    let mut shown: Vec<&Todo> = todos.iter().filter(|t| view.includes(t)).collect();
    sort_todos(&mut shown, order, here);
    shown
}
