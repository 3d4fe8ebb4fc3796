//! Built-in todo templates that prefill a new draft.

use crate::todos::models::Priority;

/// A built-in template definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Todo name.
    pub name: &'static str,
    /// Todo description.
    pub description: &'static str,
    /// Todo priority.
    pub priority: Priority,
    /// Names of the subtasks created with the todo.
    pub subtasks: &'static [&'static str],
}

/// All built-in templates, in display order.
pub static TEMPLATES: &[Template] = &[
    Template {
        name: "Air Travel Bookings",
        description: "Important tasks for air travelling!",
        priority: Priority::Medium,
        subtasks: &["Book Airplane Tickets", "Book Hotel", "Rent Car"],
    },
    Template {
        name: "Winter Trip Packing",
        description: "What clothes to pack for trips made during the winter season (Dec-Mar) ",
        priority: Priority::Low,
        subtasks: &[
            "Warm Clothes (e.g. jacket, pants, thermal tops)",
            "Thermos Flask",
            "Max-Sized Backpack",
        ],
    },
    Template {
        name: "City Exploration Plan",
        description: "A day-by-day itinerary to explore the top sights and hidden gems of the city.",
        priority: Priority::High,
        subtasks: &[
            "Visit historical landmarks",
            "Try local cuisine",
            "Explore local markets",
            "Attend a cultural event",
        ],
    },
    Template {
        name: "Museum Tour",
        description: "Plan visits to renowned museums and galleries for a dose of art and history.",
        priority: Priority::Medium,
        subtasks: &[
            "Research must-see exhibits",
            "Check for free entry days",
            "Plan visit timings and breaks",
        ],
    },
    Template {
        name: "Nature Trails and Parks",
        description: "A checklist for outdoor enthusiasts to explore nature trails and parks.",
        priority: Priority::High,
        subtasks: &["Pack hiking essentials", "Download trail maps", "Check weather conditions"],
    },
    Template {
        name: "Culinary Adventures",
        description: "Discover and savor the unique flavors of the city's cuisine.",
        priority: Priority::Medium,
        subtasks: &[
            "Reserve tables at top-rated restaurants",
            "Attend a cooking class",
            "Visit a local farmer's market",
        ],
    },
    Template {
        name: "Relaxation Retreat",
        description: "Plan a relaxing retreat to rejuvenate with spa visits and serene settings.",
        priority: Priority::Low,
        subtasks: &["Book a spa day", "Find a quiet beach or park", "Schedule a meditation session"],
    },
    Template {
        name: "Historical Journey",
        description: "Embark on a journey through the city's rich history with visits to significant landmarks.",
        priority: Priority::High,
        subtasks: &[
            "Explore ancient ruins",
            "Take a guided historical tour",
            "Visit war memorials and museums",
        ],
    },
    Template {
        name: "Art and Culture Immersion",
        description: "Immerse yourself in the local art scene and cultural heritage.",
        priority: Priority::Medium,
        subtasks: &[
            "Visit contemporary art galleries",
            "Attend a cultural festival",
            "Book a night at the opera or ballet",
        ],
    },
    Template {
        name: "Outdoor Expedition",
        description: "Plan an exhilarating outdoor adventure across the city's natural landscapes.",
        priority: Priority::High,
        subtasks: &[
            "Hike local trails",
            "Schedule a river rafting trip",
            "Organize a mountain biking day",
        ],
    },
];

/// Find a template by name, ignoring case and surrounding whitespace.
#[must_use]
pub fn find_template(name: &str) -> Option<&'static Template> {
    let name = name.trim();
    TEMPLATES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ten_templates_with_unique_names() {
        assert_eq!(TEMPLATES.len(), 10);
        let names: HashSet<_> = TEMPLATES.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), TEMPLATES.len());
    }

    #[test]
    fn test_every_template_has_subtasks() {
        for template in TEMPLATES {
            assert!(!template.subtasks.is_empty(), "{} has no subtasks", template.name);
            assert!(!template.description.is_empty());
        }
    }

    #[test]
    fn test_find_template() {
        let template = find_template("museum tour").unwrap();
        assert_eq!(template.name, "Museum Tour");
        assert_eq!(template.priority, Priority::Medium);
        assert_eq!(template.subtasks.len(), 3);
        assert!(find_template("Moon Landing").is_none());
    }
}
