//! Settings CLI subcommands.

use crate::cli::parse_switch;
use crate::settings::DescriptionLines;
use crate::sort::SortOrder;
use clap::{ArgAction, Subcommand};

/// Preference commands. Each setter prints the resulting settings.
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print every setting.
    Show,

    /// Turn reminder delivery on or off.
    Notifications {
        /// on or off
        #[arg(action = ArgAction::Set, value_parser = parse_switch)]
        enabled: bool,
    },

    /// Set the list sort order.
    Sort {
        /// Name, "Due Date", Priority or Distance
        #[arg(value_parser = SortOrder::from_str)]
        order: SortOrder,
    },

    /// Set how many description lines list rows show.
    Description {
        /// 1, 2 or 3
        #[arg(value_parser = DescriptionLines::from_str)]
        lines: DescriptionLines,
    },

    /// Turn dark mode on or off.
    #[command(name = "dark-mode")]
    DarkMode {
        /// on or off
        #[arg(action = ArgAction::Set, value_parser = parse_switch)]
        enabled: bool,
    },
}
