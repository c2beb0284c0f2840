// Shared configuration and data model for the goals dashboard.

pub mod config;
pub mod model;

pub use config::{load_config, load_config_from, Config, ConfigError};
pub use model::{
    Adjustments, ChangelogEntry, GoalLabel, Group, Player, PlayerGoals, PlayerId, Roster,
    RosterGroup, RosterPlayer, ViewModel,
};
