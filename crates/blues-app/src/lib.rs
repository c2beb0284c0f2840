// Aggregation view-model builder: turns the static roster plus one stats
// lookup per player into the sorted, totaled dashboard.

pub mod builder;
pub mod dashboard;

pub use builder::{build_groups, resolve_player, sort_by_total};
pub use dashboard::{Dashboard, DashboardLayout};
