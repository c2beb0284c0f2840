// Roster, resolved player/group records, and the view model handed to the
// rendering layer.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// NHL stats-provider player identifier.
pub type PlayerId = u32;

// ---------------------------------------------------------------------------
// Goal counts
// ---------------------------------------------------------------------------

/// Pluralization label shown next to a goal count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalLabel {
    Goal,
    Goals,
}

impl GoalLabel {
    /// `Goal` for exactly one goal, `Goals` for everything else (including 0).
    pub fn for_count(goals: u32) -> Self {
        if goals == 1 {
            GoalLabel::Goal
        } else {
            GoalLabel::Goals
        }
    }
}

/// Current-season goal count for one player, as returned by the stats proxy.
///
/// Serializes to the proxy's wire shape: `{"goals": 3, "goalLabel": "goals"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGoals {
    pub goals: u32,
    pub goal_label: GoalLabel,
}

impl PlayerGoals {
    pub fn new(goals: u32) -> Self {
        Self {
            goals,
            goal_label: GoalLabel::for_count(goals),
        }
    }

    /// Value substituted when a lookup fails.
    pub fn fallback() -> Self {
        Self {
            goals: 0,
            goal_label: GoalLabel::Goals,
        }
    }
}

// ---------------------------------------------------------------------------
// Static roster (configuration)
// ---------------------------------------------------------------------------

/// A player as declared in roster.toml, before any statistics are known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub id: PlayerId,
    pub full_name: String,
    /// Image reference, relative to the renderer's static assets.
    #[serde(default)]
    pub pic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterGroup {
    pub name: String,
    #[serde(default)]
    pub players: Vec<RosterPlayer>,
}

/// Fixed assignment of players to groups. Declaration order is significant:
/// it is the display order of players within a group and the tie-break order
/// of groups with equal totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub groups: Vec<RosterGroup>,
}

impl Roster {
    pub fn player_count(&self) -> usize {
        self.groups.iter().map(|g| g.players.len()).sum()
    }
}

/// Per-group additive corrections applied to a computed total. Groups not
/// listed get 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Adjustments(HashMap<String, u32>);

impl Adjustments {
    pub fn new(entries: HashMap<String, u32>) -> Self {
        Self(entries)
    }

    pub fn for_group(&self, name: &str) -> u32 {
        self.0.get(name).copied().unwrap_or(0)
    }

    /// Add the group's bonus to a summed total.
    pub fn apply(&self, name: &str, total: u32) -> u32 {
        total.saturating_add(self.for_group(name))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One line of the static changelog shown beneath the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub date: NaiveDate,
    pub note: String,
}

// ---------------------------------------------------------------------------
// Resolved records and the view model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub full_name: String,
    pub pic: String,
    pub goals: u32,
    pub goal_label: GoalLabel,
}

impl Player {
    pub fn resolved(entry: &RosterPlayer, goals: PlayerGoals) -> Self {
        Self {
            id: entry.id,
            full_name: entry.full_name.clone(),
            pic: entry.pic.clone(),
            goals: goals.goals,
            goal_label: goals.goal_label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    pub players: Vec<Player>,
    pub total_goals: u32,
}

impl Group {
    /// Group shown while lookups are still in flight: no players, zero total.
    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            players: Vec::new(),
            total_goals: 0,
        }
    }
}

/// Everything the rendering layer needs to draw the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub loading: bool,
    pub groups: Vec<Group>,
    #[serde(default)]
    pub changelog: Vec<ChangelogEntry>,
}

impl ViewModel {
    /// Initial state: one placeholder per roster group, in roster order.
    pub fn loading(roster: &Roster, changelog: &[ChangelogEntry]) -> Self {
        Self {
            loading: true,
            groups: roster
                .groups
                .iter()
                .map(|g| Group::placeholder(&g.name))
                .collect(),
            changelog: changelog.to_vec(),
        }
    }

    /// Final state: every group resolved, totaled and sorted.
    pub fn ready(groups: Vec<Group>, changelog: &[ChangelogEntry]) -> Self {
        Self {
            loading: false,
            groups,
            changelog: changelog.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
