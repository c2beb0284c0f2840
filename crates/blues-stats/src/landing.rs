// Wire types for the upstream player landing document. Only the fields the
// dashboard reads are modelled; everything else is ignored.
//
// Shape: `{ "featuredStats": { "season": 20242025,
//            "regularSeason": { "subSeason": { "goals": 7, ... } } } }`

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingDocument {
    /// Absent for players with no stats in the upstream's featured season.
    #[serde(default)]
    pub featured_stats: Option<FeaturedStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedStats {
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub regular_season: Option<RegularSeason>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularSeason {
    #[serde(default)]
    pub sub_season: Option<StatLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatLine {
    #[serde(default)]
    pub goals: Option<u32>,
}

/// Path reported when the goal count is missing.
pub const GOALS_FIELD: &str = "featuredStats.regularSeason.subSeason.goals";

/// Goals scored in `current_season`.
///
/// Returns `Some(0)` when the upstream features a different season (or none),
/// since its numbers would be stale. Returns `None` when the season matches but
/// the goal count is missing from the document.
pub fn current_season_goals(doc: &LandingDocument, current_season: u32) -> Option<u32> {
    let Some(featured) = &doc.featured_stats else {
        return Some(0);
    };
    if featured.season != Some(current_season) {
        return Some(0);
    }
    featured
        .regular_season
        .as_ref()?
        .sub_season
        .as_ref()?
        .goals
}
