// Aggregation: one concurrent lookup per rostered player, per-group totals,
// fixed adjustments, then a stable sort by total.

use futures_util::future::join_all;
use tracing::{debug, warn};

use blues_core::{Adjustments, Group, Player, PlayerGoals, Roster, RosterGroup, RosterPlayer};
use blues_stats::GoalSource;

/// Resolve every group in `roster` against `source` and return the groups
/// sorted by total goals, highest first.
///
/// All lookups across all groups are in flight at once. A failed lookup
/// counts as zero goals for that player only; it never aborts the build.
pub async fn build_groups<S>(roster: &Roster, adjustments: &Adjustments, source: &S) -> Vec<Group>
where
    S: GoalSource + ?Sized,
{
    let groups = join_all(
        roster
            .groups
            .iter()
            .map(|group| resolve_group(group, adjustments, source)),
    )
    .await;

    sort_by_total(groups)
}

/// Resolve one group. The total is computed only after every lookup in the
/// group has settled.
async fn resolve_group<S>(group: &RosterGroup, adjustments: &Adjustments, source: &S) -> Group
where
    S: GoalSource + ?Sized,
{
    let players: Vec<Player> =
        join_all(group.players.iter().map(|p| resolve_player(p, source))).await;

    let summed = players.iter().fold(0u32, |acc, p| acc.saturating_add(p.goals));
    let total_goals = adjustments.apply(&group.name, summed);
    debug!(
        group = %group.name,
        summed,
        adjustment = adjustments.for_group(&group.name),
        total_goals,
        "group resolved"
    );

    Group {
        name: group.name.clone(),
        players,
        total_goals,
    }
}

/// Look up one player, substituting zero goals if the lookup fails.
pub async fn resolve_player<S>(entry: &RosterPlayer, source: &S) -> Player
where
    S: GoalSource + ?Sized,
{
    let goals = match source.player_goals(entry.id).await {
        Ok(goals) => goals,
        Err(e) => {
            warn!(
                player_id = entry.id,
                player = %entry.full_name,
                "goal lookup failed, counting 0: {e}"
            );
            PlayerGoals::fallback()
        }
    };
    Player::resolved(entry, goals)
}

/// Order groups by total descending. Equal totals keep their roster order.
pub fn sort_by_total(mut groups: Vec<Group>) -> Vec<Group> {
    // `sort_by` is stable.
    groups.sort_by(|a, b| b.total_goals.cmp(&a.total_goals));
    groups
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use blues_core::{GoalLabel, PlayerId};
    use blues_stats::StatsError;
    use tokio::sync::Barrier;

    /// Canned lookups: `Some(n)` resolves to n goals after `delay_ms`,
    /// `None` fails.
    #[derive(Default)]
    struct FakeSource {
        answers: HashMap<PlayerId, (Option<u32>, u64)>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn with(mut self, id: PlayerId, goals: Option<u32>) -> Self {
            self.answers.insert(id, (goals, 0));
            self
        }

        fn delayed(mut self, id: PlayerId, goals: u32, delay_ms: u64) -> Self {
            self.answers.insert(id, (Some(goals), delay_ms));
            self
        }
    }

    #[async_trait]
    impl GoalSource for FakeSource {
        async fn player_goals(&self, player_id: PlayerId) -> blues_stats::Result<PlayerGoals> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (goals, delay_ms) = self.answers.get(&player_id).copied().unwrap_or((None, 0));
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            goals.map(PlayerGoals::new).ok_or(StatsError::MissingField {
                player_id,
                field: "goals",
            })
        }
    }

    fn player(id: PlayerId) -> RosterPlayer {
        RosterPlayer {
            id,
            full_name: format!("Player {id}"),
            pic: format!("{id}.png"),
        }
    }

    fn roster(groups: &[(&str, &[PlayerId])]) -> Roster {
        Roster {
            groups: groups
                .iter()
                .map(|(name, ids)| RosterGroup {
                    name: name.to_string(),
                    players: ids.iter().copied().map(player).collect(),
                })
                .collect(),
        }
    }

    fn adjustments(entries: &[(&str, u32)]) -> Adjustments {
        Adjustments::new(
            entries
                .iter()
                .map(|(name, bonus)| (name.to_string(), *bonus))
                .collect(),
        )
    }

    fn names(groups: &[Group]) -> Vec<&str> {
        groups.iter().map(|g| g.name.as_str()).collect()
    }

    #[tokio::test]
    async fn failed_lookup_falls_back_to_zero() {
        let source = FakeSource::default().with(1, Some(5)).with(2, None);
        let r = roster(&[("A", &[1]), ("B", &[2])]);
        let groups = build_groups(&r, &Adjustments::default(), &source).await;

        assert_eq!(names(&groups), vec!["A", "B"]);
        assert_eq!(groups[0].total_goals, 5);
        assert_eq!(groups[0].players[0].goals, 5);
        assert_eq!(groups[0].players[0].goal_label, GoalLabel::Goals);
        assert_eq!(groups[1].total_goals, 0);
        assert_eq!(groups[1].players[0].goals, 0);
        assert_eq!(groups[1].players[0].goal_label, GoalLabel::Goals);
    }

    #[tokio::test]
    async fn total_is_sum_of_player_goals() {
        let source = FakeSource::default()
            .with(1, Some(3))
            .with(2, Some(1))
            .with(3, Some(0));
        let r = roster(&[("A", &[1, 2, 3])]);
        let groups = build_groups(&r, &Adjustments::default(), &source).await;

        assert_eq!(groups[0].total_goals, 4);
        assert_eq!(groups[0].players[1].goal_label, GoalLabel::Goal);
    }

    #[tokio::test]
    async fn adjustment_applies_only_to_its_group_and_before_sorting() {
        // Kevin: 3 + 2 bonus = 5 beats Rob's 4.
        let source = FakeSource::default().with(1, Some(3)).with(2, Some(4));
        let groups = build_groups(
            &roster(&[("Rob", &[2]), ("Kevin", &[1])]),
            &adjustments(&[("Kevin", 2)]),
            &source,
        )
        .await;

        assert_eq!(names(&groups), vec!["Kevin", "Rob"]);
        assert_eq!(groups[0].total_goals, 5);
        assert_eq!(groups[1].total_goals, 4);
        // The bonus is not attributed to any player.
        assert_eq!(groups[0].players[0].goals, 3);
    }

    #[tokio::test]
    async fn adjustment_counts_even_when_every_lookup_fails() {
        let source = FakeSource::default();
        let groups = build_groups(
            &roster(&[("Kevin", &[1, 2])]),
            &adjustments(&[("Kevin", 2)]),
            &source,
        )
        .await;
        assert_eq!(groups[0].total_goals, 2);
    }

    #[tokio::test]
    async fn equal_totals_keep_roster_order() {
        let source = FakeSource::default()
            .with(1, Some(2))
            .with(2, Some(7))
            .with(3, Some(2))
            .with(4, Some(2));
        let groups = build_groups(
            &roster(&[("C", &[1]), ("A", &[2]), ("B", &[3]), ("D", &[4])]),
            &Adjustments::default(),
            &source,
        )
        .await;

        assert_eq!(names(&groups), vec!["A", "C", "B", "D"]);
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_other_players_or_groups() {
        let healthy = FakeSource::default()
            .with(1, Some(4))
            .with(2, Some(6))
            .with(3, Some(1));
        let broken = FakeSource::default()
            .with(1, Some(4))
            .with(2, None)
            .with(3, Some(1));
        let r = roster(&[("A", &[1, 2]), ("B", &[3])]);

        let good = build_groups(&r, &Adjustments::default(), &healthy).await;
        let bad = build_groups(&r, &Adjustments::default(), &broken).await;

        let find = |groups: &[Group], name: &str| {
            groups.iter().find(|g| g.name == name).cloned().unwrap()
        };
        assert_eq!(find(&good, "B"), find(&bad, "B"));
        assert_eq!(find(&good, "A").players[0], find(&bad, "A").players[0]);
        assert_eq!(find(&bad, "A").players[1].goals, 0);
        assert_eq!(find(&bad, "A").total_goals, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn players_keep_roster_order_regardless_of_completion_order() {
        let source = FakeSource::default()
            .delayed(1, 1, 300)
            .delayed(2, 2, 100)
            .delayed(3, 3, 200);
        let r = roster(&[("A", &[1, 2, 3])]);
        let groups = build_groups(&r, &Adjustments::default(), &source).await;

        let ids: Vec<PlayerId> = groups[0].players.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn one_lookup_per_player() {
        let source = FakeSource::default();
        build_groups(
            &roster(&[("A", &[1, 2, 3]), ("B", &[4, 5]), ("C", &[])]),
            &Adjustments::default(),
            &source,
        )
        .await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 5);
    }

    /// Every lookup waits until all lookups have started; a sequential
    /// fan-out would never get past the barrier.
    struct BarrierSource {
        barrier: Arc<Barrier>,
    }

    #[async_trait]
    impl GoalSource for BarrierSource {
        async fn player_goals(&self, _player_id: PlayerId) -> blues_stats::Result<PlayerGoals> {
            self.barrier.wait().await;
            Ok(PlayerGoals::new(1))
        }
    }

    #[tokio::test]
    async fn all_lookups_across_groups_run_concurrently() {
        let r = roster(&[("A", &[1, 2]), ("B", &[3]), ("C", &[4, 5, 6])]);
        let source = BarrierSource {
            barrier: Arc::new(Barrier::new(r.player_count())),
        };

        let groups = tokio::time::timeout(
            Duration::from_secs(5),
            build_groups(&r, &Adjustments::default(), &source),
        )
        .await
        .expect("lookups should not be serialized");

        assert_eq!(names(&groups), vec!["C", "A", "B"]);
    }

    #[test]
    fn sort_by_total_is_descending() {
        let group = |name: &str, total: u32| Group {
            name: name.into(),
            players: vec![],
            total_goals: total,
        };
        let sorted = sort_by_total(vec![group("x", 1), group("y", 9), group("z", 4)]);
        assert_eq!(names(&sorted), vec!["y", "z", "x"]);
    }
}
