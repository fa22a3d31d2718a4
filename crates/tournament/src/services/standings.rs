use std::collections::HashMap;

use crate::models::{GroupSpec, GroupTable, Outcome, PredictionSet, StandingRow, TournamentFormat, Zone};

/// Builds the table of one group from scratch.
///
/// Rows are sorted by points, goal difference and goals scored, all
/// descending. Teams still level keep their draw order, so the output is
/// fully deterministic.
pub fn compute_group_table(group: &GroupSpec, results: &PredictionSet) -> GroupTable {
    let mut rows: Vec<StandingRow> = group.teams.iter().map(StandingRow::new).collect();
    let index: HashMap<&str, usize> = group
        .teams
        .iter()
        .enumerate()
        .map(|(idx, team)| (team.as_str(), idx))
        .collect();

    let mut played_matches = 0;
    for m in &group.matches {
        let Some(score) = results.result(&m.id()) else {
            continue;
        };
        let (Some(&home), Some(&away)) = (index.get(m.home.as_str()), index.get(m.away.as_str()))
        else {
            continue;
        };
        played_matches += 1;

        apply(&mut rows[home], score.home, score.away);
        apply(&mut rows[away], score.away, score.home);
        match score.outcome() {
            Outcome::HomeWin => {
                rows[home].wins += 1;
                rows[away].losses += 1;
            }
            Outcome::AwayWin => {
                rows[away].wins += 1;
                rows[home].losses += 1;
            }
            Outcome::Draw => {
                rows[home].draws += 1;
                rows[away].draws += 1;
            }
        }
    }

    for row in &mut rows {
        row.goal_difference = row.goals_for.saturating_sub(row.goals_against);
        row.points = 3 * row.wins + row.draws;
    }

    // Stable sort: full ties fall back to draw order.
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
    });
    for (idx, row) in rows.iter_mut().enumerate() {
        row.position = idx + 1;
        row.zone = Zone::for_position(row.position);
    }

    GroupTable {
        group: group.label.clone(),
        rows,
        played_matches,
        expected_matches: group.matches.len(),
    }
}

fn apply(row: &mut StandingRow, scored: i32, conceded: i32) {
    row.played += 1;
    row.goals_for = row.goals_for.saturating_add(scored);
    row.goals_against = row.goals_against.saturating_add(conceded);
}

/// Tables for every group, in format order.
pub fn compute_all_tables(format: &TournamentFormat, results: &PredictionSet) -> Vec<GroupTable> {
    format
        .groups
        .iter()
        .map(|group| compute_group_table(group, results))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupMatch, MatchId, Score};

    fn group() -> GroupSpec {
        let teams = ["A", "B", "C", "D"];
        let pairs = [(0, 1), (2, 3), (0, 2), (1, 3), (3, 0), (1, 2)];
        GroupSpec {
            label: "X".to_string(),
            teams: teams.iter().map(|t| t.to_string()).collect(),
            matches: pairs
                .iter()
                .enumerate()
                .map(|(idx, &(h, a))| GroupMatch {
                    round: idx as u32 / 2 + 1,
                    home: teams[h].to_string(),
                    away: teams[a].to_string(),
                })
                .collect(),
        }
    }

    fn with_scores(scores: &[(&str, &str, i32, i32)]) -> PredictionSet {
        scores.iter().fold(PredictionSet::default(), |set, &(h, a, gh, ga)| {
            set.with_result(MatchId::new(h, a), Score::new(gh, ga))
        })
    }

    #[test]
    fn test_empty_group_keeps_draw_order() {
        let table = compute_group_table(&group(), &PredictionSet::default());

        let teams: Vec<_> = table.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, ["A", "B", "C", "D"]);
        assert!(table.rows.iter().all(|r| r.points == 0 && r.played == 0));
        assert_eq!(table.missing_matches(), 6);
        assert!(table.final_positions().is_err());
    }

    #[test]
    fn test_fully_played_group_invariants() {
        let results = with_scores(&[
            ("A", "B", 3, 1),
            ("C", "D", 0, 2),
            ("A", "C", 1, 0),
            ("B", "D", 2, 2),
            ("D", "A", 1, 1),
            ("B", "C", 0, 4),
        ]);
        let table = compute_group_table(&group(), &results);

        assert!(table.is_complete());
        for row in &table.rows {
            assert_eq!(row.points, 3 * row.wins + row.draws);
            assert_eq!(row.goal_difference, row.goals_for - row.goals_against);
            assert_eq!(row.played, 3);
        }
        let wins: u32 = table.rows.iter().map(|r| r.wins).sum();
        let points: u32 = table.rows.iter().map(|r| r.points).sum();
        let gf: i32 = table.rows.iter().map(|r| r.goals_for).sum();
        let ga: i32 = table.rows.iter().map(|r| r.goals_against).sum();
        assert_eq!(wins, 4);
        assert_eq!(points, 3 * 4 + 2 * 2);
        assert_eq!(gf, ga);

        let order: Vec<_> = table.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, ["A", "D", "C", "B"]);
        assert_eq!(table.rows[0].zone, Zone::Direct);
        assert_eq!(table.rows[2].zone, Zone::ThirdPlaceCandidate);
        assert_eq!(table.rows[3].zone, Zone::Eliminated);
    }

    #[test]
    fn test_all_decisive_group_distributes_eighteen_points() {
        let results = with_scores(&[
            ("A", "B", 1, 0),
            ("C", "D", 2, 0),
            ("A", "C", 0, 1),
            ("B", "D", 3, 1),
            ("D", "A", 0, 2),
            ("B", "C", 1, 2),
        ]);
        let table = compute_group_table(&group(), &results);

        assert_eq!(table.rows.iter().map(|r| r.points).sum::<u32>(), 18);
        assert_eq!(table.rows[0].team, "C");
        assert_eq!(table.rows[0].points, 9);
    }

    #[test]
    fn test_tie_breaks() {
        // A and B level on points and goal difference, B scored more.
        // C and D likewise at the bottom, D scored more.
        let results = with_scores(&[("A", "C", 1, 0), ("B", "D", 3, 2)]);
        let table = compute_group_table(&group(), &results);
        let order: Vec<_> = table.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, ["B", "A", "D", "C"]);

        // Identical records keep draw order.
        let results = with_scores(&[("A", "B", 1, 1), ("C", "D", 1, 1)]);
        let table = compute_group_table(&group(), &results);
        let order: Vec<_> = table.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_is_deterministic() {
        let results = with_scores(&[("A", "B", 2, 2), ("C", "D", 0, 0), ("A", "C", 1, 2)]);
        assert_eq!(
            compute_group_table(&group(), &results),
            compute_group_table(&group(), &results)
        );
    }

    #[test]
    fn test_ignores_results_of_other_groups() {
        let results = with_scores(&[("A", "B", 1, 0), ("Z", "Y", 5, 0)]);
        let table = compute_group_table(&group(), &results);
        assert_eq!(table.played_matches, 1);
    }

    #[test]
    fn test_huge_goal_counts_saturate() {
        let results = with_scores(&[("A", "B", i32::MAX, 0), ("A", "C", i32::MAX, 0)]);
        let table = compute_group_table(&group(), &results);

        let a = table.rows.iter().find(|r| r.team == "A").unwrap();
        assert_eq!(a.goals_for, i32::MAX);
        assert_eq!(a.goal_difference, i32::MAX);
        assert_eq!(a.points, 6);
    }
}
