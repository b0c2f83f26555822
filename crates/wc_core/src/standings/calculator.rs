use crate::config::PointsConfig;
use crate::models::{GroupStanding, MatchResult, Team, TeamId};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Derives per-team group statistics from a set of match results.
///
/// Goals count for `in_progress` and `completed` matches; played, won, drawn,
/// lost and points count for `completed` matches only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandingsCalculator {
    points: PointsConfig,
}

impl StandingsCalculator {
    pub fn new(points: PointsConfig) -> Self {
        Self { points }
    }

    pub fn calculate(
        &self,
        teams: &[&Team],
        matches: &[&MatchResult],
    ) -> BTreeMap<TeamId, GroupStanding> {
        let mut table: BTreeMap<TeamId, GroupStanding> =
            teams.iter().map(|team| (team.id, GroupStanding::new(team))).collect();

        for result in matches {
            if !result.counts_for_goals() {
                continue;
            }
            if !table.contains_key(&result.home_team) || !table.contains_key(&result.away_team) {
                tracing::warn!(
                    match_number = result.match_number,
                    "skipping result involving a team outside this group"
                );
                continue;
            }

            let completed = result.is_completed();
            let (home, away) = (result.home_score, result.away_score);
            self.apply(&mut table, result.home_team, home, away, completed);
            self.apply(&mut table, result.away_team, away, home, completed);
        }

        for standing in table.values_mut() {
            standing.goal_difference = standing.goals_for as i32 - standing.goals_against as i32;
        }
        table
    }

    fn apply(
        &self,
        table: &mut BTreeMap<TeamId, GroupStanding>,
        team: TeamId,
        scored: u8,
        conceded: u8,
        completed: bool,
    ) {
        let Some(standing) = table.get_mut(&team) else {
            return;
        };
        standing.goals_for += u32::from(scored);
        standing.goals_against += u32::from(conceded);
        if !completed {
            return;
        }

        standing.played += 1;
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                standing.won += 1;
                standing.points += self.points.win;
            }
            Ordering::Equal => {
                standing.drawn += 1;
                standing.points += self.points.draw;
            }
            Ordering::Less => {
                standing.lost += 1;
                standing.points += self.points.loss;
            }
        }
    }
}
