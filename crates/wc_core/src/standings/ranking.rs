//! Group ordering.
//!
//! One comparator serves both the group tables and the cross-group
//! third-place ranking:
//!
//! 1. teams that have played rank above teams that have not; two teams that
//!    have not played keep their draw order
//! 2. points, goal difference, goals scored (all descending)
//! 3. team name, then group label, then team id (ascending)
//!
//! Head-to-head and disciplinary points are not part of the ordering.

use crate::models::{GroupLabel, GroupStanding};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Total order over standings; `Less` means `a` ranks higher.
pub fn compare_standings(a: &GroupStanding, b: &GroupStanding) -> Ordering {
    let primary = match (a.has_played(), b.has_played()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.draw_position.cmp(&b.draw_position),
        (true, true) => b
            .points
            .cmp(&a.points)
            .then_with(|| b.goal_difference.cmp(&a.goal_difference))
            .then_with(|| b.goals_for.cmp(&a.goals_for)),
    };

    primary
        .then_with(|| a.team_name.cmp(&b.team_name))
        .then_with(|| a.group.cmp(&b.group))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Ranked table of one group, padded with empty rows up to the group size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTable {
    pub group: GroupLabel,
    pub rows: Vec<Option<GroupStanding>>,
}

impl GroupTable {
    /// Row at a 1-based place.
    pub fn position(&self, place: usize) -> Option<&GroupStanding> {
        place.checked_sub(1).and_then(|index| self.rows.get(index)).and_then(Option::as_ref)
    }

    pub fn winner(&self) -> Option<&GroupStanding> {
        self.position(1)
    }

    pub fn runner_up(&self) -> Option<&GroupStanding> {
        self.position(2)
    }

    pub fn third(&self) -> Option<&GroupStanding> {
        self.position(3)
    }

    pub fn standings(&self) -> impl Iterator<Item = &GroupStanding> {
        self.rows.iter().flatten()
    }
}

/// Orders one group's standings and fills in their ranks.
#[derive(Debug, Clone, Copy)]
pub struct GroupRanker {
    group_size: usize,
}

impl Default for GroupRanker {
    fn default() -> Self {
        Self { group_size: 4 }
    }
}

impl GroupRanker {
    pub fn new(group_size: usize) -> Self {
        Self { group_size }
    }

    pub fn rank(
        &self,
        group: GroupLabel,
        standings: impl IntoIterator<Item = GroupStanding>,
    ) -> GroupTable {
        let mut ranked: Vec<GroupStanding> = standings.into_iter().collect();
        if ranked.len() > self.group_size {
            tracing::warn!(
                group = %group,
                teams = ranked.len(),
                group_size = self.group_size,
                "group has more teams than the configured group size"
            );
        }

        ranked.sort_by(compare_standings);
        for (index, standing) in ranked.iter_mut().enumerate() {
            standing.rank = u8::try_from(index + 1).ok();
        }

        let mut rows: Vec<Option<GroupStanding>> = ranked.into_iter().map(Some).collect();
        if rows.len() < self.group_size {
            rows.resize(self.group_size, None);
        }
        GroupTable { group, rows }
    }
}
