//! Fixtures shared by the unit tests.

use crate::data::sample_draw;
use crate::engine::TournamentEngine;
use crate::models::{GroupLabel, MatchResult, TeamId};
use crate::standings::GroupTable;
use crate::store::{ResultStore, TournamentData};

pub fn sample_tournament() -> TournamentData {
    sample_draw().unwrap()
}

pub fn all_tables(data: &TournamentData) -> Vec<GroupTable> {
    TournamentEngine::official(data).unwrap().compute_all_groups().unwrap()
}

/// Plays every group with the same shape: the first drawn team wins all
/// three, the second beats the last two, the third beats the fourth k-0
/// where k is the group's index plus one. Third places therefore rank
/// L, K, J, ... A.
pub fn play_scenario_group_stage(data: &mut TournamentData) {
    let groups = data.groups();
    for (index, group) in groups.into_iter().enumerate() {
        let ids: Vec<TeamId> = data.teams_in_group(group).iter().map(|t| t.id).collect();
        let k = index as u8 + 1;
        let scores =
            [(0, 1, 2, 1), (2, 3, k, 0), (0, 2, 1, 0), (3, 1, 0, 2), (3, 0, 0, 3), (1, 2, 1, 0)];
        for (offset, (home, away, home_goals, away_goals)) in scores.into_iter().enumerate() {
            let number = (index * 6 + offset + 1) as u16;
            let result = MatchResult::group_stage(number, group, ids[home], ids[away]);
            data.record_result(result.with_score(home_goals, away_goals));
        }
    }
}

pub fn group(letter: char) -> GroupLabel {
    GroupLabel::new(letter).unwrap()
}
