use super::team::{GroupLabel, Team, TeamId};
use serde::{Deserialize, Serialize};

/// A team's aggregated group-stage record.
///
/// Always derived from the match set; never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStanding {
    pub team_id: TeamId,
    pub team_name: String,
    pub group: GroupLabel,
    pub draw_position: u8,
    /// Completed matches only.
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    /// 1-based place once ranked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u8>,
}

impl GroupStanding {
    /// All-zero record for a team that has not played yet.
    pub fn new(team: &Team) -> Self {
        Self {
            team_id: team.id,
            team_name: team.name.clone(),
            group: team.group,
            draw_position: team.draw_position,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            rank: None,
        }
    }

    pub fn has_played(&self) -> bool {
        self.played > 0
    }
}

/// A third-placed group finisher, ranked against the other groups' thirds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPlaceEntry {
    pub standing: GroupStanding,
    /// 1-based rank across all groups.
    pub pool_rank: u8,
    pub qualified: bool,
}

impl ThirdPlaceEntry {
    pub fn group(&self) -> GroupLabel {
        self.standing.group
    }

    pub fn team_id(&self) -> TeamId {
        self.standing.team_id
    }
}
