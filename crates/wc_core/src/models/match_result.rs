//! Match results as read from the result store.
//!
//! Only `completed` results decide anything. An `in_progress` group match
//! feeds provisional goals into the standings but never a win, draw or loss.

use super::team::{GroupLabel, TeamId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Home => write!(f, "home"),
            Side::Away => write!(f, "away"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_number: u16,
    /// Set for group-stage matches, `None` for knockout fixtures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupLabel>,
    pub home_team: TeamId,
    pub away_team: TeamId,
    #[serde(default)]
    pub home_score: u8,
    #[serde(default)]
    pub away_score: u8,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_penalties: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_penalties: Option<u8>,
}

impl MatchResult {
    /// Scheduled group-stage match with no score yet.
    pub fn group_stage(match_number: u16, group: GroupLabel, home: TeamId, away: TeamId) -> Self {
        Self {
            match_number,
            group: Some(group),
            home_team: home,
            away_team: away,
            home_score: 0,
            away_score: 0,
            status: MatchStatus::Scheduled,
            home_penalties: None,
            away_penalties: None,
        }
    }

    /// Scheduled knockout fixture with no score yet.
    pub fn knockout(match_number: u16, home: TeamId, away: TeamId) -> Self {
        Self {
            match_number,
            group: None,
            home_team: home,
            away_team: away,
            home_score: 0,
            away_score: 0,
            status: MatchStatus::Scheduled,
            home_penalties: None,
            away_penalties: None,
        }
    }

    /// Final score; marks the match completed.
    pub fn with_score(mut self, home: u8, away: u8) -> Self {
        self.home_score = home;
        self.away_score = away;
        self.status = MatchStatus::Completed;
        self
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_penalties(mut self, home: u8, away: u8) -> Self {
        self.home_penalties = Some(home);
        self.away_penalties = Some(away);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Whether the goals of this match count toward goals for/against.
    pub fn counts_for_goals(&self) -> bool {
        matches!(self.status, MatchStatus::InProgress | MatchStatus::Completed)
    }

    pub fn is_group_stage(&self) -> bool {
        self.group.is_some()
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home_team == team || self.away_team == team
    }

    pub fn team(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team,
            Side::Away => self.away_team,
        }
    }

    pub fn score(&self, side: Side) -> u8 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    /// Side that won on the primary score, or on penalties when level.
    ///
    /// `None` when the score is level and penalties are missing or level too.
    pub fn decisive_side(&self) -> Option<Side> {
        match self.home_score.cmp(&self.away_score) {
            Ordering::Greater => Some(Side::Home),
            Ordering::Less => Some(Side::Away),
            Ordering::Equal => match (self.home_penalties, self.away_penalties) {
                (Some(home), Some(away)) if home > away => Some(Side::Home),
                (Some(home), Some(away)) if away > home => Some(Side::Away),
                _ => None,
            },
        }
    }

    pub fn winner(&self) -> Option<TeamId> {
        self.decisive_side().map(|side| self.team(side))
    }

    pub fn loser(&self) -> Option<TeamId> {
        self.decisive_side().map(|side| self.team(side.opposite()))
    }
}
