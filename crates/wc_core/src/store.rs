//! Read access to teams and match results.
//!
//! Every computation takes a [`ResultStore`] explicitly, so the engine stays a
//! pure function of what the store returns at call time.

use crate::error::{InputError, Result};
use crate::models::{GroupLabel, MatchResult, Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

pub trait ResultStore {
    /// Group labels present in the draw, sorted.
    fn groups(&self) -> Vec<GroupLabel>;

    /// Teams of one group, in draw order.
    fn teams_in_group(&self, group: GroupLabel) -> Vec<&Team>;

    /// All group-stage results of one group, whatever their status.
    fn group_matches(&self, group: GroupLabel) -> Vec<&MatchResult>;

    /// The knockout fixture with this match number, if it has been created.
    fn knockout_match(&self, match_number: u16) -> Option<&MatchResult>;

    fn team(&self, id: TeamId) -> Option<&Team>;
}

/// In-memory snapshot of a tournament: the draw plus every recorded match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentData {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub matches: Vec<MatchResult>,
}

impl TournamentData {
    pub fn new(teams: Vec<Team>) -> Self {
        Self { teams, matches: Vec::new() }
    }

    /// Parse and validate a tournament JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: TournamentData =
            serde_json::from_str(json).map_err(|e| InputError::MalformedData(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }

    /// Check the draw and match list for structural problems.
    pub fn validate(&self) -> Result<()> {
        let mut team_ids = HashSet::new();
        let mut draw_slots = HashSet::new();
        for team in &self.teams {
            if !team_ids.insert(team.id) {
                return Err(InputError::DuplicateTeam(team.id).into());
            }
            if !draw_slots.insert((team.group, team.draw_position)) {
                return Err(InputError::DuplicateDrawPosition {
                    group: team.group,
                    position: team.draw_position,
                }
                .into());
            }
        }

        let by_id: HashMap<TeamId, &Team> = self.teams.iter().map(|t| (t.id, t)).collect();
        let mut numbers = HashSet::new();
        for result in &self.matches {
            if !numbers.insert(result.match_number) {
                return Err(InputError::DuplicateMatch(result.match_number).into());
            }
            if result.home_team == result.away_team {
                return Err(InputError::SelfMatch(result.match_number).into());
            }
            for id in [result.home_team, result.away_team] {
                let team = by_id.get(&id).ok_or(InputError::UnknownTeam(id))?;
                if let Some(group) = result.group {
                    if team.group != group {
                        return Err(InputError::TeamNotInGroup {
                            match_number: result.match_number,
                            team: id,
                            group,
                        }
                        .into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Insert a result, replacing any earlier record with the same match number.
    pub fn record_result(&mut self, result: MatchResult) {
        match self.matches.iter_mut().find(|m| m.match_number == result.match_number) {
            Some(existing) => *existing = result,
            None => self.matches.push(result),
        }
    }

    pub fn remove_result(&mut self, match_number: u16) -> Option<MatchResult> {
        let index = self.matches.iter().position(|m| m.match_number == match_number)?;
        Some(self.matches.remove(index))
    }

    pub fn match_by_number(&self, match_number: u16) -> Option<&MatchResult> {
        self.matches.iter().find(|m| m.match_number == match_number)
    }

    /// Lowest match number not yet used, starting from 1.
    pub fn next_free_match_number(&self) -> u16 {
        let used: HashSet<u16> = self.matches.iter().map(|m| m.match_number).collect();
        (1..=u16::MAX).find(|n| !used.contains(n)).unwrap_or(u16::MAX)
    }
}

impl ResultStore for TournamentData {
    fn groups(&self) -> Vec<GroupLabel> {
        self.teams.iter().map(|t| t.group).collect::<BTreeSet<_>>().into_iter().collect()
    }

    fn teams_in_group(&self, group: GroupLabel) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.iter().filter(|t| t.group == group).collect();
        teams.sort_by_key(|t| (t.draw_position, t.id));
        teams
    }

    fn group_matches(&self, group: GroupLabel) -> Vec<&MatchResult> {
        self.matches.iter().filter(|m| m.group == Some(group)).collect()
    }

    fn knockout_match(&self, match_number: u16) -> Option<&MatchResult> {
        self.matches.iter().find(|m| m.group.is_none() && m.match_number == match_number)
    }

    fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }
}
