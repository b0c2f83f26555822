//! Engine facade: the operations the surrounding system calls.
//!
//! ```rust
//! use wc_core::data::sample_draw;
//! use wc_core::engine::TournamentEngine;
//! use wc_core::models::GroupLabel;
//!
//! let data = sample_draw().unwrap();
//! let engine = TournamentEngine::official(&data).unwrap();
//! let table = engine.compute_group_standings(GroupLabel::new('A').unwrap()).unwrap();
//! assert_eq!(table.winner().map(|s| s.team_name.as_str()), Some("Mexico"));
//! ```

use crate::config::EngineConfig;
use crate::data::official_bracket;
use crate::error::{ConfigurationError, InputError, Result};
use crate::knockout::{
    BracketDefinition, FrozenAssignment, KnockoutStage, SlotAssigner, SlotAssignment,
};
use crate::models::{GroupLabel, ThirdPlaceEntry};
use crate::standings::{
    GroupRanker, GroupTable, StandingsCalculator, ThirdPlacePool, ThirdPlaceRanker,
};
use crate::store::ResultStore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Clone)]
pub struct TournamentEngine<'a> {
    store: &'a dyn ResultStore,
    bracket: &'a BracketDefinition,
    config: EngineConfig,
}

impl<'a> TournamentEngine<'a> {
    pub fn new(
        store: &'a dyn ResultStore,
        bracket: &'a BracketDefinition,
        config: EngineConfig,
    ) -> std::result::Result<Self, ConfigurationError> {
        config.validate()?;
        let slots = bracket.slot_constraints().len();
        if config.qualifying_third_places != slots {
            return Err(ConfigurationError::InvalidConfig(format!(
                "qualifying_third_places is {} but bracket '{}' has {slots} third-place slots",
                config.qualifying_third_places,
                bracket.name()
            )));
        }
        Ok(Self { store, bracket, config })
    }

    /// Official 2026 bracket with the default configuration.
    pub fn official(store: &'a dyn ResultStore) -> std::result::Result<Self, ConfigurationError> {
        Self::new(store, official_bracket()?, EngineConfig::default())
    }

    pub fn store(&self) -> &'a dyn ResultStore {
        self.store
    }

    pub fn bracket(&self) -> &'a BracketDefinition {
        self.bracket
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compute_group_standings(&self, group: GroupLabel) -> Result<GroupTable> {
        if !self.bracket.groups().contains(&group) {
            return Err(ConfigurationError::UnknownGroup(group).into());
        }

        let teams = self.store.teams_in_group(group);
        let matches = self.store.group_matches(group);
        let standings = StandingsCalculator::new(self.config.points).calculate(&teams, &matches);
        Ok(GroupRanker::new(self.config.group_size).rank(group, standings.into_values()))
    }

    pub fn compute_all_groups(&self) -> Result<Vec<GroupTable>> {
        let tables = self
            .bracket
            .groups()
            .iter()
            .map(|group| self.compute_group_standings(*group))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(groups = tables.len(), "group tables recomputed");
        Ok(tables)
    }

    pub fn compute_third_place_pool(&self) -> Result<ThirdPlacePool> {
        let tables = self.compute_all_groups()?;
        Ok(ThirdPlaceRanker::new(self.config.qualifying_third_places).rank(&tables))
    }

    pub fn resolve_slot_assignment(&self) -> Result<SlotAssignment> {
        let pool = self.compute_third_place_pool()?;
        let qualifiers: Vec<ThirdPlaceEntry> = pool.qualifiers().cloned().collect();
        SlotAssigner::new(self.bracket.slot_constraints())?.assign(&qualifiers)
    }

    /// Completed and required round-robin matches in one group.
    fn group_progress(&self, group: GroupLabel) -> (usize, usize) {
        let teams = self.store.teams_in_group(group).len();
        let matches = self.store.group_matches(group);
        let completed = matches.iter().filter(|m| m.is_completed()).count();
        (completed, teams * teams.saturating_sub(1) / 2)
    }

    /// Completed and required group-stage matches across all groups.
    pub fn group_stage_progress(&self) -> (usize, usize) {
        self.bracket.groups().iter().fold((0, 0), |(done, total), group| {
            let (completed, required) = self.group_progress(*group);
            (done + completed.min(required), total + required)
        })
    }

    /// Every group has played its full round robin.
    pub fn group_stage_complete(&self) -> bool {
        self.bracket.groups().iter().all(|group| {
            let (completed, required) = self.group_progress(*group);
            required > 0 && completed >= required
        })
    }

    fn check_match_numbers(&self) -> Result<()> {
        for group in self.bracket.groups() {
            let clash = self
                .store
                .group_matches(*group)
                .into_iter()
                .find(|m| self.bracket.get(m.match_number).is_some());
            if let Some(m) = clash {
                return Err(InputError::MatchNumberCollision(m.match_number).into());
            }
        }
        Ok(())
    }

    /// Compute the third-place assignment and freeze it for the rest of the
    /// knockout stage. Every group match must be completed.
    pub fn enter_knockout_stage(&self) -> Result<KnockoutStage<'a>> {
        self.check_match_numbers()?;
        if !self.group_stage_complete() {
            let (completed, required) = self.group_stage_progress();
            return Err(InputError::GroupStageIncomplete { completed, required }.into());
        }
        let assignment = self.resolve_slot_assignment()?;
        let frozen = FrozenAssignment::new(assignment);
        tracing::info!(
            bracket = self.bracket.name(),
            groups = %frozen.qualifying_groups,
            "knockout stage entered, third-place assignment frozen"
        );
        Ok(KnockoutStage::new(self.clone(), frozen))
    }

    /// Bracket as it would look if the knockout stage were entered now.
    /// Nothing is frozen and no fixture can be prepared from it.
    pub fn preview_knockout_stage(&self) -> Result<KnockoutStage<'a>> {
        self.check_match_numbers()?;
        let assignment = self.resolve_slot_assignment()?;
        tracing::debug!(groups = %assignment.groups(), "provisional knockout bracket");
        Ok(KnockoutStage::provisional(self.clone(), assignment))
    }

    /// Resume the knockout stage from a persisted assignment.
    pub fn restore_knockout_stage(&self, frozen: FrozenAssignment) -> Result<KnockoutStage<'a>> {
        self.check_match_numbers()?;
        frozen.validate(&self.bracket.slot_constraints())?;
        tracing::debug!(groups = %frozen.qualifying_groups, "knockout stage restored");
        Ok(KnockoutStage::new(self.clone(), frozen))
    }

    /// Everything derived from the current results, for comparison and display.
    pub fn snapshot(&self) -> Result<TournamentSnapshot> {
        let groups = self.compute_all_groups()?;
        let third_place_pool =
            ThirdPlaceRanker::new(self.config.qualifying_third_places).rank(&groups);
        let assignment = match self.resolve_slot_assignment() {
            Ok(assignment) => Some(assignment),
            Err(err) if err.is_configuration() => {
                tracing::debug!(error = %err, "snapshot without slot assignment");
                None
            }
            Err(err) => return Err(err),
        };
        Ok(TournamentSnapshot { groups, third_place_pool, assignment })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub groups: Vec<GroupTable>,
    pub third_place_pool: ThirdPlacePool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<SlotAssignment>,
}

impl TournamentSnapshot {
    /// SHA-256 of the canonical JSON form, hex encoded.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::knockout::Round;
    use crate::models::{MatchResult, TeamId};
    use crate::store::TournamentData;
    use crate::test_support::{group, play_scenario_group_stage, sample_tournament};

    #[test]
    fn unknown_group_is_rejected() {
        let data = sample_tournament();
        let engine = TournamentEngine::official(&data).unwrap();
        let z = GroupLabel::new('Z').unwrap();
        assert_eq!(
            engine.compute_group_standings(z),
            Err(EngineError::Configuration(ConfigurationError::UnknownGroup(z)))
        );
    }

    #[test]
    fn config_must_match_bracket_slots() {
        let data = sample_tournament();
        let config = EngineConfig { qualifying_third_places: 4, ..EngineConfig::fifa() };
        let result = TournamentEngine::new(&data, official_bracket().unwrap(), config);
        assert!(matches!(result, Err(ConfigurationError::InvalidConfig(_))));
    }

    #[test]
    fn unplayed_tournament_still_has_a_pool_and_assignment() {
        let data = sample_tournament();
        let engine = TournamentEngine::official(&data).unwrap();
        assert!(!engine.group_stage_complete());

        let pool = engine.compute_third_place_pool().unwrap();
        assert_eq!(pool.len(), 12);
        // Unplayed thirds tie on draw position and fall back to name order.
        assert_eq!(pool.entries[0].standing.team_name, "Australia");
        assert_eq!(pool.qualifiers().count(), 8);
        assert!(engine.resolve_slot_assignment().is_ok());
    }

    #[test]
    fn empty_store_reports_insufficient_pool() {
        let data = TournamentData::default();
        let engine = TournamentEngine::official(&data).unwrap();
        assert_eq!(
            engine.resolve_slot_assignment(),
            Err(EngineError::Configuration(ConfigurationError::InsufficientThirdPlacePool {
                required: 8,
                found: 0
            }))
        );
        let snapshot = engine.snapshot().unwrap();
        assert!(snapshot.assignment.is_none());
    }

    #[test]
    fn snapshot_fingerprint_is_stable() {
        let mut data = sample_tournament();
        play_scenario_group_stage(&mut data);
        let engine = TournamentEngine::official(&data).unwrap();
        assert!(engine.group_stage_complete());

        let first = engine.snapshot().unwrap();
        let second = engine.snapshot().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
        assert_eq!(first.fingerprint().unwrap().len(), 64);

        let stage = engine.enter_knockout_stage().unwrap();
        assert_eq!(Some(stage.assignment()), first.assignment.as_ref());
        assert_eq!(stage.round_fixtures(Round::Final).unwrap().len(), 1);
    }

    #[test]
    fn entering_requires_a_complete_group_stage() {
        let mut data = sample_tournament();
        let engine = TournamentEngine::official(&data).unwrap();
        assert_eq!(engine.group_stage_progress(), (0, 72));
        assert_eq!(
            engine.enter_knockout_stage().err(),
            Some(EngineError::Input(InputError::GroupStageIncomplete {
                completed: 0,
                required: 72
            }))
        );
        assert!(engine.preview_knockout_stage().unwrap().is_provisional());

        play_scenario_group_stage(&mut data);
        let engine = TournamentEngine::official(&data).unwrap();
        assert_eq!(engine.group_stage_progress(), (72, 72));
        assert!(!engine.enter_knockout_stage().unwrap().is_provisional());
    }

    #[test]
    fn group_match_may_not_take_a_knockout_number() {
        let mut data = sample_tournament();
        play_scenario_group_stage(&mut data);
        data.record_result(
            MatchResult::group_stage(74, group('A'), TeamId(1), TeamId(2)).with_score(1, 0),
        );
        let engine = TournamentEngine::official(&data).unwrap();
        let collision = Some(EngineError::Input(InputError::MatchNumberCollision(74)));
        assert_eq!(engine.enter_knockout_stage().err(), collision);
        assert_eq!(engine.preview_knockout_stage().err(), collision);
    }
}
