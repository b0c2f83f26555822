//! The knockout stage once the third-place assignment is frozen.
//!
//! The assignment is computed once, when the tournament enters the knockout
//! stage, and every later resolution reuses its slot-to-group mapping. Each
//! slot resolves to the current third of its frozen group, so a late edit
//! inside a group can never place one team twice. Changes the frozen mapping
//! no longer reflects show up as [`AssignmentDrift`]; they are never applied
//! on their own.

use super::bracket::Round;
use super::reference::PositionReference;
use super::resolver::{BracketResolver, Resolution, ResolvedFixture};
use super::slots::{SlotAssignment, SlotConstraint};
use crate::engine::TournamentEngine;
use crate::error::{InputError, Result};
use crate::models::{GroupSet, MatchResult, Side, Team};
use crate::standings::GroupTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The assignment in force, in a form the surrounding system can persist.
///
/// Team ids record who was third when the stage was entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenAssignment {
    pub qualifying_groups: GroupSet,
    pub assignment: SlotAssignment,
}

impl FrozenAssignment {
    pub fn new(assignment: SlotAssignment) -> Self {
        Self { qualifying_groups: assignment.groups(), assignment }
    }

    /// Re-check a persisted assignment against the bracket's constraints.
    pub fn validate(&self, constraints: &[SlotConstraint]) -> Result<()> {
        self.assignment.validate(constraints)?;
        let assigned = self.assignment.groups();
        if assigned != self.qualifying_groups {
            return Err(InputError::FrozenGroupsMismatch {
                listed: self.qualifying_groups,
                assigned,
            }
            .into());
        }
        Ok(())
    }
}

/// Difference between the frozen assignment and a fresh recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDrift {
    pub frozen_groups: GroupSet,
    pub current_groups: GroupSet,
    /// Slots a fresh assignment would fill with a different team; empty when
    /// no assignment exists for the current groups.
    pub changed_slots: Vec<u16>,
    /// Slots whose frozen team is no longer third in its group. They now
    /// resolve to the group's current third.
    pub replaced_thirds: Vec<u16>,
}

/// A knockout fixture ready to be created by the surrounding system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFixture {
    pub match_number: u16,
    pub round: Round,
    pub home: Team,
    pub away: Team,
}

impl NewFixture {
    pub fn into_result(self) -> MatchResult {
        MatchResult::knockout(self.match_number, self.home.id, self.away.id)
    }
}

#[derive(Clone)]
pub struct KnockoutStage<'a> {
    engine: TournamentEngine<'a>,
    frozen: FrozenAssignment,
    provisional: bool,
}

impl<'a> KnockoutStage<'a> {
    pub(crate) fn new(engine: TournamentEngine<'a>, frozen: FrozenAssignment) -> Self {
        Self { engine, frozen, provisional: false }
    }

    /// Stage over an assignment that was never frozen. Resolves positions
    /// for display but refuses to prepare fixtures.
    pub(crate) fn provisional(engine: TournamentEngine<'a>, assignment: SlotAssignment) -> Self {
        Self { engine, frozen: FrozenAssignment::new(assignment), provisional: true }
    }

    pub fn is_provisional(&self) -> bool {
        self.provisional
    }

    pub fn frozen(&self) -> &FrozenAssignment {
        &self.frozen
    }

    pub fn assignment(&self) -> &SlotAssignment {
        &self.frozen.assignment
    }

    /// Resolver over freshly computed group tables and the frozen assignment.
    pub fn resolver(&self) -> Result<BracketResolver<'_>> {
        let tables = self.engine.compute_all_groups()?;
        Ok(BracketResolver::new(
            self.engine.store(),
            self.engine.bracket(),
            tables,
            Some(&self.frozen.assignment),
        ))
    }

    pub fn resolve_bracket_position(&self, reference: &PositionReference) -> Result<Resolution> {
        self.resolver()?.resolve_reference(reference)
    }

    pub fn resolve_position(&self, match_number: u16, side: Side) -> Result<Resolution> {
        self.resolver()?.resolve_position(match_number, side)
    }

    pub fn resolve_fixture(&self, match_number: u16) -> Result<ResolvedFixture> {
        self.resolver()?.resolve_fixture(match_number)
    }

    pub fn round_fixtures(&self, round: Round) -> Result<Vec<ResolvedFixture>> {
        self.resolver()?.resolve_round(round)
    }

    /// Check that fixture `match_number` can be created now. Nothing is written.
    pub fn prepare_fixture(&self, match_number: u16) -> Result<NewFixture> {
        if self.provisional {
            return Err(InputError::ProvisionalBracket(match_number).into());
        }
        let fixture = self.resolve_fixture(match_number)?;
        if fixture.result.is_some() {
            return Err(InputError::FixtureExists(match_number).into());
        }

        let team_on = |side: Side| {
            fixture
                .resolution(side)
                .team()
                .cloned()
                .ok_or(InputError::UnresolvedParticipant { match_number, side })
        };
        let home = team_on(Side::Home)?;
        let away = team_on(Side::Away)?;

        Ok(NewFixture { match_number, round: fixture.round, home, away })
    }

    /// Compare the frozen assignment with the current group tables and
    /// third-place pool.
    pub fn drift(&self) -> Result<Option<AssignmentDrift>> {
        let tables = self.engine.compute_all_groups()?;
        let current_groups = self.engine.compute_third_place_pool()?.qualifying_groups();

        let replaced_thirds: Vec<u16> = self
            .frozen
            .assignment
            .picks()
            .iter()
            .filter(|pick| {
                let third = tables
                    .iter()
                    .find(|table| table.group == pick.group)
                    .and_then(GroupTable::third);
                third.map(|standing| standing.team_id) != Some(pick.team_id)
            })
            .map(|pick| pick.slot)
            .collect();

        if current_groups == self.frozen.qualifying_groups && replaced_thirds.is_empty() {
            return Ok(None);
        }

        let changed_slots = match self.engine.resolve_slot_assignment() {
            Ok(current) => current
                .picks()
                .iter()
                .filter(|pick| self.frozen.assignment.team_for(pick.slot) != Some(pick.team_id))
                .map(|pick| pick.slot)
                .collect(),
            Err(err) => {
                tracing::debug!(error = %err, "no assignment for the current third-place pool");
                Vec::new()
            }
        };

        tracing::warn!(
            frozen = %self.frozen.qualifying_groups,
            current = %current_groups,
            changed = changed_slots.len(),
            replaced = replaced_thirds.len(),
            "third-place standings changed after the knockout stage was entered"
        );
        Ok(Some(AssignmentDrift {
            frozen_groups: self.frozen.qualifying_groups,
            current_groups,
            changed_slots,
            replaced_thirds,
        }))
    }

    /// Created fixtures whose teams no longer match the bracket, plus every
    /// created fixture downstream of them.
    pub fn stale_fixtures(&self) -> Result<Vec<u16>> {
        let resolver = self.resolver()?;
        let store = self.engine.store();
        let bracket = self.engine.bracket();

        let mut stale = BTreeSet::new();
        for node in bracket.fixtures() {
            let Some(stored) = store.knockout_match(node.match_number) else {
                continue;
            };
            let fixture = resolver.resolve_fixture(node.match_number)?;
            if fixture.teams() != Some((stored.home_team, stored.away_team)) {
                stale.insert(node.match_number);
                stale.extend(
                    bracket
                        .downstream_of(node.match_number)
                        .into_iter()
                        .filter(|n| store.knockout_match(*n).is_some()),
                );
            }
        }
        Ok(stale.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{GroupLabel, TeamId};
    use crate::store::TournamentData;
    use crate::test_support::{play_scenario_group_stage, sample_tournament};

    fn played() -> TournamentData {
        let mut data = sample_tournament();
        play_scenario_group_stage(&mut data);
        data
    }

    #[test]
    fn prepare_fixture_requires_both_sides() {
        let data = played();
        let engine = TournamentEngine::official(&data).unwrap();
        let stage = engine.enter_knockout_stage().unwrap();

        let ready = stage.prepare_fixture(74).unwrap();
        assert_eq!(ready.round, Round::RoundOf32);
        assert_eq!(ready.away.group, GroupLabel::new('F').unwrap());

        assert_eq!(
            stage.prepare_fixture(89),
            Err(EngineError::Input(InputError::UnresolvedParticipant {
                match_number: 89,
                side: Side::Home
            }))
        );
    }

    #[test]
    fn created_fixture_cannot_be_prepared_twice() {
        let mut data = played();
        let fixture = {
            let engine = TournamentEngine::official(&data).unwrap();
            engine.enter_knockout_stage().unwrap().prepare_fixture(73).unwrap()
        };
        data.record_result(fixture.into_result());

        let engine = TournamentEngine::official(&data).unwrap();
        let stage = engine.enter_knockout_stage().unwrap();
        assert_eq!(
            stage.prepare_fixture(73),
            Err(EngineError::Input(InputError::FixtureExists(73)))
        );
        assert!(stage.stale_fixtures().unwrap().is_empty());
    }

    #[test]
    fn late_group_edit_reports_drift_and_keeps_the_frozen_assignment() {
        let mut data = played();
        let frozen = {
            let engine = TournamentEngine::official(&data).unwrap();
            engine.enter_knockout_stage().unwrap().frozen().clone()
        };
        assert_eq!(frozen.qualifying_groups.to_string(), "EFGHIJKL");

        let r32 = {
            let engine = TournamentEngine::official(&data).unwrap();
            let stage = engine.restore_knockout_stage(frozen.clone()).unwrap();
            stage.prepare_fixture(74).unwrap()
        };
        data.record_result(r32.into_result());

        // Group A's third now wins its last match 9-0 and overtakes group E's.
        let group_a = GroupLabel::new('A');
        let third_a = data
            .matches
            .iter()
            .find(|m| m.group == group_a && m.home_team == TeamId(3) && m.away_team == TeamId(4))
            .cloned()
            .unwrap();
        data.record_result(third_a.with_score(9, 0));

        let engine = TournamentEngine::official(&data).unwrap();
        let stage = engine.restore_knockout_stage(frozen.clone()).unwrap();
        let drift = stage.drift().unwrap().unwrap();
        assert_eq!(drift.frozen_groups.to_string(), "EFGHIJKL");
        assert_eq!(drift.current_groups.to_string(), "AFGHIJKL");
        assert!(!drift.changed_slots.is_empty());

        assert_eq!(stage.assignment(), &frozen.assignment);
        assert_eq!(
            stage.prepare_fixture(74),
            Err(EngineError::Input(InputError::FixtureExists(74)))
        );
    }

    #[test]
    fn restore_rejects_inconsistent_frozen_groups() {
        let data = played();
        let engine = TournamentEngine::official(&data).unwrap();
        let mut frozen = engine.enter_knockout_stage().unwrap().frozen().clone();
        frozen.qualifying_groups = "ABCDEFGH".parse().unwrap();

        assert!(matches!(
            engine.restore_knockout_stage(frozen),
            Err(EngineError::Input(InputError::FrozenGroupsMismatch { .. }))
        ));
    }

    #[test]
    fn edited_result_marks_fixture_and_downstream_stale() {
        let mut data = played();
        let engine = TournamentEngine::official(&data).unwrap();
        let stage = engine.enter_knockout_stage().unwrap();
        let frozen = stage.frozen().clone();
        let f73 = stage.prepare_fixture(73).unwrap();
        let f75 = stage.prepare_fixture(75).unwrap();
        data.record_result(f73.clone().into_result().with_score(1, 0));
        data.record_result(f75.into_result().with_score(2, 0));

        let f90 = {
            let engine = TournamentEngine::official(&data).unwrap();
            engine.restore_knockout_stage(frozen.clone()).unwrap().prepare_fixture(90).unwrap()
        };
        assert_eq!(f90.home.id, f73.home.id);
        data.record_result(f90.into_result());

        // Overturn match 73; match 90 was created with the old winner.
        data.record_result(f73.into_result().with_score(0, 1));
        let engine = TournamentEngine::official(&data).unwrap();
        let stage = engine.restore_knockout_stage(frozen).unwrap();
        assert_eq!(stage.stale_fixtures().unwrap(), vec![90]);
    }

    #[test]
    fn reorder_inside_a_frozen_group_moves_its_new_third_into_the_slot() {
        let mut data = played();
        let (frozen, r87) = {
            let engine = TournamentEngine::official(&data).unwrap();
            let stage = engine.enter_knockout_stage().unwrap();
            (stage.frozen().clone(), stage.prepare_fixture(87).unwrap())
        };
        assert_eq!(r87.away.id, TeamId(47));
        data.record_result(r87.into_result());

        // Group L: 46 and 47 trade second and third, the group set stays.
        for (home, away, home_goals, away_goals) in [(48, 46, 0, 12), (46, 47, 0, 1)] {
            let edited = data
                .matches
                .iter()
                .find(|m| m.home_team == TeamId(home) && m.away_team == TeamId(away))
                .cloned()
                .unwrap();
            data.record_result(edited.with_score(home_goals, away_goals));
        }

        let engine = TournamentEngine::official(&data).unwrap();
        let stage = engine.restore_knockout_stage(frozen.clone()).unwrap();
        let drift = stage.drift().unwrap().unwrap();
        assert_eq!(drift.frozen_groups, drift.current_groups);
        assert_eq!(drift.current_groups.to_string(), "EFGHIJKL");
        assert_eq!(drift.replaced_thirds, vec![87]);
        assert_eq!(drift.changed_slots, vec![87]);

        let third = stage.resolve_bracket_position(&"3DEIJL".parse().unwrap()).unwrap();
        let runner_up = stage.resolve_bracket_position(&"2L".parse().unwrap()).unwrap();
        assert_eq!(third.team_id(), Some(TeamId(46)));
        assert_eq!(runner_up.team_id(), Some(TeamId(47)));

        let mut teams: Vec<TeamId> = stage
            .round_fixtures(Round::RoundOf32)
            .unwrap()
            .iter()
            .filter_map(ResolvedFixture::teams)
            .flat_map(|(home, away)| [home, away])
            .collect();
        teams.sort();
        teams.dedup();
        assert_eq!(teams.len(), 32);

        assert_eq!(stage.assignment(), &frozen.assignment);
        assert_eq!(stage.stale_fixtures().unwrap(), vec![87]);
    }

    #[test]
    fn provisional_stage_resolves_but_does_not_prepare() {
        let data = sample_tournament();
        let engine = TournamentEngine::official(&data).unwrap();
        let stage = engine.preview_knockout_stage().unwrap();
        assert!(stage.is_provisional());
        assert!(stage.resolve_fixture(74).unwrap().home.team().is_some());
        assert_eq!(
            stage.prepare_fixture(73),
            Err(EngineError::Input(InputError::ProvisionalBracket(73)))
        );
    }
}
