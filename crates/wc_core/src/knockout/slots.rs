//! Third-place slot assignment.
//!
//! Each best-third position in the bracket accepts only teams from a fixed
//! set of groups. [`SlotAssigner`] maps the qualifying thirds onto those
//! positions by depth-first search: slots in ascending order, candidates in
//! pool-rank order, first complete mapping wins.

use crate::error::{ConfigurationError, EngineError, InputError};
use crate::models::{GroupLabel, GroupSet, TeamId, ThirdPlaceEntry};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConstraint {
    /// Match number of the fixture holding the slot.
    pub slot: u16,
    pub allowed: GroupSet,
}

impl SlotConstraint {
    pub fn accepts(&self, group: GroupLabel) -> bool {
        self.allowed.contains(group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPick {
    pub slot: u16,
    pub team_id: TeamId,
    pub group: GroupLabel,
}

/// A complete, checked mapping of slots to third-placed teams, ordered by slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotAssignment {
    picks: Vec<SlotPick>,
}

impl SlotAssignment {
    pub fn new(
        mut picks: Vec<SlotPick>,
        constraints: &[SlotConstraint],
    ) -> Result<Self, InputError> {
        picks.sort_by_key(|pick| pick.slot);
        let assignment = Self { picks };
        assignment.validate(constraints)?;
        Ok(assignment)
    }

    /// Every constraint filled exactly once, no team used twice, every team
    /// from a group its slot accepts.
    pub fn validate(&self, constraints: &[SlotConstraint]) -> Result<(), InputError> {
        let by_slot: HashMap<u16, &SlotConstraint> =
            constraints.iter().map(|c| (c.slot, c)).collect();
        let mut slot_of_team: HashMap<TeamId, u16> = HashMap::new();
        let mut filled: HashMap<u16, TeamId> = HashMap::new();

        for pick in &self.picks {
            let constraint = by_slot.get(&pick.slot).ok_or(InputError::UnknownSlot(pick.slot))?;
            if filled.insert(pick.slot, pick.team_id).is_some() {
                return Err(InputError::DuplicateSlotPick(pick.slot));
            }
            if let Some(first) = slot_of_team.insert(pick.team_id, pick.slot) {
                return Err(InputError::DuplicateSlotTeam {
                    team: pick.team_id,
                    first,
                    second: pick.slot,
                });
            }
            if !constraint.accepts(pick.group) {
                return Err(InputError::SlotGroupMismatch {
                    slot: pick.slot,
                    team: pick.team_id,
                    group: pick.group,
                });
            }
        }

        if let Some(missing) = constraints.iter().find(|c| !filled.contains_key(&c.slot)) {
            return Err(InputError::MissingSlot(missing.slot));
        }
        Ok(())
    }

    pub fn picks(&self) -> &[SlotPick] {
        &self.picks
    }

    pub fn pick_for(&self, slot: u16) -> Option<&SlotPick> {
        self.picks.iter().find(|pick| pick.slot == slot)
    }

    pub fn team_for(&self, slot: u16) -> Option<TeamId> {
        self.pick_for(slot).map(|pick| pick.team_id)
    }

    /// Groups whose thirds are placed.
    pub fn groups(&self) -> GroupSet {
        self.picks.iter().map(|pick| pick.group).collect()
    }

    /// Slot number to group letter, for display and logs.
    pub fn slot_map(&self) -> BTreeMap<String, String> {
        self.picks.iter().map(|pick| (pick.slot.to_string(), pick.group.to_string())).collect()
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    team_id: TeamId,
    group: GroupLabel,
}

#[derive(Debug, Clone)]
pub struct SlotAssigner {
    constraints: Vec<SlotConstraint>,
}

impl SlotAssigner {
    pub fn new(mut constraints: Vec<SlotConstraint>) -> Result<Self, ConfigurationError> {
        constraints.sort_by_key(|c| c.slot);
        for pair in constraints.windows(2) {
            if pair[0].slot == pair[1].slot {
                return Err(ConfigurationError::DuplicateSlot(pair[0].slot));
            }
        }
        if let Some(empty) = constraints.iter().find(|c| c.allowed.is_empty()) {
            return Err(ConfigurationError::EmptySlotConstraint { slot: empty.slot });
        }
        Ok(Self { constraints })
    }

    pub fn constraints(&self) -> &[SlotConstraint] {
        &self.constraints
    }

    /// Assign the first `constraints.len()` entries of `pool` (already in rank
    /// order) to the slots.
    pub fn assign(&self, pool: &[ThirdPlaceEntry]) -> Result<SlotAssignment, EngineError> {
        let required = self.constraints.len();
        if pool.len() < required {
            let found = pool.len();
            return Err(ConfigurationError::InsufficientThirdPlacePool { required, found }.into());
        }

        let candidates: Vec<Candidate> = pool[..required]
            .iter()
            .map(|entry| Candidate { team_id: entry.team_id(), group: entry.group() })
            .collect();
        let groups: GroupSet = candidates.iter().map(|c| c.group).collect();

        let mut visited = 0usize;
        let picks = self.search(0, &candidates, Vec::with_capacity(required), &mut visited);
        tracing::debug!(
            groups = %groups,
            visited,
            found = picks.is_some(),
            "third-place slot search finished"
        );

        let picks = picks.ok_or(ConfigurationError::NoValidAssignment { groups })?;
        Ok(SlotAssignment::new(picks, &self.constraints)?)
    }

    fn search(
        &self,
        depth: usize,
        remaining: &[Candidate],
        chosen: Vec<SlotPick>,
        visited: &mut usize,
    ) -> Option<Vec<SlotPick>> {
        let Some(constraint) = self.constraints.get(depth) else {
            return Some(chosen);
        };

        for (index, candidate) in remaining.iter().enumerate() {
            if !constraint.accepts(candidate.group) {
                continue;
            }
            *visited += 1;

            let mut rest = remaining.to_vec();
            rest.remove(index);
            let mut picks = chosen.clone();
            picks.push(SlotPick {
                slot: constraint.slot,
                team_id: candidate.team_id,
                group: candidate.group,
            });

            if let Some(complete) = self.search(depth + 1, &rest, picks, visited) {
                return Some(complete);
            }
        }
        None
    }
}
