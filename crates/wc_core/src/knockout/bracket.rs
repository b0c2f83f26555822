use super::reference::PositionReference;
use super::slots::SlotConstraint;
use crate::error::ConfigurationError;
use crate::models::{GroupLabel, GroupSet, Side};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    #[serde(rename = "round_of_32")]
    RoundOf32,
    #[serde(rename = "round_of_16")]
    RoundOf16,
    #[serde(rename = "quarter_final")]
    QuarterFinal,
    #[serde(rename = "semi_final")]
    SemiFinal,
    #[serde(rename = "third_place")]
    ThirdPlace,
    #[serde(rename = "final")]
    Final,
}

impl Round {
    pub const ALL: [Round; 6] = [
        Round::RoundOf32,
        Round::RoundOf16,
        Round::QuarterFinal,
        Round::SemiFinal,
        Round::ThirdPlace,
        Round::Final,
    ];

    /// Spelling used in bracket data.
    pub fn code(self) -> &'static str {
        match self {
            Round::RoundOf32 => "round_of_32",
            Round::RoundOf16 => "round_of_16",
            Round::QuarterFinal => "quarter_final",
            Round::SemiFinal => "semi_final",
            Round::ThirdPlace => "third_place",
            Round::Final => "final",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Round::RoundOf32 => "Round of 32",
            Round::RoundOf16 => "Round of 16",
            Round::QuarterFinal => "Quarter-final",
            Round::SemiFinal => "Semi-final",
            Round::ThirdPlace => "Third place",
            Round::Final => "Final",
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Round {
    type Err = ConfigurationError;

    /// Accepts the bracket-data spelling, e.g. `round_of_16`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Round::ALL
            .into_iter()
            .find(|round| round.code() == s.trim())
            .ok_or_else(|| ConfigurationError::BracketDefinition(format!("unknown round '{s}'")))
    }
}

/// One knockout fixture, defined by the positions that feed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketNode {
    #[serde(rename = "match")]
    pub match_number: u16,
    pub round: Round,
    pub home: PositionReference,
    pub away: PositionReference,
}

impl BracketNode {
    pub fn reference(&self, side: Side) -> &PositionReference {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn references(&self) -> [(Side, &PositionReference); 2] {
        [(Side::Home, &self.home), (Side::Away, &self.away)]
    }

    /// Group set of the best-third position on this fixture, if it has one.
    pub fn third_place_groups(&self) -> Option<GroupSet> {
        self.references().into_iter().find_map(|(_, reference)| match reference {
            PositionReference::BestThird { groups } => Some(*groups),
            _ => None,
        })
    }
}

#[derive(Deserialize)]
struct RawBracket {
    name: String,
    groups: Vec<GroupLabel>,
    fixtures: Vec<BracketNode>,
}

/// A validated knockout bracket.
///
/// Fixtures are kept sorted by match number, and every match reference points
/// at an earlier fixture, so the dependency graph is a DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketDefinition {
    name: String,
    groups: Vec<GroupLabel>,
    fixtures: Vec<BracketNode>,
}

impl BracketDefinition {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        let raw: RawBracket = serde_yaml::from_str(yaml)
            .map_err(|e| ConfigurationError::BracketDefinition(e.to_string()))?;
        Self::new(raw.name, raw.groups, raw.fixtures)
    }

    pub fn new(
        name: impl Into<String>,
        groups: Vec<GroupLabel>,
        mut fixtures: Vec<BracketNode>,
    ) -> Result<Self, ConfigurationError> {
        let known_groups: BTreeSet<GroupLabel> = groups.iter().copied().collect();
        if known_groups.is_empty() {
            return Err(ConfigurationError::BracketDefinition("no groups listed".to_string()));
        }
        if known_groups.len() != groups.len() {
            return Err(ConfigurationError::BracketDefinition("group listed twice".to_string()));
        }

        fixtures.sort_by_key(|node| node.match_number);
        let mut numbers = HashSet::new();
        for node in &fixtures {
            if !numbers.insert(node.match_number) {
                return Err(ConfigurationError::DuplicateMatch(node.match_number));
            }
        }

        let mut third_slots: HashMap<GroupSet, u16> = HashMap::new();
        for node in &fixtures {
            let mut thirds_on_node = 0;
            for (_, reference) in node.references() {
                match reference {
                    PositionReference::Group { group, .. } => {
                        if !known_groups.contains(group) {
                            return Err(ConfigurationError::UnknownGroup(*group));
                        }
                    }
                    PositionReference::BestThird { groups: allowed } => {
                        if allowed.is_empty() {
                            let slot = node.match_number;
                            return Err(ConfigurationError::EmptySlotConstraint { slot });
                        }
                        if let Some(group) = allowed.iter().find(|g| !known_groups.contains(g)) {
                            return Err(ConfigurationError::UnknownGroup(group));
                        }
                        thirds_on_node += 1;
                        if thirds_on_node > 1 {
                            return Err(ConfigurationError::DuplicateSlot(node.match_number));
                        }
                        if let Some(first) = third_slots.insert(*allowed, node.match_number) {
                            return Err(ConfigurationError::BracketDefinition(format!(
                                "slots {first} and {} share the group set {allowed}",
                                node.match_number
                            )));
                        }
                    }
                    PositionReference::Match { match_number, .. } => {
                        if *match_number >= node.match_number {
                            return Err(ConfigurationError::ForwardReference {
                                from: node.match_number,
                                referenced: *match_number,
                            });
                        }
                        if !numbers.contains(match_number) {
                            return Err(ConfigurationError::UnknownMatch(*match_number));
                        }
                    }
                }
            }
        }

        Ok(Self { name: name.into(), groups, fixtures })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groups(&self) -> &[GroupLabel] {
        &self.groups
    }

    pub fn fixtures(&self) -> &[BracketNode] {
        &self.fixtures
    }

    pub fn get(&self, match_number: u16) -> Option<&BracketNode> {
        self.fixtures
            .binary_search_by_key(&match_number, |node| node.match_number)
            .ok()
            .map(|index| &self.fixtures[index])
    }

    /// Like [`get`](Self::get), but a missing fixture is a configuration error.
    pub fn node(&self, match_number: u16) -> Result<&BracketNode, ConfigurationError> {
        self.get(match_number).ok_or(ConfigurationError::UnknownMatch(match_number))
    }

    pub fn round(&self, round: Round) -> impl Iterator<Item = &BracketNode> {
        self.fixtures.iter().filter(move |node| node.round == round)
    }

    /// One constraint per best-third position, ascending by slot.
    pub fn slot_constraints(&self) -> Vec<SlotConstraint> {
        self.fixtures
            .iter()
            .filter_map(|node| {
                let slot = node.match_number;
                node.third_place_groups().map(|allowed| SlotConstraint { slot, allowed })
            })
            .collect()
    }

    /// Slot whose best-third position draws from exactly `groups`.
    pub fn slot_for(&self, groups: GroupSet) -> Result<u16, ConfigurationError> {
        self.fixtures
            .iter()
            .find(|node| node.third_place_groups() == Some(groups))
            .map(|node| node.match_number)
            .ok_or(ConfigurationError::UnknownSlot(groups))
    }

    /// Every fixture fed, directly or transitively, by `match_number`.
    pub fn downstream_of(&self, match_number: u16) -> BTreeSet<u16> {
        let mut dependents: BTreeMap<u16, Vec<u16>> = BTreeMap::new();
        for node in &self.fixtures {
            for (_, reference) in node.references() {
                if let Some(source) = reference.depends_on() {
                    dependents.entry(source).or_default().push(node.match_number);
                }
            }
        }

        let mut affected = BTreeSet::new();
        let mut stack: Vec<u16> = dependents.get(&match_number).cloned().unwrap_or_default();
        while let Some(current) = stack.pop() {
            if !affected.insert(current) {
                continue;
            }
            if let Some(children) = dependents.get(&current) {
                stack.extend(children.iter().copied());
            }
        }
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::official_bracket;

    fn node(match_number: u16, round: Round, home: &str, away: &str) -> BracketNode {
        BracketNode {
            match_number,
            round,
            home: home.parse().unwrap(),
            away: away.parse().unwrap(),
        }
    }

    fn ab() -> Vec<GroupLabel> {
        GroupLabel::first(2)
    }

    #[test]
    fn official_bracket_has_32_fixtures_and_8_slots() {
        let bracket = official_bracket().unwrap();
        assert_eq!(bracket.fixtures().len(), 32);
        assert_eq!(bracket.groups().len(), 12);
        assert_eq!(bracket.round(Round::RoundOf32).count(), 16);
        assert_eq!(bracket.round(Round::RoundOf16).count(), 8);
        let finals: Vec<u16> = bracket.round(Round::Final).map(|n| n.match_number).collect();
        assert_eq!(finals, vec![104]);

        let slots: Vec<String> = bracket
            .slot_constraints()
            .iter()
            .map(|c| format!("{}:{}", c.slot, c.allowed))
            .collect();
        assert_eq!(
            slots,
            vec![
                "74:ABCDF", "77:CDFGH", "79:CEFHI", "80:EHIJK", "81:BEFIJ", "82:AEHIJ", "85:EFGIJ",
                "87:DEIJL"
            ]
        );
        assert_eq!(bracket.slot_for("CEFHI".parse().unwrap()), Ok(79));
        assert_eq!(
            bracket.slot_for("ABC".parse().unwrap()),
            Err(ConfigurationError::UnknownSlot("ABC".parse().unwrap()))
        );
    }

    #[test]
    fn downstream_follows_winners_and_losers() {
        let bracket = official_bracket().unwrap();
        let downstream: Vec<u16> = bracket.downstream_of(74).into_iter().collect();
        assert_eq!(downstream, vec![89, 97, 101, 103, 104]);
        assert!(bracket.downstream_of(104).is_empty());
    }

    #[test]
    fn rejects_forward_and_unknown_references() {
        let forward = BracketDefinition::new(
            "t",
            ab(),
            vec![node(1, Round::SemiFinal, "1A", "W2"), node(2, Round::SemiFinal, "1B", "2A")],
        );
        assert_eq!(forward, Err(ConfigurationError::ForwardReference { from: 1, referenced: 2 }));

        let unknown = BracketDefinition::new("t", ab(), vec![node(5, Round::Final, "W3", "1A")]);
        assert_eq!(unknown, Err(ConfigurationError::UnknownMatch(3)));
    }

    #[test]
    fn rejects_duplicates_and_unknown_groups() {
        let duplicate = BracketDefinition::new(
            "t",
            ab(),
            vec![node(1, Round::Final, "1A", "2B"), node(1, Round::Final, "1B", "2A")],
        );
        assert_eq!(duplicate, Err(ConfigurationError::DuplicateMatch(1)));

        let stray = BracketDefinition::new("t", ab(), vec![node(1, Round::Final, "1A", "3BC")]);
        assert_eq!(stray, Err(ConfigurationError::UnknownGroup(GroupLabel::new('C').unwrap())));

        let two_thirds = BracketDefinition::new("t", ab(), vec![node(1, Round::Final, "3A", "3B")]);
        assert_eq!(two_thirds, Err(ConfigurationError::DuplicateSlot(1)));
    }

    #[test]
    fn round_codes_match_serde_names() {
        for round in Round::ALL {
            assert_eq!(round.code().parse::<Round>(), Ok(round));
            assert_eq!(serde_json::to_value(round).unwrap(), serde_json::json!(round.code()));
        }
        assert!("round_of32".parse::<Round>().is_err());
    }

    #[test]
    fn malformed_yaml_code_is_a_definition_error() {
        let yaml = concat!(
            "name: t\ngroups: [A]\nfixtures:\n",
            "  - { match: 1, round: final, home: \"1A\", away: \"Q9\" }\n"
        );
        assert!(matches!(
            BracketDefinition::from_yaml(yaml),
            Err(ConfigurationError::BracketDefinition(msg)) if msg.contains("Q9")
        ));
    }
}
