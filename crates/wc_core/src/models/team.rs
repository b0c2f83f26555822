use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a national team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Group-stage label, a single uppercase ASCII letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupLabel(char);

impl GroupLabel {
    pub fn new(letter: char) -> Option<Self> {
        let upper = letter.to_ascii_uppercase();
        upper.is_ascii_uppercase().then_some(Self(upper))
    }

    /// Label at `index` counting from `A` (0 => A, 11 => L).
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .filter(|i| *i < 26)
            .map(|i| Self(char::from(b'A' + i)))
    }

    /// The first `count` labels, `A` onwards.
    pub fn first(count: usize) -> Vec<Self> {
        (0..count.min(26)).filter_map(Self::from_index).collect()
    }

    pub fn letter(self) -> char {
        self.0
    }

    fn bit(self) -> u32 {
        1 << (self.0 as u32 - 'A' as u32)
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GroupLabel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => GroupLabel::new(letter)
                .ok_or_else(|| ConfigurationError::InvalidGroupLabel(s.to_string())),
            _ => Err(ConfigurationError::InvalidGroupLabel(s.to_string())),
        }
    }
}

impl TryFrom<String> for GroupLabel {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GroupLabel> for String {
    fn from(label: GroupLabel) -> Self {
        label.0.to_string()
    }
}

/// Set of group labels, stored as a bitmask and iterated alphabetically.
///
/// Serialized as the concatenated letters, e.g. `"ABCDF"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupSet(u32);

impl GroupSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, group: GroupLabel) -> bool {
        self.0 & group.bit() != 0
    }

    pub fn insert(&mut self, group: GroupLabel) -> bool {
        let fresh = !self.contains(group);
        self.0 |= group.bit();
        fresh
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = GroupLabel> + '_ {
        (0..26).filter_map(GroupLabel::from_index).filter(|g| self.contains(*g))
    }
}

impl FromIterator<GroupLabel> for GroupSet {
    fn from_iter<I: IntoIterator<Item = GroupLabel>>(iter: I) -> Self {
        let mut set = GroupSet::empty();
        for group in iter {
            set.insert(group);
        }
        set
    }
}

impl fmt::Display for GroupSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for group in self.iter() {
            write!(f, "{}", group)?;
        }
        Ok(())
    }
}

impl FromStr for GroupSet {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = GroupSet::empty();
        for letter in s.trim().chars() {
            let group = GroupLabel::new(letter)
                .ok_or_else(|| ConfigurationError::InvalidGroupLabel(s.to_string()))?;
            if !set.insert(group) {
                return Err(ConfigurationError::InvalidGroupLabel(s.to_string()));
            }
        }
        Ok(set)
    }
}

impl TryFrom<String> for GroupSet {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GroupSet> for String {
    fn from(set: GroupSet) -> Self {
        set.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confederation {
    Afc,
    Caf,
    Concacaf,
    Conmebol,
    Ofc,
    Uefa,
}

/// Team reference data. Owned by the surrounding system and never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub group: GroupLabel,
    /// 1-based position in the group draw (pot order).
    pub draw_position: u8,
    pub confederation: Confederation,
}

impl Team {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        group: GroupLabel,
        draw_position: u8,
        confederation: Confederation,
    ) -> Self {
        Self { id: TeamId(id), name: name.into(), group, draw_position, confederation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_label_parses_single_letters_only() {
        assert_eq!("c".parse::<GroupLabel>().map(GroupLabel::letter), Ok('C'));
        assert!("AB".parse::<GroupLabel>().is_err());
        assert!("".parse::<GroupLabel>().is_err());
        assert!("3".parse::<GroupLabel>().is_err());
    }

    #[test]
    fn group_label_index_round_trip() {
        let labels = GroupLabel::first(12);
        assert_eq!(labels.len(), 12);
        assert_eq!(labels[0].letter(), 'A');
        assert_eq!(labels[11].letter(), 'L');
        assert!(GroupLabel::from_index(26).is_none());
    }

    #[test]
    fn group_set_is_alphabetical_and_rejects_repeats() {
        let set: GroupSet = "FDBCA".parse().unwrap();
        assert_eq!(set.to_string(), "ABCDF");
        assert_eq!(set.len(), 5);
        assert!(set.contains(GroupLabel::new('D').unwrap()));
        assert!(!set.contains(GroupLabel::new('E').unwrap()));
        assert!("AAB".parse::<GroupSet>().is_err());
    }

    #[test]
    fn team_serializes_with_string_group() {
        let team = Team::new(7, "Japan", GroupLabel::new('F').unwrap(), 2, Confederation::Afc);
        let json = serde_json::to_value(&team).unwrap();
        assert_eq!(json["group"], "F");
        assert_eq!(json["confederation"], "AFC");
        let back: Team = serde_json::from_value(json).unwrap();
        assert_eq!(back, team);
    }
}
