//! Symbolic bracket positions.
//!
//! Codes as they appear in bracket data:
//!
//! | code     | meaning                                   |
//! |----------|-------------------------------------------|
//! | `1A`     | winner of group A                         |
//! | `2B`     | runner-up of group B                      |
//! | `3ABCDF` | a third-placed team from groups A,B,C,D,F |
//! | `W74`    | winner of match 74                        |
//! | `L101`   | loser of match 101                        |

use crate::error::ConfigurationError;
use crate::models::{GroupLabel, GroupSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPlace {
    Winner,
    RunnerUp,
}

impl GroupPlace {
    /// 1-based table position.
    pub fn position(self) -> usize {
        match self {
            GroupPlace::Winner => 1,
            GroupPlace::RunnerUp => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Winner,
    Loser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PositionReference {
    Group { group: GroupLabel, place: GroupPlace },
    BestThird { groups: GroupSet },
    Match { match_number: u16, outcome: Outcome },
}

impl PositionReference {
    pub fn winner_of(match_number: u16) -> Self {
        PositionReference::Match { match_number, outcome: Outcome::Winner }
    }

    pub fn loser_of(match_number: u16) -> Self {
        PositionReference::Match { match_number, outcome: Outcome::Loser }
    }

    /// The earlier fixture this position waits on, if any.
    pub fn depends_on(&self) -> Option<u16> {
        match self {
            PositionReference::Match { match_number, .. } => Some(*match_number),
            _ => None,
        }
    }

    /// Human-readable label, e.g. "Runner-up Group D" or "Winner Match 93".
    pub fn describe(&self) -> String {
        match self {
            PositionReference::Group { group, place: GroupPlace::Winner } => {
                format!("Winner Group {group}")
            }
            PositionReference::Group { group, place: GroupPlace::RunnerUp } => {
                format!("Runner-up Group {group}")
            }
            PositionReference::BestThird { groups } => {
                let letters: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
                format!("3rd Group {}", letters.join("/"))
            }
            PositionReference::Match { match_number, outcome: Outcome::Winner } => {
                format!("Winner Match {match_number}")
            }
            PositionReference::Match { match_number, outcome: Outcome::Loser } => {
                format!("Loser Match {match_number}")
            }
        }
    }
}

impl fmt::Display for PositionReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PositionReference::Group { group, place } => write!(f, "{}{}", place.position(), group),
            PositionReference::BestThird { groups } => write!(f, "3{groups}"),
            PositionReference::Match { match_number, outcome } => {
                let prefix = match outcome {
                    Outcome::Winner => 'W',
                    Outcome::Loser => 'L',
                };
                write!(f, "{prefix}{match_number}")
            }
        }
    }
}

impl FromStr for PositionReference {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::InvalidReference(s.to_string());
        let code = s.trim();
        let mut chars = code.chars();
        let head = chars.next().ok_or_else(invalid)?;
        let rest = chars.as_str();

        match head {
            '1' | '2' => {
                let group: GroupLabel = rest.parse().map_err(|_| invalid())?;
                let place = if head == '1' { GroupPlace::Winner } else { GroupPlace::RunnerUp };
                Ok(PositionReference::Group { group, place })
            }
            '3' => {
                if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_uppercase()) {
                    return Err(invalid());
                }
                let groups: GroupSet = rest.parse().map_err(|_| invalid())?;
                Ok(PositionReference::BestThird { groups })
            }
            'W' | 'L' => {
                if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                let match_number: u16 = rest.parse().map_err(|_| invalid())?;
                let outcome = if head == 'W' { Outcome::Winner } else { Outcome::Loser };
                Ok(PositionReference::Match { match_number, outcome })
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for PositionReference {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PositionReference> for String {
    fn from(reference: PositionReference) -> Self {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_code_shape() {
        let d = GroupLabel::new('D').unwrap();
        assert_eq!(
            "2D".parse::<PositionReference>(),
            Ok(PositionReference::Group { group: d, place: GroupPlace::RunnerUp })
        );
        assert_eq!("W93".parse::<PositionReference>(), Ok(PositionReference::winner_of(93)));
        assert_eq!("L101".parse::<PositionReference>(), Ok(PositionReference::loser_of(101)));

        let third: PositionReference = "3ABCDF".parse().unwrap();
        assert_eq!(third.to_string(), "3ABCDF");
        assert_eq!(third.describe(), "3rd Group A/B/C/D/F");
        assert_eq!(third.depends_on(), None);
    }

    #[test]
    fn rejects_malformed_codes() {
        for code in ["", "4A", "1", "1AB", "3", "3A1", "3AAB", "W", "W-1", "L9x", "X12", "W70000"] {
            assert_eq!(
                code.parse::<PositionReference>(),
                Err(ConfigurationError::InvalidReference(code.to_string())),
                "code {code:?}"
            );
        }
    }

    #[test]
    fn serializes_as_code_string() {
        let reference = PositionReference::winner_of(74);
        assert_eq!(serde_json::to_value(reference).unwrap(), serde_json::json!("W74"));
        assert_eq!(reference.describe(), "Winner Match 74");
        assert_eq!(reference.depends_on(), Some(74));
    }
}
