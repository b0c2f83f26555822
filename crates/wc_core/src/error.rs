use crate::models::{GroupLabel, GroupSet, Side, TeamId};
use thiserror::Error;

/// Broken tournament setup: bracket data, slot constraints, engine config,
/// or a third-place pool too small for the constrained slots.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid group label: '{0}'")]
    InvalidGroupLabel(String),

    #[error("Invalid position reference: '{0}'")]
    InvalidReference(String),

    #[error("Bracket definition could not be parsed: {0}")]
    BracketDefinition(String),

    #[error("Duplicate match number {0} in bracket definition")]
    DuplicateMatch(u16),

    #[error("Unknown match number {0}")]
    UnknownMatch(u16),

    #[error("Match {from} references match {referenced}, which is not an earlier fixture")]
    ForwardReference { from: u16, referenced: u16 },

    #[error("Unknown group {0}")]
    UnknownGroup(GroupLabel),

    #[error("Slot {slot} has an empty group constraint")]
    EmptySlotConstraint { slot: u16 },

    #[error("Duplicate slot constraint for slot {0}")]
    DuplicateSlot(u16),

    #[error("No bracket slot takes a third-placed team from groups {0}")]
    UnknownSlot(GroupSet),

    #[error("Third-place pool has {found} teams but {required} constrained slots need filling")]
    InsufficientThirdPlacePool { required: usize, found: usize },

    #[error("No valid third-place assignment exists for qualifying groups {groups}")]
    NoValidAssignment { groups: GroupSet },

    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),
}

/// Bad data or a request the engine refuses before anything is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Malformed tournament data: {0}")]
    MalformedData(String),

    #[error("Duplicate team id {0}")]
    DuplicateTeam(TeamId),

    #[error("Unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("Group {group} draw position {position} is taken by more than one team")]
    DuplicateDrawPosition { group: GroupLabel, position: u8 },

    #[error("Duplicate match number {0}")]
    DuplicateMatch(u16),

    #[error("Match {match_number}: team {team} is not drawn in group {group}")]
    TeamNotInGroup { match_number: u16, team: TeamId, group: GroupLabel },

    #[error("Match {0} pairs a team against itself")]
    SelfMatch(u16),

    #[error("Completed knockout match {0} has no decisive result")]
    UndecidedResult(u16),

    #[error("Match {match_number}: {side} side is not yet determined")]
    UnresolvedParticipant { match_number: u16, side: Side },

    #[error("Knockout match {0} already exists")]
    FixtureExists(u16),

    #[error("Team {team} is assigned to both slot {first} and slot {second}")]
    DuplicateSlotTeam { team: TeamId, first: u16, second: u16 },

    #[error("Slot {0} is assigned more than once")]
    DuplicateSlotPick(u16),

    #[error("Slot {0} is not part of the constraint set")]
    UnknownSlot(u16),

    #[error("Slot {0} has no assigned team")]
    MissingSlot(u16),

    #[error("Team {team} from group {group} cannot fill slot {slot}")]
    SlotGroupMismatch { slot: u16, team: TeamId, group: GroupLabel },

    #[error("Frozen assignment lists groups {listed} but assigns teams from {assigned}")]
    FrozenGroupsMismatch { listed: GroupSet, assigned: GroupSet },

    #[error("Group stage is incomplete: {completed} of {required} matches completed")]
    GroupStageIncomplete { completed: usize, required: usize },

    #[error("Match {0} cannot be created before the knockout stage is entered")]
    ProvisionalBracket(u16),

    #[error("Group-stage match {0} uses the number of a knockout fixture")]
    MatchNumberCollision(u16),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Input(#[from] InputError),
}

impl EngineError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }

    /// Short category name for display layers.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Configuration(_) => "configuration",
            EngineError::Input(_) => "input",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_match_is_a_configuration_error() {
        let err: EngineError = ConfigurationError::UnknownMatch(140).into();
        assert!(err.is_configuration());
        assert_eq!(err.kind(), "configuration");
        assert_eq!(err.to_string(), "Unknown match number 140");
    }

    #[test]
    fn unresolved_participant_is_an_input_error() {
        let err: EngineError =
            InputError::UnresolvedParticipant { match_number: 89, side: Side::Away }.into();
        assert!(!err.is_configuration());
        assert_eq!(err.kind(), "input");
        assert_eq!(err.to_string(), "Match 89: away side is not yet determined");
    }
}
