pub mod match_result;
pub mod standing;
pub mod team;

pub use match_result::{MatchResult, MatchStatus, Side};
pub use standing::{GroupStanding, ThirdPlaceEntry};
pub use team::{Confederation, GroupLabel, GroupSet, Team, TeamId};
