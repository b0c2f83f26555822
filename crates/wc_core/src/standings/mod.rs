//! Group standings: per-team statistics, group tables and the cross-group
//! third-place ranking. Everything here is recomputed from the match set on
//! every call.

pub mod calculator;
pub mod ranking;
pub mod third_place;


pub use calculator::StandingsCalculator;
pub use ranking::{compare_standings, GroupRanker, GroupTable};
pub use third_place::{ThirdPlacePool, ThirdPlaceRanker};
