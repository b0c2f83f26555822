//! Data shipped with the crate.

pub mod bracket;

pub use bracket::{official_bracket, WORLD_CUP_2026_YAML};

use crate::error::Result;
use crate::store::TournamentData;

/// 48-team draw, 12 groups of 4, no results yet.
pub const SAMPLE_DRAW_JSON: &str = include_str!("../../../../data/tournament/sample_draw.json");

pub fn sample_draw() -> Result<TournamentData> {
    TournamentData::from_json(SAMPLE_DRAW_JSON)
}
