//! Official knockout bracket, embedded at compile time.

use crate::error::ConfigurationError;
use crate::knockout::BracketDefinition;
use once_cell::sync::Lazy;

/// 2026 bracket YAML (matches 73-104).
pub const WORLD_CUP_2026_YAML: &str = include_str!("../../../../data/bracket/world_cup_2026.yaml");

static WORLD_CUP_2026: Lazy<Result<BracketDefinition, ConfigurationError>> =
    Lazy::new(|| BracketDefinition::from_yaml(WORLD_CUP_2026_YAML));

/// Parsed on first use, then cached.
pub fn official_bracket() -> Result<&'static BracketDefinition, ConfigurationError> {
    WORLD_CUP_2026.as_ref().map_err(Clone::clone)
}
