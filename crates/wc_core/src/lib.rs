//! # wc_core - World Cup Standings & Knockout Bracket Engine
//!
//! Deterministic core for a 48-team, 12-group World Cup.
//!
//! ## Features
//! - Group standings recomputed from match results on every query
//! - Cross-group ranking of third-placed teams
//! - Backtracking assignment of the best thirds to constrained bracket slots
//! - Resolution of symbolic bracket positions ("W93", "2D", "3ABCDF") into teams
//! - JSON API for the UI layer and a seeded tournament simulator

pub mod api;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod knockout;
pub mod models;
pub mod simulate;
pub mod standings;
pub mod store;

#[cfg(test)]
mod test_support;

pub use api::tournament_query_json;
pub use config::EngineConfig;
pub use engine::{TournamentEngine, TournamentSnapshot};
pub use error::{ConfigurationError, EngineError, InputError, Result};
pub use knockout::{
    BracketDefinition, FrozenAssignment, KnockoutStage, PositionReference, Resolution, Round,
    SlotAssignment,
};
pub use models::{GroupLabel, GroupStanding, MatchResult, MatchStatus, Team, TeamId};
pub use simulate::TournamentSimulator;
pub use store::{ResultStore, TournamentData};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
