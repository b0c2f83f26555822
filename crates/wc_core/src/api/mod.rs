pub mod json_api;

pub use json_api::{
    tournament_query_json, QueryData, QueryOutcome, TournamentQuery, TournamentRequest,
    TournamentResponse,
};
