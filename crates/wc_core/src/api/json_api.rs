//! JSON boundary for the UI layer.
//!
//! One request carries the tournament data, an optional config and an
//! optional persisted [`FrozenAssignment`], plus the query to answer. The
//! response status is `ok`, `pending` (a bracket position that cannot be
//! resolved yet) or `error` with `kind` set to `configuration` or `input`.
//!
//! Knockout queries without a frozen assignment see a provisional bracket:
//! positions resolve, fixtures cannot be prepared.

use crate::config::EngineConfig;
use crate::data::official_bracket;
use crate::engine::TournamentEngine;
use crate::error::Result;
use crate::knockout::{
    AssignmentDrift, FrozenAssignment, KnockoutStage, NewFixture, PositionReference, Resolution,
    ResolvedFixture, Round, SlotAssignment,
};
use crate::models::{GroupLabel, Team};
use crate::standings::{GroupTable, ThirdPlacePool};
use crate::store::TournamentData;
use crate::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TournamentRequest {
    pub schema_version: u8,
    pub tournament: TournamentData,
    #[serde(default)]
    pub config: Option<EngineConfig>,
    /// Assignment frozen when the knockout stage was entered. Knockout
    /// queries without it use a provisional assignment.
    #[serde(default)]
    pub frozen_assignment: Option<FrozenAssignment>,
    pub query: TournamentQuery,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum TournamentQuery {
    GroupStandings { group: GroupLabel },
    AllGroupStandings,
    ThirdPlacePool,
    SlotAssignment,
    /// Freeze the assignment once the group stage is complete, or report
    /// drift against the one supplied.
    EnterKnockoutStage,
    BracketPosition { reference: PositionReference },
    Fixture { match_number: u16 },
    Round { round: Round },
    PrepareFixture { match_number: u16 },
}

#[derive(Debug, Serialize)]
pub struct TournamentResponse {
    pub schema_version: u8,
    #[serde(flatten)]
    pub outcome: QueryOutcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Ok { data: QueryData },
    Pending { reference: PositionReference, description: String },
    Error { kind: &'static str, message: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum QueryData {
    GroupStandings { table: GroupTable },
    AllGroupStandings { tables: Vec<GroupTable> },
    ThirdPlacePool { pool: ThirdPlacePool },
    SlotAssignment { assignment: SlotAssignment },
    KnockoutStage { frozen_assignment: FrozenAssignment, drift: Option<AssignmentDrift> },
    BracketPosition { reference: PositionReference, team: Team },
    Fixture { fixture: ResolvedFixture },
    Round { round: Round, fixtures: Vec<ResolvedFixture> },
    PrepareFixture { fixture: NewFixture },
}

/// Answer one JSON query. `Err` only for requests that cannot be read at all.
pub fn tournament_query_json(request_json: &str) -> std::result::Result<String, String> {
    let request: TournamentRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    if request.schema_version != SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", request.schema_version));
    }

    let outcome = answer(&request).unwrap_or_else(|err| {
        tracing::debug!(error = %err, kind = err.kind(), "tournament query failed");
        QueryOutcome::Error { kind: err.kind(), message: err.to_string() }
    });
    let response = TournamentResponse { schema_version: SCHEMA_VERSION, outcome };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize response: {}", e))
}

fn answer(request: &TournamentRequest) -> Result<QueryOutcome> {
    request.tournament.validate()?;
    let config = request.config.clone().unwrap_or_default();
    let engine = TournamentEngine::new(&request.tournament, official_bracket()?, config)?;

    let data = match &request.query {
        TournamentQuery::GroupStandings { group } => {
            QueryData::GroupStandings { table: engine.compute_group_standings(*group)? }
        }
        TournamentQuery::AllGroupStandings => {
            QueryData::AllGroupStandings { tables: engine.compute_all_groups()? }
        }
        TournamentQuery::ThirdPlacePool => {
            QueryData::ThirdPlacePool { pool: engine.compute_third_place_pool()? }
        }
        TournamentQuery::SlotAssignment => {
            QueryData::SlotAssignment { assignment: engine.resolve_slot_assignment()? }
        }
        TournamentQuery::EnterKnockoutStage => {
            let (stage, drift) = match &request.frozen_assignment {
                Some(frozen) => {
                    let stage = engine.restore_knockout_stage(frozen.clone())?;
                    let drift = stage.drift()?;
                    (stage, drift)
                }
                None => (engine.enter_knockout_stage()?, None),
            };
            QueryData::KnockoutStage { frozen_assignment: stage.frozen().clone(), drift }
        }
        TournamentQuery::BracketPosition { reference } => {
            let reference = *reference;
            match knockout_stage(&engine, request)?.resolve_bracket_position(&reference)? {
                Resolution::Resolved(team) => QueryData::BracketPosition { reference, team },
                Resolution::Pending => {
                    let description = reference.describe();
                    return Ok(QueryOutcome::Pending { reference, description });
                }
            }
        }
        TournamentQuery::Fixture { match_number } => {
            let fixture = knockout_stage(&engine, request)?.resolve_fixture(*match_number)?;
            QueryData::Fixture { fixture }
        }
        TournamentQuery::Round { round } => {
            let fixtures = knockout_stage(&engine, request)?.round_fixtures(*round)?;
            QueryData::Round { round: *round, fixtures }
        }
        TournamentQuery::PrepareFixture { match_number } => {
            let fixture = knockout_stage(&engine, request)?.prepare_fixture(*match_number)?;
            QueryData::PrepareFixture { fixture }
        }
    };
    Ok(QueryOutcome::Ok { data })
}

/// Frozen stage when the request carries an assignment, otherwise a preview.
fn knockout_stage<'a>(
    engine: &TournamentEngine<'a>,
    request: &TournamentRequest,
) -> Result<KnockoutStage<'a>> {
    match &request.frozen_assignment {
        Some(frozen) => engine.restore_knockout_stage(frozen.clone()),
        None => engine.preview_knockout_stage(),
    }
}
