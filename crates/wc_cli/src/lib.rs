//! File loading and plain-text reports for the `wc` command.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use wc_core::config::{load_config_file, EngineConfig};
use wc_core::data::sample_draw;
use wc_core::knockout::{
    FrozenAssignment, KnockoutStage, NewFixture, NodeState, Resolution, ResolvedFixture,
};
use wc_core::models::MatchResult;
use wc_core::standings::{GroupTable, ThirdPlacePool};
use wc_core::{ResultStore, SlotAssignment, TournamentData, TournamentEngine};

/// Tournament JSON from `path`, or the built-in sample draw.
pub fn load_tournament(path: Option<&Path>) -> Result<TournamentData> {
    let Some(path) = path else {
        return sample_draw().context("Built-in sample draw is invalid");
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read tournament file: {}", path.display()))?;
    TournamentData::from_json(&content)
        .with_context(|| format!("Invalid tournament file: {}", path.display()))
}

/// Config from `path`, else from `WC_ENGINE_CONFIG_PATH`, else the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load engine config: {}", path.display())),
        None => {
            EngineConfig::from_env().context("Failed to load engine config from the environment")
        }
    }
}

pub fn load_frozen(path: &Path) -> Result<FrozenAssignment> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read frozen assignment: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid frozen assignment: {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Restore the knockout stage from a saved assignment, or preview it
/// without freezing anything.
pub fn knockout_stage<'a>(
    engine: &TournamentEngine<'a>,
    frozen: Option<FrozenAssignment>,
) -> Result<KnockoutStage<'a>> {
    let stage = match frozen {
        Some(frozen) => engine.restore_knockout_stage(frozen)?,
        None => engine.preview_knockout_stage()?,
    };
    Ok(stage)
}

/// Summary written next to a simulated tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub seed: u64,
    pub matches_played: usize,
    pub fingerprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion: Option<String>,
    pub created_at: String,
}

pub fn report_header(title: &str, fingerprint: &str, generated_at: DateTime<Utc>) -> String {
    let short = fingerprint.get(..12).unwrap_or(fingerprint);
    format!("{title}\nGenerated {} | snapshot {short}\n", generated_at.to_rfc3339())
}

fn block(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

pub fn render_group_table(table: &GroupTable) -> String {
    let mut lines = vec![
        format!("Group {}", table.group),
        format!(
            "{:>3}  {:<22}{:>3}{:>3}{:>3}{:>3}{:>4}{:>4}{:>5}{:>5}",
            "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
        ),
    ];
    lines.extend(table.rows.iter().enumerate().map(|(index, row)| match row {
        Some(s) => format!(
            "{:>3}  {:<22}{:>3}{:>3}{:>3}{:>3}{:>4}{:>4}{:>+5}{:>5}",
            index + 1,
            s.team_name,
            s.played,
            s.won,
            s.drawn,
            s.lost,
            s.goals_for,
            s.goals_against,
            s.goal_difference,
            s.points
        ),
        None => format!("{:>3}  -", index + 1),
    }));
    block(lines)
}

pub fn render_third_place_pool(pool: &ThirdPlacePool) -> String {
    let mut lines = vec![
        "Third-placed teams".to_string(),
        format!(
            "{:>3}  {:<4}{:<22}{:>3}{:>5}{:>4}{:>5}",
            "#", "Grp", "Team", "P", "GD", "GF", "Pts"
        ),
    ];
    lines.extend(pool.entries.iter().map(|entry| {
        let s = &entry.standing;
        let mark = if entry.qualified { "  Q" } else { "" };
        format!(
            "{:>3}  {:<4}{:<22}{:>3}{:>+5}{:>4}{:>5}{mark}",
            entry.pool_rank,
            s.group.to_string(),
            s.team_name,
            s.played,
            s.goal_difference,
            s.goals_for,
            s.points
        )
    }));
    lines.push(format!("Qualifying groups: {}", pool.qualifying_groups()));
    block(lines)
}

pub fn render_assignment(assignment: &SlotAssignment, store: &dyn ResultStore) -> String {
    let mut lines = vec!["Third-place slots".to_string()];
    lines.extend(assignment.picks().iter().map(|pick| {
        let name = store.team(pick.team_id).map_or("unknown team", |team| team.name.as_str());
        format!("  Match {:>3}: 3{} {name}", pick.slot, pick.group)
    }));
    block(lines)
}

fn side_label(resolution: &Resolution) -> &str {
    match resolution {
        Resolution::Resolved(team) => &team.name,
        Resolution::Pending => "TBD",
    }
}

fn score_label(result: &MatchResult) -> String {
    let score = format!("{}-{}", result.home_score, result.away_score);
    match (result.home_penalties, result.away_penalties) {
        (Some(home), Some(away)) => format!("{score} ({home}-{away} pens)"),
        _ => score,
    }
}

pub fn render_fixture(fixture: &ResolvedFixture) -> String {
    let home = format!("{} ({})", side_label(&fixture.home), fixture.home_reference);
    let away = format!("{} ({})", side_label(&fixture.away), fixture.away_reference);
    let status = match (&fixture.state, &fixture.result) {
        (NodeState::Completed, Some(result)) => score_label(result),
        (_, Some(_)) => "scheduled".to_string(),
        (NodeState::TeamsKnown, None) => "ready".to_string(),
        _ => "waiting".to_string(),
    };
    format!(
        "M{:<4}{:<16}{home:<32} v  {away:<32} {status}",
        fixture.match_number,
        fixture.round.label()
    )
}

pub fn render_new_fixture(fixture: &NewFixture) -> String {
    format!(
        "Match {} ({}) can be created: {} v {}",
        fixture.match_number,
        fixture.round.label(),
        fixture.home.name,
        fixture.away.name
    )
}
