//! `wc`: standings, third-place pool and knockout bracket from a tournament file.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wc_cli::{
    knockout_stage, load_config, load_frozen, load_tournament, render_assignment, render_fixture,
    render_group_table, render_new_fixture, render_third_place_pool, report_header, write_json,
    SimulationMetadata,
};
use wc_core::data::official_bracket;
use wc_core::knockout::{PositionReference, Resolution, Round};
use wc_core::models::GroupLabel;
use wc_core::simulate::TournamentSimulator;
use wc_core::{tournament_query_json, TournamentEngine};

#[derive(Parser)]
#[command(name = "wc", version)]
#[command(about = "World Cup group standings and knockout bracket resolution", long_about = None)]
struct Cli {
    /// Tournament JSON with teams and matches (defaults to the built-in sample draw)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Engine config JSON (falls back to WC_ENGINE_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Third-place assignment saved by `enter`
    #[arg(long, global = true)]
    frozen: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group tables
    Standings {
        /// Single group letter
        #[arg(long)]
        group: Option<GroupLabel>,
    },

    /// Cross-group ranking of third-placed teams
    Thirds,

    /// Assignment of the best thirds to round-of-32 slots
    Slots,

    /// Freeze the third-place assignment for the knockout stage
    Enter {
        /// Where to save the frozen assignment
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Knockout fixtures, all rounds or one
    Bracket {
        /// e.g. round_of_32, quarter_final, final
        #[arg(long)]
        round: Option<Round>,
    },

    /// One knockout fixture
    Fixture {
        match_number: u16,

        /// Check that the fixture can be created now
        #[arg(long, default_value = "false")]
        prepare: bool,
    },

    /// Resolve a position code such as 1A, 3ABCDF or W89
    Position { reference: PositionReference },

    /// Play the remaining matches with seeded random results
    Simulate {
        #[arg(long, default_value_t = 2026)]
        seed: u64,

        /// Output tournament JSON
        #[arg(long)]
        out: PathBuf,

        /// Stop after the group stage
        #[arg(long, default_value = "false")]
        groups_only: bool,

        /// Mean goals per team per match
        #[arg(long)]
        goal_rate: Option<f64>,

        /// Output frozen assignment JSON
        #[arg(long)]
        frozen_out: Option<PathBuf>,

        /// Output metadata JSON
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Answer a JSON API request file
    Query { request: PathBuf },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Query { request } = &cli.command {
        let json = std::fs::read_to_string(request)
            .with_context(|| format!("Failed to read request: {}", request.display()))?;
        let response = tournament_query_json(&json).map_err(anyhow::Error::msg)?;
        println!("{response}");
        return Ok(());
    }

    let mut data = load_tournament(cli.data.as_deref())?;
    let config = load_config(cli.config.as_deref())?;
    let frozen = cli.frozen.as_deref().map(load_frozen).transpose()?;
    let bracket = official_bracket()?;
    tracing::debug!(teams = data.teams.len(), matches = data.matches.len(), "tournament loaded");

    if let Commands::Simulate { seed, out, groups_only, goal_rate, frozen_out, metadata } =
        &cli.command
    {
        let mut simulator = TournamentSimulator::new(*seed);
        if let Some(rate) = goal_rate {
            simulator = simulator.with_goal_rate(*rate)?;
        }
        let before = data.matches.len();
        simulator.play_group_stage(&mut data);
        let frozen = if *groups_only {
            None
        } else {
            Some(simulator.play_knockout(&mut data, bracket, &config)?)
        };
        write_json(out, &data)?;
        if let (Some(path), Some(frozen)) = (frozen_out, &frozen) {
            write_json(path, frozen)?;
        }

        let engine = TournamentEngine::new(&data, bracket, config)?;
        let final_match = bracket.round(Round::Final).next().map(|node| node.match_number);
        let champion = match (&frozen, final_match) {
            (Some(frozen), Some(final_match)) => knockout_stage(&engine, Some(frozen.clone()))?
                .resolve_bracket_position(&PositionReference::winner_of(final_match))?
                .team()
                .map(|team| team.name.clone()),
            _ => None,
        };
        let meta = SimulationMetadata {
            seed: *seed,
            matches_played: data.matches.len().saturating_sub(before),
            fingerprint: engine.snapshot()?.fingerprint()?,
            champion,
            created_at: Utc::now().to_rfc3339(),
        };

        println!("Simulated tournament saved to: {}", out.display());
        println!("   Seed:        {}", meta.seed);
        println!("   Matches:     {}", meta.matches_played);
        if let Some(champion) = &meta.champion {
            println!("   Champion:    {champion}");
        }
        println!("   Fingerprint: {}", meta.fingerprint);
        println!("   Created:     {}", meta.created_at);
        if let Some(path) = metadata {
            write_json(path, &meta)?;
        }
        return Ok(());
    }

    let engine = TournamentEngine::new(&data, bracket, config)?;
    let fingerprint = engine.snapshot()?.fingerprint()?;

    match cli.command {
        Commands::Standings { group } => {
            let tables = match group {
                Some(group) => vec![engine.compute_group_standings(group)?],
                None => engine.compute_all_groups()?,
            };
            if cli.json {
                return print_json(&tables);
            }
            print!("{}", report_header("Group standings", &fingerprint, Utc::now()));
            for table in &tables {
                println!("\n{}", render_group_table(table));
            }
        }

        Commands::Thirds => {
            let pool = engine.compute_third_place_pool()?;
            if cli.json {
                return print_json(&pool);
            }
            print!("{}", report_header("Third-place pool", &fingerprint, Utc::now()));
            println!("\n{}", render_third_place_pool(&pool));
        }

        Commands::Slots => {
            let assignment = match frozen {
                Some(frozen) => knockout_stage(&engine, Some(frozen))?.assignment().clone(),
                None => engine.resolve_slot_assignment()?,
            };
            if cli.json {
                return print_json(&assignment);
            }
            print!("{}", report_header("Slot assignment", &fingerprint, Utc::now()));
            println!("\n{}", render_assignment(&assignment, &data));
        }

        Commands::Enter { out } => {
            let (stage, drift) = match frozen {
                Some(frozen) => {
                    let stage = engine.restore_knockout_stage(frozen)?;
                    let drift = stage.drift()?;
                    (stage, drift)
                }
                None => (engine.enter_knockout_stage()?, None),
            };
            if let Some(path) = &out {
                write_json(path, stage.frozen())?;
            }
            if cli.json {
                return print_json(&serde_json::json!({
                    "frozen_assignment": stage.frozen(),
                    "drift": drift,
                }));
            }
            let groups = stage.frozen().qualifying_groups;
            println!("Knockout stage entered with thirds from groups {groups}");
            if let Some(drift) = drift {
                if drift.current_groups != drift.frozen_groups {
                    println!(
                        "   Current pool qualifies {} instead; {} slot(s) would change",
                        drift.current_groups,
                        drift.changed_slots.len()
                    );
                }
                if !drift.replaced_thirds.is_empty() {
                    println!(
                        "   Slot(s) {:?} now take a different third from the same group",
                        drift.replaced_thirds
                    );
                }
            }
            if let Some(path) = out {
                println!("   Saved to: {}", path.display());
            }
        }

        Commands::Bracket { round } => {
            let stage = knockout_stage(&engine, frozen)?;
            let rounds = match round {
                Some(round) => vec![round],
                None => Round::ALL.to_vec(),
            };
            let mut fixtures = Vec::new();
            for round in rounds {
                fixtures.extend(stage.round_fixtures(round)?);
            }
            if cli.json {
                return print_json(&fixtures);
            }
            print!("{}", report_header("Knockout bracket", &fingerprint, Utc::now()));
            let mut current = None;
            for fixture in &fixtures {
                if current != Some(fixture.round) {
                    current = Some(fixture.round);
                    println!("\n{}", fixture.round);
                }
                println!("{}", render_fixture(fixture));
            }
            let stale = stage.stale_fixtures()?;
            if !stale.is_empty() {
                println!("\nFixtures created with teams the bracket no longer derives: {stale:?}");
            }
        }

        Commands::Fixture { match_number, prepare } => {
            let stage = knockout_stage(&engine, frozen)?;
            if prepare {
                let fixture = stage.prepare_fixture(match_number)?;
                if cli.json {
                    return print_json(&fixture);
                }
                println!("{}", render_new_fixture(&fixture));
            } else {
                let fixture = stage.resolve_fixture(match_number)?;
                if cli.json {
                    return print_json(&fixture);
                }
                println!("{}", render_fixture(&fixture));
            }
        }

        Commands::Position { reference } => {
            let resolution = knockout_stage(&engine, frozen)?.resolve_bracket_position(&reference)?;
            if cli.json {
                return print_json(&resolution);
            }
            match resolution {
                Resolution::Resolved(team) => println!("{}: {}", reference.describe(), team.name),
                Resolution::Pending => println!("{}: not decided yet", reference.describe()),
            }
        }

        Commands::Simulate { .. } | Commands::Query { .. } => {}
    }

    Ok(())
}
