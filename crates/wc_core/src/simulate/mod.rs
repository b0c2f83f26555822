//! Seeded result generation for a simulated tournament.
//!
//! Same seed and same starting data always give the same results.

use crate::config::EngineConfig;
use crate::engine::TournamentEngine;
use crate::error::{ConfigurationError, Result};
use crate::knockout::{BracketDefinition, FrozenAssignment};
use crate::models::MatchResult;
use crate::store::{ResultStore, TournamentData};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Poisson};

/// Mean goals per team per match.
pub const DEFAULT_GOAL_RATE: f64 = 1.35;

const MAX_GOALS: f64 = 9.0;

pub struct TournamentSimulator {
    rng: ChaCha8Rng,
    goal_rate: f64,
}

impl TournamentSimulator {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), goal_rate: DEFAULT_GOAL_RATE }
    }

    pub fn with_goal_rate(
        mut self,
        goal_rate: f64,
    ) -> std::result::Result<Self, ConfigurationError> {
        if !goal_rate.is_finite() || goal_rate <= 0.0 {
            return Err(ConfigurationError::InvalidConfig(format!(
                "goal rate must be positive, got {goal_rate}"
            )));
        }
        self.goal_rate = goal_rate;
        Ok(self)
    }

    fn goals(&mut self) -> u8 {
        match Poisson::new(self.goal_rate) {
            Ok(poisson) => poisson.sample(&mut self.rng).min(MAX_GOALS) as u8,
            Err(_) => 0,
        }
    }

    /// Plays `fixture` to completion. Knockout fixtures level after normal
    /// time go to penalties.
    pub fn play(&mut self, fixture: MatchResult) -> MatchResult {
        let knockout = !fixture.is_group_stage();
        let (home, away) = (self.goals(), self.goals());
        let played = fixture.with_score(home, away);
        if !knockout || home != away {
            return played;
        }

        loop {
            let home_pens: u8 = self.rng.gen_range(2..=5);
            let away_pens: u8 = self.rng.gen_range(2..=5);
            if home_pens != away_pens {
                return played.with_penalties(home_pens, away_pens);
            }
        }
    }

    /// Completes every group's round robin. Pairings without a completed
    /// result are played; missing fixtures are created first. Returns the
    /// number of matches played.
    pub fn play_group_stage(&mut self, data: &mut TournamentData) -> usize {
        let mut played = 0;
        for group in data.groups() {
            let ids: Vec<_> = data.teams_in_group(group).iter().map(|t| t.id).collect();
            for (i, home) in ids.iter().enumerate() {
                for away in &ids[i + 1..] {
                    let existing = data
                        .group_matches(group)
                        .into_iter()
                        .find(|m| m.involves(*home) && m.involves(*away))
                        .cloned();
                    let fixture = match existing {
                        Some(m) if m.is_completed() => continue,
                        Some(m) => m,
                        None => {
                            let number = data.next_free_match_number();
                            MatchResult::group_stage(number, group, *home, *away)
                        }
                    };
                    let result = self.play(fixture);
                    data.record_result(result);
                    played += 1;
                }
            }
        }
        tracing::debug!(played, "group stage simulated");
        played
    }

    /// Enters the knockout stage and plays every fixture in match order.
    /// Returns the assignment that was frozen on entry.
    pub fn play_knockout(
        &mut self,
        data: &mut TournamentData,
        bracket: &BracketDefinition,
        config: &EngineConfig,
    ) -> Result<FrozenAssignment> {
        let frozen = TournamentEngine::new(&*data, bracket, config.clone())?
            .enter_knockout_stage()?
            .frozen()
            .clone();

        for node in bracket.fixtures() {
            let fixture = match data.knockout_match(node.match_number) {
                Some(existing) if existing.is_completed() => continue,
                Some(existing) => existing.clone(),
                None => {
                    let engine = TournamentEngine::new(&*data, bracket, config.clone())?;
                    engine
                        .restore_knockout_stage(frozen.clone())?
                        .prepare_fixture(node.match_number)?
                        .into_result()
                }
            };
            let result = self.play(fixture);
            data.record_result(result);
        }
        tracing::debug!(fixtures = bracket.fixtures().len(), "knockout stage simulated");
        Ok(frozen)
    }
}
