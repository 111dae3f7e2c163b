mod agents;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use klondike_bot::{AutoplaySession, ScoreWeights, StepOutcome};
use klondike_core::model::state::GameState;
use klondike_core::snapshot::StateSnapshot;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event, warn};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{AgentKind, BenchmarkConfig, ResolvedOutputs, ValidationError};
use crate::logging::{TELEMETRY_FILE, telemetry_dir};
use agents::AgentBlueprint;

/// Plays every configured agent on the same sequence of seeded deals.
pub struct BenchRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    weights: ScoreWeights,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub agents: usize,
    pub rows_written: usize,
    pub wins: Vec<(String, usize)>,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl BenchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;
        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
            weights: ScoreWeights::default(),
        })
    }

    /// Execute the benchmark, streaming one JSONL row per agent per game.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = match self.config.deals.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut analytics = AnalyticsCollector::new(&self.config)?;
        let mut rows_written = 0usize;

        for game_index in 0..self.config.deals.games {
            let deal_seed = rng.next_u64();
            let results: Vec<GameResult> = self
                .agents
                .iter()
                .map(|agent| self.play_game(agent, deal_seed))
                .collect();

            analytics.record_game(game_index, &results)?;
            for result in &results {
                let row = GameLogRow::new(&self.config.run_id, game_index, deal_seed, result);
                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;
                rows_written += 1;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| telemetry_dir(&self.outputs).join(TELEMETRY_FILE));

        Ok(RunSummary {
            games_played: self.config.deals.games,
            agents: self.agents.len(),
            rows_written,
            wins: summary
                .agents
                .iter()
                .map(|agent| (agent.name.clone(), agent.wins))
                .collect(),
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn play_game(&self, agent: &AgentBlueprint, deal_seed: u64) -> GameResult {
        let max_moves = self.config.limits.max_moves;
        let policy = agent
            .kind
            .strategy()
            .build(agent.search_for_deal(deal_seed), self.weights);
        let mut session = AutoplaySession::new(GameState::deal_with_seed(deal_seed), policy);

        let mut decisions = 0usize;
        let mut total_ms = 0.0f64;
        let mut move_limit_hit = false;
        let mut outcome = StepOutcome::NoMoves;
        loop {
            if session.moves_played() >= max_moves {
                move_limit_hit = !session.state().is_won();
                if !move_limit_hit {
                    outcome = StepOutcome::Won;
                }
                break;
            }
            let started = Instant::now();
            outcome = session.step();
            let elapsed = started.elapsed();
            if matches!(outcome, StepOutcome::Moved(_)) {
                decisions += 1;
                total_ms += elapsed.as_secs_f64() * 1_000.0;
            }
            if outcome.is_terminal() {
                break;
            }
        }

        if let StepOutcome::Rejected(err) = &outcome {
            warn!(
                target: "klondike_bench::runner",
                agent = agent.name.as_str(),
                deal_seed,
                error = %err,
                "agent stopped on an illegal move"
            );
        }

        let state = session.state();
        let stalled = move_limit_hit || matches!(outcome, StepOutcome::Stuck(_));
        let result = GameResult {
            agent: agent.name.clone(),
            kind: agent.kind,
            outcome: if move_limit_hit {
                "move_limit"
            } else {
                outcome.label()
            },
            cycle: match &outcome {
                StepOutcome::Stuck(kind) => Some(kind.as_str()),
                _ => None,
            },
            won: state.is_won(),
            moves: session.moves_played(),
            foundation_cards: state.foundation_total(),
            hidden_remaining: state.hidden_count(),
            move_limit_hit,
            decisions,
            total_ms,
            final_position: stalled.then(|| StateSnapshot::capture(state)),
        };

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "klondike_bench::runner",
                Level::INFO,
                agent = result.agent.as_str(),
                deal_seed,
                outcome = result.outcome,
                moves = result.moves,
                foundation = result.foundation_cards,
                hidden = result.hidden_remaining,
            );
        }
        result
    }
}

/// One agent's finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameResult {
    pub agent: String,
    pub kind: AgentKind,
    pub outcome: &'static str,
    pub cycle: Option<&'static str>,
    pub won: bool,
    pub moves: usize,
    pub foundation_cards: usize,
    pub hidden_remaining: usize,
    pub move_limit_hit: bool,
    /// Applied moves; the timing below covers only these.
    pub decisions: usize,
    pub total_ms: f64,
    /// Where a stuck or move-limited game stopped.
    pub final_position: Option<StateSnapshot>,
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: String,
    game_index: usize,
    deal_seed: u64,
    agent: &'a str,
    kind: AgentKind,
    outcome: &'static str,
    cycle: Option<&'static str>,
    won: bool,
    moves: usize,
    foundation_cards: usize,
    hidden_remaining: usize,
    avg_ms_per_move: f64,
    final_position: Option<&'a StateSnapshot>,
}

impl<'a> GameLogRow<'a> {
    fn new(run_id: &'a str, game_index: usize, deal_seed: u64, result: &'a GameResult) -> Self {
        let avg_ms_per_move = if result.decisions == 0 {
            0.0
        } else {
            result.total_ms / result.decisions as f64
        };
        Self {
            run_id,
            game_id: format!("G{game_index:05}"),
            game_index,
            deal_seed,
            agent: &result.agent,
            kind: result.kind,
            outcome: result.outcome,
            cycle: result.cycle,
            won: result.won,
            moves: result.moves,
            foundation_cards: result.foundation_cards,
            hidden_remaining: result.hidden_remaining,
            avg_ms_per_move,
            final_position: result.final_position.as_ref(),
        }
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize game row: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("agent configuration rejected: {0}")]
    Agent(#[from] ValidationError),
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}
