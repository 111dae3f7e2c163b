use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{Binomial, ContinuousCDF, DiscreteCDF, Normal};
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};
use crate::runner::GameResult;

const CONFIDENCE_LEVEL: f64 = 0.95;
const FALLBACK_Z: f64 = 1.96;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in benchmark results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("baseline '{0}' missing for game {1}")]
    MissingBaselineGame(String, usize),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Accumulates per-agent results game by game.
pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    comparisons: HashMap<String, Vec<f64>>,
    agent_order: Vec<String>,
    latency_budget_ms: u64,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline_name(&config.agents)
            .map(str::to_string)
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.kind),
            );
            order.push(agent.name.clone());
        }

        Ok(Self {
            baseline,
            agents,
            comparisons: HashMap::new(),
            agent_order: order,
            latency_budget_ms: config.metrics.latency_budget_ms,
        })
    }

    /// Records every agent's result on one deal.
    pub fn record_game(
        &mut self,
        game_index: usize,
        results: &[GameResult],
    ) -> Result<(), AnalyticsError> {
        let baseline_cards = results
            .iter()
            .find(|result| result.agent == self.baseline)
            .map(|result| result.foundation_cards as f64)
            .ok_or_else(|| AnalyticsError::MissingBaselineGame(self.baseline.clone(), game_index))?;

        for result in results {
            let acc = self
                .agents
                .get_mut(&result.agent)
                .ok_or_else(|| AnalyticsError::UnknownAgent(result.agent.clone()))?;
            acc.record(result);

            if result.agent != self.baseline {
                self.comparisons
                    .entry(result.agent.clone())
                    .or_default()
                    .push(result.foundation_cards as f64 - baseline_cards);
            }
        }
        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let z = z_score(CONFIDENCE_LEVEL);
        let mut agents = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                agents.push(acc.into_report(z, self.latency_budget_ms));
            }
        }

        let baseline_avg = agents
            .iter()
            .find(|agent| agent.name == self.baseline)
            .map(|agent| agent.avg_foundation)
            .unwrap_or(0.0);
        for agent in &mut agents {
            agent.delta_vs_baseline = agent.avg_foundation - baseline_avg;
        }

        let comparisons = agents
            .iter()
            .map(|agent| {
                let diffs = self.comparisons.remove(&agent.name).unwrap_or_default();
                let (p_value, sample_size) = sign_test(&diffs);
                ComparisonReport {
                    agent: agent.name.clone(),
                    p_value,
                    sample_size,
                }
            })
            .collect();

        AnalyticsSummary {
            baseline: self.baseline,
            agents,
            comparisons,
            latency_budget_ms: self.latency_budget_ms,
        }
    }
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    games: usize,
    wins: usize,
    stuck: usize,
    move_limit: usize,
    per_game_foundation: Vec<f64>,
    total_moves: usize,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind) -> Self {
        Self {
            name,
            kind,
            games: 0,
            wins: 0,
            stuck: 0,
            move_limit: 0,
            per_game_foundation: Vec::new(),
            total_moves: 0,
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn record(&mut self, result: &GameResult) {
        self.games += 1;
        if result.won {
            self.wins += 1;
        }
        if result.cycle.is_some() {
            self.stuck += 1;
        }
        if result.move_limit_hit {
            self.move_limit += 1;
        }
        self.per_game_foundation.push(result.foundation_cards as f64);
        self.total_moves += result.moves;
        self.total_latency_ms += result.total_ms;
        self.total_decisions += result.decisions as u64;
    }

    fn into_report(self, z: f64, latency_budget_ms: u64) -> AgentReport {
        let avg_foundation = mean(&self.per_game_foundation);
        let avg_moves = if self.games == 0 {
            0.0
        } else {
            self.total_moves as f64 / self.games as f64
        };
        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            name: self.name,
            kind: self.kind,
            games: self.games,
            wins: self.wins,
            win_ci95: wilson_interval(self.wins, self.games, z),
            stuck: self.stuck,
            move_limit: self.move_limit,
            avg_foundation,
            foundation_ci95: confidence_interval(&self.per_game_foundation, z),
            avg_moves,
            average_ms_per_decision: avg_latency,
            delta_vs_baseline: 0.0,
            over_budget: avg_latency > latency_budget_ms as f64,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
    pub latency_budget_ms: u64,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Autoplay Benchmark Summary\n\n");
        rows.push_str(&format!(
            "Baseline: `{}`. Latency budget: {} ms average per decision.\n\n",
            self.baseline, self.latency_budget_ms
        ));
        rows.push_str("| Agent | Kind | Games | Win % | Win 95% CI | Avg foundation | Δ vs baseline | Foundation 95% CI | Stuck | Move limit | Avg moves | Avg ms/decision | Over Budget | p-value |\n");
        rows.push_str("|-------|------|-------|-------|------------|----------------|---------------|-------------------|-------|------------|-----------|-----------------|-------------|---------|\n");

        for agent in &self.agents {
            let p_value = self
                .comparisons
                .iter()
                .find(|c| c.agent == agent.name)
                .map(|c| c.p_value)
                .unwrap_or(1.0);

            rows.push_str(&format!(
                "| {name} | {kind:?} | {games} | {win:.1}% | [{win_low:.1}%, {win_high:.1}%] | {avg:.2} | {delta:+.2} | [{ci_low:.2}, {ci_high:.2}] | {stuck} | {limit} | {moves:.1} | {latency:.2} | {over_budget} | {p_value:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                games = agent.games,
                win = agent.win_rate() * 100.0,
                win_low = agent.win_ci95.0 * 100.0,
                win_high = agent.win_ci95.1 * 100.0,
                avg = agent.avg_foundation,
                delta = agent.delta_vs_baseline,
                ci_low = agent.foundation_ci95.0,
                ci_high = agent.foundation_ci95.1,
                stuck = agent.stuck,
                limit = agent.move_limit,
                moves = agent.avg_moves,
                latency = agent.average_ms_per_decision,
                over_budget = if agent.over_budget { "Yes" } else { "No" },
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub games: usize,
    pub wins: usize,
    pub win_ci95: (f64, f64),
    pub stuck: usize,
    pub move_limit: usize,
    pub avg_foundation: f64,
    pub foundation_ci95: (f64, f64),
    pub avg_moves: f64,
    pub average_ms_per_decision: f64,
    pub delta_vs_baseline: f64,
    pub over_budget: bool,
}

impl AgentReport {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

/// Paired comparison of foundation cards against the baseline.
#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    /// Games where the two agents finished with different foundation counts.
    pub sample_size: usize,
}

/// Two-sided quantile of the standard normal for `level`.
fn z_score(level: f64) -> f64 {
    Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(0.5 + level / 2.0))
        .unwrap_or(FALLBACK_Z)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn confidence_interval(points: &[f64], z: f64) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = mean(points);
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = z * std_error;
    (mean - margin, mean + margin)
}

/// Wilson score interval; stays inside [0, 1] even at 0 or 100% wins.
fn wilson_interval(successes: usize, trials: usize, z: f64) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 0.0);
    }
    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    ((center - margin).max(0.0), (center + margin).min(1.0))
}

/// Exact two-sided sign test on paired differences; zero differences are dropped.
fn sign_test(diffs: &[f64]) -> (f64, usize) {
    let positive = diffs.iter().filter(|d| **d > 0.0).count() as u64;
    let negative = diffs.iter().filter(|d| **d < 0.0).count() as u64;
    let n = positive + negative;
    if n == 0 {
        return (1.0, 0);
    }
    let Ok(binomial) = Binomial::new(0.5, n) else {
        return (1.0, n as usize);
    };
    let tail = binomial.cdf(positive.min(negative));
    ((2.0 * tail).min(1.0), n as usize)
}
