use super::SearchOutcome;
use crate::bot::{ScoreWeights, SearchConfig};
use crate::heuristic::score_with;
use klondike_core::canon::{CanonicalKey, canonical_key};
use klondike_core::model::state::GameState;
use klondike_core::moves::Move;
use klondike_core::rules::{apply, legal_moves};
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use tracing::{Level, event};

struct Frontier {
    state: GameState,
    depth: usize,
    first: Move,
}

/// Breadth-first search that never revisits a canonical state.
pub struct GraphSearch<'a> {
    config: &'a SearchConfig,
    weights: &'a ScoreWeights,
}

impl<'a> GraphSearch<'a> {
    pub fn new(config: &'a SearchConfig, weights: &'a ScoreWeights) -> Self {
        Self { config, weights }
    }

    /// Scores every state reachable in `1..=max_depth` moves and returns the
    /// first move of the best one. `visited` is never unmarked; states it
    /// already holds are skipped.
    pub fn run(
        &self,
        state: &GameState,
        max_depth: usize,
        visited: &mut HashSet<CanonicalKey>,
    ) -> SearchOutcome {
        let mut expansions = 0usize;
        let mut best: Option<Move> = None;
        let mut best_score = f64::NEG_INFINITY;
        if max_depth == 0 {
            return SearchOutcome::none(expansions);
        }

        visited.insert(canonical_key(state));
        let mut queue: VecDeque<Frontier> = VecDeque::new();
        expansions += 1;
        for mv in legal_moves(state) {
            let child = apply(state, mv);
            self.discover(child, 1, mv, visited, &mut queue, &mut best, &mut best_score);
        }

        while let Some(node) = queue.pop_front() {
            if node.depth >= max_depth {
                continue;
            }
            if self
                .config
                .node_budget
                .is_some_and(|budget| expansions >= budget)
            {
                break;
            }
            expansions += 1;
            for mv in legal_moves(&node.state) {
                let child = apply(&node.state, mv);
                self.discover(
                    child,
                    node.depth + 1,
                    node.first,
                    visited,
                    &mut queue,
                    &mut best,
                    &mut best_score,
                );
            }
        }

        SearchOutcome {
            best,
            score: best_score,
            expansions,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn discover(
        &self,
        child: GameState,
        depth: usize,
        first: Move,
        visited: &mut HashSet<CanonicalKey>,
        queue: &mut VecDeque<Frontier>,
        best: &mut Option<Move>,
        best_score: &mut f64,
    ) {
        if !visited.insert(canonical_key(&child)) {
            return;
        }
        let value = score_with(&child, self.weights);
        if value > *best_score {
            *best_score = value;
            *best = Some(first);
        }
        queue.push_back(Frontier {
            state: child,
            depth,
            first,
        });
    }
}

/// Recommends the first move toward the best-scoring state reachable in
/// 1..=`max_depth` moves; the root itself is never scored.
pub fn best_move_by_graph(state: &GameState, max_depth: usize) -> Option<Move> {
    let mut visited = HashSet::new();
    best_move_by_graph_with(state, max_depth, &mut visited)
}

/// As [`best_move_by_graph`], with a caller-owned visited set.
pub fn best_move_by_graph_with(
    state: &GameState,
    max_depth: usize,
    visited: &mut HashSet<CanonicalKey>,
) -> Option<Move> {
    let config = SearchConfig::from_env().with_graph_depth(max_depth);
    let weights = ScoreWeights::default();
    let started = Instant::now();
    let outcome = GraphSearch::new(&config, &weights).run(state, max_depth, visited);
    log_graph_decision(&outcome, visited.len(), max_depth, started.elapsed());
    outcome.best
}

pub(crate) fn log_graph_decision(
    outcome: &SearchOutcome,
    visited: usize,
    max_depth: usize,
    elapsed: Duration,
) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    let chosen = outcome
        .best
        .map(|mv| mv.describe())
        .unwrap_or_else(|| "none".to_string());

    event!(
        target: "klondike_bot::graph",
        Level::INFO,
        max_depth,
        chosen = %chosen,
        score = outcome.score,
        expansions = outcome.expansions,
        visited,
        elapsed_ms = elapsed.as_secs_f64() * 1_000.0,
    );
}
