use super::{Policy, PolicyContext};
use crate::bot::{ScoreWeights, SearchConfig};
use crate::search::{
    GraphSearch, SearchContext, SearchOutcome, TreeSearch, greedy_move, search_rng,
};
use klondike_core::moves::Move;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::time::Instant;

/// Adapter over [`greedy_move`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> Option<Move> {
        greedy_move(ctx.state)
    }
}

/// Tree search fed with the live history; owns its tie-break RNG so repeated
/// calls on a stuck position can vary.
pub struct TreePolicy {
    config: SearchConfig,
    weights: ScoreWeights,
    rng: StdRng,
    last: Option<SearchOutcome>,
}

impl TreePolicy {
    pub fn new(config: SearchConfig, weights: ScoreWeights) -> Self {
        let rng = search_rng(&config);
        Self {
            config,
            weights,
            rng,
            last: None,
        }
    }

    pub fn last_outcome(&self) -> Option<&SearchOutcome> {
        self.last.as_ref()
    }
}

impl Policy for TreePolicy {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> Option<Move> {
        let mut search_ctx = SearchContext::new(self.config.memo);
        let recent = (!ctx.history.is_empty()).then_some(ctx.history);
        let started = Instant::now();
        let outcome = TreeSearch::new(&self.config, &self.weights).search(
            ctx.state,
            self.config.tree_depth,
            recent,
            &mut search_ctx,
            &mut self.rng,
        );
        crate::search::log_tree_decision(
            &outcome,
            &search_ctx,
            self.config.tree_depth,
            started.elapsed(),
        );
        self.last = Some(outcome);
        outcome.best
    }
}

/// Breadth-first search with a fresh visited set per decision.
pub struct GraphPolicy {
    config: SearchConfig,
    weights: ScoreWeights,
    last: Option<SearchOutcome>,
}

impl GraphPolicy {
    pub fn new(config: SearchConfig, weights: ScoreWeights) -> Self {
        Self {
            config,
            weights,
            last: None,
        }
    }

    pub fn last_outcome(&self) -> Option<&SearchOutcome> {
        self.last.as_ref()
    }
}

impl Policy for GraphPolicy {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn choose(&mut self, ctx: &PolicyContext) -> Option<Move> {
        let mut visited = HashSet::new();
        let started = Instant::now();
        let outcome = GraphSearch::new(&self.config, &self.weights).run(
            ctx.state,
            self.config.graph_depth,
            &mut visited,
        );
        crate::search::log_graph_decision(
            &outcome,
            visited.len(),
            self.config.graph_depth,
            started.elapsed(),
        );
        self.last = Some(outcome);
        outcome.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_core::model::state::GameState;
    use klondike_core::rules::legal_moves;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
        }
    }

    #[test]
    fn every_policy_returns_a_legal_move_on_a_fresh_deal() {
        let state = GameState::deal_with_seed(55);
        let legal = legal_moves(&state);
        let config = SearchConfig::default()
            .with_tree_depth(3)
            .with_graph_depth(2)
            .with_seed(1);
        let mut policies: Vec<Box<dyn Policy>> = vec![
            Box::new(GreedyPolicy),
            Box::new(TreePolicy::new(config.clone(), ScoreWeights::default())),
            Box::new(GraphPolicy::new(config, ScoreWeights::default())),
        ];
        for policy in policies.iter_mut() {
            let ctx = PolicyContext {
                state: &state,
                history: &[],
            };
            let chosen = policy.choose(&ctx);
            assert!(
                chosen.is_some_and(|mv| legal.contains(&mv)),
                "{} chose {chosen:?}",
                policy.name()
            );
        }
    }

    #[test]
    fn tree_policy_records_search_statistics() {
        let state = GameState::deal_with_seed(56);
        let config = SearchConfig::default().with_tree_depth(2).with_seed(3);
        let mut policy = TreePolicy::new(config, ScoreWeights::default());
        let ctx = PolicyContext {
            state: &state,
            history: &[],
        };
        policy.choose(&ctx);
        assert!(policy.last_outcome().is_some_and(|outcome| outcome.expansions >= 1));
    }

    #[test]
    fn search_decisions_log_their_latency() {
        let state = GameState::deal_with_seed(57);
        let config = SearchConfig::default()
            .with_tree_depth(2)
            .with_graph_depth(2)
            .with_seed(4);
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(log.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let ctx = PolicyContext {
                state: &state,
                history: &[],
            };
            TreePolicy::new(config.clone(), ScoreWeights::default()).choose(&ctx);
            GraphPolicy::new(config, ScoreWeights::default()).choose(&ctx);
        });

        let text = log.text();
        let decisions: Vec<&str> = text
            .lines()
            .filter(|line| {
                line.contains("klondike_bot::tree:") || line.contains("klondike_bot::graph:")
            })
            .collect();
        assert_eq!(decisions.len(), 2, "{text}");
        assert!(decisions.iter().all(|line| line.contains("elapsed_ms=")), "{text}");
    }
}
