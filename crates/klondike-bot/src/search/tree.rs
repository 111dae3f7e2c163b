use super::{SearchOutcome, filter_recent, move_priority, search_rng};
use crate::bot::{ScoreWeights, SearchConfig, debug_logs_enabled};
use crate::heuristic::score_with;
use klondike_core::canon::{CanonicalKey, canonical_key};
use klondike_core::model::state::GameState;
use klondike_core::moves::Move;
use klondike_core::rules::{apply, legal_moves};
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{Level, event};

/// Mutable bookkeeping for one tree search.
///
/// `path` holds the states on the active recursion path only; each entry is
/// removed when its call returns, so the same state stays reachable through
/// other branches. `memo` caches subtree values for the whole search.
#[derive(Debug, Default)]
pub struct SearchContext {
    pub path: HashSet<CanonicalKey>,
    pub memo: Option<HashMap<(CanonicalKey, usize), f64>>,
    pub expansions: usize,
    pub memo_hits: usize,
}

impl SearchContext {
    pub fn new(memo: bool) -> Self {
        Self {
            memo: memo.then(HashMap::new),
            ..Self::default()
        }
    }
}

/// Depth-limited backtracking search over single-player Klondike.
pub struct TreeSearch<'a> {
    config: &'a SearchConfig,
    weights: &'a ScoreWeights,
}

impl<'a> TreeSearch<'a> {
    pub fn new(config: &'a SearchConfig, weights: &'a ScoreWeights) -> Self {
        Self { config, weights }
    }

    pub fn search<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        depth: usize,
        recent: Option<&[Move]>,
        ctx: &mut SearchContext,
        rng: &mut R,
    ) -> SearchOutcome {
        let before = ctx.expansions;
        if depth == 0 {
            return SearchOutcome {
                best: None,
                score: score_with(state, self.weights),
                expansions: 0,
            };
        }

        let mut moves = legal_moves(state);
        if moves.is_empty() {
            return SearchOutcome {
                best: None,
                score: score_with(state, self.weights),
                expansions: 0,
            };
        }
        ctx.expansions += 1;

        if let Some(recent) = recent {
            moves = filter_recent(moves, recent, &self.config.history);
        }

        let foundation: Vec<Move> = moves
            .iter()
            .copied()
            .filter(Move::is_foundation_move)
            .collect();
        if let Some(&mv) = foundation.choose(rng) {
            return SearchOutcome {
                best: Some(mv),
                score: f64::INFINITY,
                expansions: ctx.expansions - before,
            };
        }

        moves.sort_by_key(|mv| Reverse(move_priority(mv)));
        let key = canonical_key(state);
        ctx.path.insert(key.clone());
        let (score, best) = self.choose(state, &moves, depth, ctx, rng);
        ctx.path.remove(&key);

        SearchOutcome {
            best,
            score,
            expansions: ctx.expansions - before,
        }
    }

    fn value<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        depth: usize,
        ctx: &mut SearchContext,
        rng: &mut R,
    ) -> f64 {
        let key = canonical_key(state);
        if ctx.path.contains(&key) {
            return f64::NEG_INFINITY;
        }
        let exhausted = self
            .config
            .node_budget
            .is_some_and(|budget| ctx.expansions >= budget);
        if depth == 0 || exhausted {
            return score_with(state, self.weights);
        }
        if let Some(cached) = ctx.memo.as_ref().and_then(|memo| memo.get(&(key.clone(), depth))) {
            let cached = *cached;
            ctx.memo_hits += 1;
            return cached;
        }

        let mut moves = legal_moves(state);
        if moves.is_empty() {
            return score_with(state, self.weights);
        }
        ctx.expansions += 1;
        moves.sort_by_key(|mv| Reverse(move_priority(mv)));

        ctx.path.insert(key.clone());
        let (mut best, _) = self.choose(state, &moves, depth, ctx, rng);
        ctx.path.remove(&key);

        // Every continuation loops back onto the path: score the node itself.
        if best == f64::NEG_INFINITY {
            best = score_with(state, self.weights);
        }
        if let Some(memo) = ctx.memo.as_mut() {
            memo.insert((key, depth), best);
        }
        best
    }

    fn choose<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        moves: &[Move],
        depth: usize,
        ctx: &mut SearchContext,
        rng: &mut R,
    ) -> (f64, Option<Move>) {
        let mut scored: Vec<(Move, f64)> = Vec::with_capacity(moves.len());
        for &mv in moves {
            let child = apply(state, mv);
            let mut value = self.value(&child, depth - 1, ctx, rng);
            if value == f64::NEG_INFINITY {
                continue;
            }
            if mv.is_foundation_move() {
                value += self.config.foundation_bonus;
            }
            if self.config.noise > 0.0 {
                value += rng.gen_range(0.0..self.config.noise);
            }
            scored.push((mv, value));
        }

        let best = scored
            .iter()
            .map(|(_, value)| *value)
            .fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<Move> = scored
            .iter()
            .filter(|(_, value)| best - *value < self.config.tie_window)
            .map(|(mv, _)| *mv)
            .collect();

        if debug_logs_enabled() {
            event!(
                target: "klondike_bot::tree_node",
                Level::DEBUG,
                depth,
                candidates = moves.len(),
                scored = scored.len(),
                ties = ties.len(),
                best,
            );
        }

        (best, break_tie(&ties, rng))
    }
}

/// Foundation moves first, then anything but stock handling, then the rest.
fn break_tie<R: Rng + ?Sized>(ties: &[Move], rng: &mut R) -> Option<Move> {
    let foundation: Vec<Move> = ties
        .iter()
        .copied()
        .filter(Move::is_foundation_move)
        .collect();
    if let Some(&mv) = foundation.choose(rng) {
        return Some(mv);
    }
    let active: Vec<Move> = ties.iter().copied().filter(|mv| !mv.is_stock_move()).collect();
    if let Some(&mv) = active.choose(rng) {
        return Some(mv);
    }
    ties.choose(rng).copied()
}

/// Recommends a move by tree search to `depth` plies. `recent_moves` is the
/// live game's history, used to keep the search from feeding an oscillation.
pub fn best_move_by_tree(
    state: &GameState,
    depth: usize,
    recent_moves: Option<&[Move]>,
) -> Option<Move> {
    let config = SearchConfig::from_env().with_tree_depth(depth);
    let weights = ScoreWeights::default();
    let mut rng = search_rng(&config);
    let mut ctx = SearchContext::new(config.memo);
    let started = Instant::now();
    let outcome =
        TreeSearch::new(&config, &weights).search(state, depth, recent_moves, &mut ctx, &mut rng);
    log_tree_decision(&outcome, &ctx, depth, started.elapsed());
    outcome.best
}

pub(crate) fn log_tree_decision(
    outcome: &SearchOutcome,
    ctx: &SearchContext,
    depth: usize,
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
        target: "klondike_bot::tree",
        Level::INFO,
        depth,
        chosen = %chosen,
        score = outcome.score,
        expansions = outcome.expansions,
        memo_entries = ctx.memo.as_ref().map(HashMap::len).unwrap_or(0),
        memo_hits = ctx.memo_hits,
        elapsed_ms = elapsed.as_secs_f64() * 1_000.0,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use klondike_core::model::card::Card;
    use klondike_core::model::pile::{Stock, Tableau, Waste};
    use klondike_core::model::rank::Rank;
    use klondike_core::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn position(waste: Vec<Card>, columns: Vec<Tableau>) -> GameState {
        GameState::from_parts(Stock::new(), Waste::from_cards(waste), Vec::new(), columns)
    }

    fn eight_over_hidden() -> GameState {
        position(
            Vec::new(),
            vec![
                Tableau::from_cards(vec![
                    Card::new(Rank::Two, Suit::Diamonds),
                    Card::face_up(Rank::Eight, Suit::Hearts),
                ]),
                Tableau::from_cards(vec![Card::face_up(Rank::Nine, Suit::Spades)]),
                Tableau::from_cards(vec![Card::face_up(Rank::Nine, Suit::Clubs)]),
            ],
        )
    }

    fn eight_to(from: usize, to: usize, start: usize) -> Move {
        Move::TableauToTableau {
            from,
            to,
            start,
            card: Card::face_up(Rank::Eight, Suit::Hearts),
        }
    }

    fn run(state: &GameState, depth: usize, recent: Option<&[Move]>, config: &SearchConfig) -> (SearchOutcome, SearchContext) {
        let weights = ScoreWeights::default();
        let mut ctx = SearchContext::new(config.memo);
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = TreeSearch::new(config, &weights).search(state, depth, recent, &mut ctx, &mut rng);
        (outcome, ctx)
    }

    #[test]
    fn root_foundation_move_short_circuits() {
        let state = position(
            vec![Card::face_up(Rank::Ace, Suit::Spades)],
            vec![Tableau::from_cards(vec![Card::face_up(Rank::Nine, Suit::Hearts)])],
        );
        let (outcome, ctx) = run(&state, 4, None, &SearchConfig::default());
        assert!(outcome.best.is_some_and(|mv| mv.is_foundation_move()));
        assert_eq!(outcome.score, f64::INFINITY);
        assert_eq!(outcome.expansions, 1);
        assert!(ctx.path.is_empty());
    }

    #[test]
    fn king_moves_into_empty_column() {
        let king = Card::face_up(Rank::King, Suit::Spades);
        let state = position(
            Vec::new(),
            vec![
                Tableau::from_cards(vec![Card::new(Rank::Four, Suit::Diamonds), king]),
                Tableau::new(),
            ],
        );
        let best = best_move_by_tree(&state, 3, None);
        assert_eq!(
            best,
            Some(Move::TableauToTableau {
                from: 0,
                to: 1,
                start: 1,
                card: king,
            })
        );
    }

    #[test]
    fn no_moves_yields_none() {
        let state = position(Vec::new(), vec![Tableau::new(); 3]);
        let (outcome, _) = run(&state, 4, None, &SearchConfig::default());
        assert_eq!(outcome.best, None);
        assert_eq!(outcome.expansions, 0);
        assert_eq!(best_move_by_tree(&state, 4, None), None);
    }

    #[test]
    fn path_set_is_unwound_and_memo_filled() {
        let state = eight_over_hidden();
        let (outcome, ctx) = run(&state, 3, None, &SearchConfig::default());
        assert!(outcome.best.is_some());
        assert!(ctx.path.is_empty());
        assert!(ctx.memo.as_ref().is_some_and(|memo| !memo.is_empty()));
    }

    #[test]
    fn recent_reversal_is_avoided_at_root() {
        let state = eight_over_hidden();
        let recent = [eight_to(1, 0, 0)];
        for seed in 0..5 {
            let config = SearchConfig::default().with_seed(seed);
            let (outcome, _) = run(&state, 2, Some(&recent), &config);
            assert_eq!(outcome.best, Some(eight_to(0, 2, 1)));
        }
    }

    #[test]
    fn node_budget_bounds_expansions() {
        let state = GameState::deal_with_seed(31);
        let config = SearchConfig::default()
            .with_node_budget(Some(40))
            .with_memo(false);
        let (outcome, ctx) = run(&state, 8, None, &config);
        assert!(outcome.expansions <= 40);
        assert_eq!(outcome.expansions, ctx.expansions);
        assert!(ctx.path.is_empty());
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let state = GameState::deal_with_seed(12);
        let config = SearchConfig::default().with_node_budget(Some(2_000));
        let (first, _) = run(&state, 3, None, &config);
        let (second, _) = run(&state, 3, None, &config);
        assert_eq!(first.best, second.best);
        assert_eq!(first.expansions, second.expansions);
    }
}
