//! Move-selection strategies over immutable [`GameState`] values.
//!
//! - `greedy`: fixed priority rules, no lookahead.
//! - `tree`: depth-limited backtracking search with a path-scoped visited set.
//! - `graph`: breadth-first search with a global visited set.

mod graph;
mod greedy;
mod tree;

pub use graph::{GraphSearch, best_move_by_graph, best_move_by_graph_with};
pub use greedy::greedy_move;
pub use tree::{SearchContext, TreeSearch, best_move_by_tree};

pub(crate) use graph::log_graph_decision;
pub(crate) use tree::log_tree_decision;

use crate::bot::{HistoryFilter, SearchConfig};
use klondike_core::model::state::GameState;
use klondike_core::moves::{Move, MoveKind};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Tie-break generator: seeded when the config pins a seed.
pub fn search_rng(config: &SearchConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Result of one search call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub best: Option<Move>,
    pub score: f64,
    /// Nodes whose legal moves were generated.
    pub expansions: usize,
}

impl SearchOutcome {
    pub(crate) fn none(expansions: usize) -> Self {
        Self {
            best: None,
            score: f64::NEG_INFINITY,
            expansions,
        }
    }
}

/// Exploration order: foundation, then tableau building, then draw, then reset.
pub(crate) fn move_priority(mv: &Move) -> u8 {
    match mv.kind() {
        MoveKind::WasteToFoundation | MoveKind::TableauToFoundation => 3,
        MoveKind::WasteToTableau | MoveKind::TableauToTableau => 2,
        MoveKind::DrawStock => 1,
        MoveKind::ResetStock => 0,
    }
}

/// Drops root moves the live game keeps repeating. Foundation moves always
/// pass, stock draws only with `exempt_draws`; when every move would be
/// dropped the input is returned unchanged.
pub(crate) fn filter_recent(moves: Vec<Move>, recent: &[Move], filter: &HistoryFilter) -> Vec<Move> {
    if recent.is_empty() {
        return moves;
    }
    let last = recent.last().map(Move::signature);
    let immediate = &recent[recent.len().saturating_sub(filter.immediate_window)..];
    let trailing = &recent[recent.len().saturating_sub(filter.recurrence_window)..];

    let kept: Vec<Move> = moves
        .iter()
        .copied()
        .filter(|mv| {
            let exempt_draw = filter.exempt_draws && mv.kind() == MoveKind::DrawStock;
            if mv.is_foundation_move() || exempt_draw {
                return true;
            }
            let signature = mv.signature();
            let reverses = last.is_some_and(|previous| signature.is_reversal_of(&previous));
            let repeated = immediate.iter().any(|old| old.signature() == signature);
            let recurring = trailing
                .iter()
                .filter(|old| old.signature() == signature)
                .count()
                >= filter.recurrence_limit;
            !(reverses || repeated || recurring)
        })
        .collect();

    if kept.is_empty() { moves } else { kept }
}

/// Whether `mv` leaves the position unchanged up to column order.
pub(crate) fn is_column_shuffle(state: &GameState, mv: &Move) -> bool {
    match *mv {
        Move::TableauToTableau { to, start: 0, .. } => {
            state.column(to).is_some_and(|column| column.is_empty())
        }
        _ => false,
    }
}
