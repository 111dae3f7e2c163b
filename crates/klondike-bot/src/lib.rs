pub mod bot;
pub mod cycle;
pub mod heuristic;
pub mod history;
pub mod policy;
pub mod search;
pub mod session;

pub use bot::{HistoryFilter, ScoreWeights, SearchConfig};
pub use cycle::{CycleConfig, CycleDetector, CycleKind, detect_cycle};
pub use heuristic::{score, score_with};
pub use history::MoveHistory;
pub use policy::{GraphPolicy, GreedyPolicy, Policy, PolicyContext, Strategy, TreePolicy};
pub use search::{
    SearchOutcome, best_move_by_graph, best_move_by_graph_with, best_move_by_tree, greedy_move,
};
pub use session::{AutoplaySession, SessionSummary, StepOutcome};
